// src/handlers/routes.rs

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::{
    common::{db_utils::require_pool, error::AppError},
    config::AppState,
    handlers::{parse_body, parse_id, require_json, resolve_id},
    models::{CreateRoutePayload, Route, RouteBatchEntry, RoutePatch, RouteWithLocations},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RouteQuery {
    /// Id da rota
    pub id: Option<String>,
}

// GET /api/routes[?id=]
#[utoipa::path(
    get,
    path = "/api/routes",
    tag = "Routes",
    params(RouteQuery),
    responses(
        (status = 200, description = "Lista de rotas, ou a rota com seus pontos quando há `id`", body = Vec<Route>),
        (status = 404, description = "Rota não encontrada")
    )
)]
pub async fn get_routes(
    State(app_state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Response, AppError> {
    let pool = require_pool(&app_state)?;

    match query.id.as_deref() {
        Some(raw) => {
            let id = parse_id("id", raw)?;
            let route: RouteWithLocations = app_state.route_service.get_route(pool, id).await?;
            Ok((StatusCode::OK, Json(route)).into_response())
        }
        None => {
            let routes = app_state.route_service.list_routes(pool).await?;
            Ok((StatusCode::OK, Json(routes)).into_response())
        }
    }
}

// POST /api/routes
#[utoipa::path(
    post,
    path = "/api/routes",
    tag = "Routes",
    request_body = CreateRoutePayload,
    responses(
        (status = 201, description = "Rota criada", body = Route),
        (status = 400, description = "route/shift/warehouse ausentes ou em branco")
    )
)]
pub async fn create_route(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let pool = require_pool(&app_state)?;
    let payload: CreateRoutePayload = parse_body(require_json(&body)?)?;

    let route = app_state.route_service.create_route(pool, &payload).await?;

    Ok((StatusCode::CREATED, Json(route)))
}

// PUT /api/routes[?id=]
// Corpo `{ "routes": [...] }` => lote; senão, patch de uma rota só.
#[utoipa::path(
    put,
    path = "/api/routes",
    tag = "Routes",
    params(RouteQuery),
    request_body = RoutePatch,
    responses(
        (status = 200, description = "Rota atualizada, ou resumo do lote"),
        (status = 400, description = "Patch inválido"),
        (status = 404, description = "Rota não encontrada")
    )
)]
pub async fn update_routes(
    State(app_state): State<AppState>,
    Query(query): Query<RouteQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    let pool = require_pool(&app_state)?;
    let body: Value = require_json(&body)?;

    if let Some(entries) = body.get("routes").filter(|v| v.is_array()) {
        let entries: Vec<RouteBatchEntry> = parse_body(entries.clone())?;
        let outcome = app_state.route_service.batch_update_routes(pool, &entries).await;
        return Ok((StatusCode::OK, Json(outcome)).into_response());
    }

    let id = resolve_id(query.id.as_deref(), Some(&body))?
        .ok_or_else(|| AppError::BadRequest("Route id is required".to_string()))?;
    let patch: RoutePatch = parse_body(body)?;

    let route = app_state.route_service.update_route(pool, id, &patch).await?;
    Ok((StatusCode::OK, Json(route)).into_response())
}

// DELETE /api/routes?id=
#[utoipa::path(
    delete,
    path = "/api/routes",
    tag = "Routes",
    params(RouteQuery),
    responses(
        (status = 200, description = "Rota e seus pontos removidos"),
        (status = 404, description = "Rota não encontrada")
    )
)]
pub async fn delete_route(
    State(app_state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = require_pool(&app_state)?;
    let id = resolve_id(query.id.as_deref(), None)?
        .ok_or_else(|| AppError::BadRequest("Route id is required".to_string()))?;

    let removed_locations = app_state.route_service.delete_route(pool, id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "id": id, "removedLocations": removed_locations })),
    ))
}
