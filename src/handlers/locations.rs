// src/handlers/locations.rs

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
    handlers::{parse_body, parse_id, read_json, require_json, resolve_id},
    models::{
        location::{CreateLocationPayload, ImagePayload},
        Location, LocationBatchEntry, LocationPatch,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuery {
    /// Id do ponto
    pub id: Option<String>,
    /// Lista os pontos de uma rota
    pub route_id: Option<String>,
    /// No DELETE, remove só esta imagem em vez do ponto
    pub image_url: Option<String>,
}

// GET /api/locations[?id=|?routeId=]
#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Locations",
    params(LocationQuery),
    responses(
        (status = 200, description = "Um ponto, os pontos de uma rota, ou todos", body = Vec<Location>),
        (status = 404, description = "Ponto não encontrado")
    )
)]
pub async fn get_locations(
    State(app_state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Response, AppError> {
    let pool = require_pool(&app_state)?;
    let service = &app_state.location_service;

    if let Some(raw) = query.id.as_deref() {
        let id = parse_id("id", raw)?;
        let location = service.get_location(pool, id).await?;
        return Ok((StatusCode::OK, Json(location)).into_response());
    }

    let locations = match query.route_id.as_deref() {
        Some(raw) => service.list_by_route(pool, parse_id("routeId", raw)?).await?,
        None => service.list_locations(pool).await?,
    };
    Ok((StatusCode::OK, Json(locations)).into_response())
}

// POST /api/locations
// POST /api/locations?id=  com `{ "imageUrl": ... }` => acrescenta imagem
#[utoipa::path(
    post,
    path = "/api/locations",
    tag = "Locations",
    params(LocationQuery),
    request_body = CreateLocationPayload,
    responses(
        (status = 201, description = "Ponto criado", body = Location),
        (status = 200, description = "Imagem acrescentada", body = Location),
        (status = 400, description = "routeId/location ausentes ou routeId inválido"),
        (status = 404, description = "Ponto não encontrado")
    )
)]
pub async fn create_location(
    State(app_state): State<AppState>,
    Query(query): Query<LocationQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    let pool = require_pool(&app_state)?;
    let body: Value = require_json(&body)?;

    if let (Some(raw), true) = (query.id.as_deref(), body.get("imageUrl").is_some()) {
        let id = parse_id("id", raw)?;
        let payload: ImagePayload = parse_body(body)?;
        let location = app_state
            .location_service
            .add_image(pool, id, &payload.image_url)
            .await?;
        return Ok((StatusCode::OK, Json(location)).into_response());
    }

    let payload: CreateLocationPayload = parse_body(body)?;
    let location = app_state.location_service.create_location(pool, &payload).await?;

    Ok((StatusCode::CREATED, Json(location)).into_response())
}

// PUT /api/locations[?id=]
#[utoipa::path(
    put,
    path = "/api/locations",
    tag = "Locations",
    params(LocationQuery),
    request_body = LocationPatch,
    responses(
        (status = 200, description = "Ponto atualizado, ou resumo do lote"),
        (status = 400, description = "Patch inválido"),
        (status = 404, description = "Ponto não encontrado")
    )
)]
pub async fn update_locations(
    State(app_state): State<AppState>,
    Query(query): Query<LocationQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    let pool = require_pool(&app_state)?;
    let body: Value = require_json(&body)?;

    if let Some(entries) = body.get("locations").filter(|v| v.is_array()) {
        let entries: Vec<LocationBatchEntry> = parse_body(entries.clone())?;
        let outcome = app_state
            .location_service
            .batch_update_locations(pool, &entries)
            .await;
        return Ok((StatusCode::OK, Json(outcome)).into_response());
    }

    let id = resolve_id(query.id.as_deref(), Some(&body))?
        .ok_or_else(|| AppError::BadRequest("Location id is required".to_string()))?;
    let patch: LocationPatch = parse_body(body)?;

    let location = app_state
        .location_service
        .update_location(pool, id, &patch)
        .await?;
    Ok((StatusCode::OK, Json(location)).into_response())
}

// DELETE /api/locations?id=[&imageUrl=]
// O id e a imageUrl também podem vir no corpo.
#[utoipa::path(
    delete,
    path = "/api/locations",
    tag = "Locations",
    params(LocationQuery),
    request_body(
        content = ImagePayload,
        description = "Opcional: `imageUrl` remove só essa imagem"
    ),
    responses(
        (status = 200, description = "Ponto removido, ou imagem removida da lista"),
        (status = 404, description = "Ponto não encontrado")
    )
)]
pub async fn delete_location(
    State(app_state): State<AppState>,
    Query(query): Query<LocationQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    let pool = require_pool(&app_state)?;

    let body: Option<Value> = read_json(&body)?;

    let id = resolve_id(query.id.as_deref(), body.as_ref())?
        .ok_or_else(|| AppError::BadRequest("Location id is required".to_string()))?;

    let image_url = query.image_url.clone().or_else(|| {
        body.as_ref()
            .and_then(|b| b.get("imageUrl"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    if let Some(url) = image_url {
        let location = app_state.location_service.remove_image(pool, id, &url).await?;
        return Ok((StatusCode::OK, Json(location)).into_response());
    }

    app_state.location_service.delete_location(pool, id).await?;
    Ok((StatusCode::OK, Json(json!({ "success": true, "id": id }))).into_response())
}
