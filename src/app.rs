// src/app.rs

use axum::{
    http::{header, Method},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// CORS aberto: qualquer origem, os verbos da API e os cabeçalhos usuais.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

pub fn build_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/routes",
            get(handlers::routes::get_routes)
                .post(handlers::routes::create_route)
                .put(handlers::routes::update_routes)
                .delete(handlers::routes::delete_route)
                .options(handlers::preflight),
        )
        .route(
            "/locations",
            get(handlers::locations::get_locations)
                .post(handlers::locations::create_location)
                .put(handlers::locations::update_locations)
                .delete(handlers::locations::delete_location)
                .options(handlers::preflight),
        )
        .route("/health", get(|| async { "OK" }))
        .route("/version", get(handlers::meta::version))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
