// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Routes ---
        handlers::routes::get_routes,
        handlers::routes::create_route,
        handlers::routes::update_routes,
        handlers::routes::delete_route,

        // --- Locations ---
        handlers::locations::get_locations,
        handlers::locations::create_location,
        handlers::locations::update_locations,
        handlers::locations::delete_location,

        // --- Meta ---
        handlers::meta::version,
    ),
    components(
        schemas(
            // --- Routes ---
            models::route::Route,
            models::route::RouteFields,
            models::route::RouteWithLocations,
            models::route::CreateRoutePayload,
            models::route::RoutePatch,
            models::route::RouteBatchEntry,

            // --- Locations ---
            models::location::Location,
            models::location::LocationFields,
            models::location::CreateLocationPayload,
            models::location::LocationPatch,
            models::location::LocationBatchEntry,
            models::location::ImagePayload,

            // --- Outros ---
            models::batch::BatchFailure,
            models::power::PowerStatus,
            handlers::meta::VersionInfo,
        )
    ),
    tags(
        (name = "Routes", description = "Rotas de entrega"),
        (name = "Locations", description = "Pontos de entrega de cada rota"),
        (name = "Meta", description = "Saúde e versão do servidor")
    )
)]
pub struct ApiDoc;
