// src/handlers/meta.rs

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct VersionInfo {
    #[schema(example = "0.1.0")]
    pub version: &'static str,
}

// GET /api/version
#[utoipa::path(
    get,
    path = "/api/version",
    tag = "Meta",
    responses((status = 200, description = "Versão do servidor", body = VersionInfo))
)]
pub async fn version() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
    })
}
