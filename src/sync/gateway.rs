// src/sync/gateway.rs
// Fronteira entre a sessão de edição e o servidor.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    BatchOutcome, CreateLocationPayload, CreateRoutePayload, Location, LocationBatchEntry, Route,
    RouteBatchEntry,
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected: {0}")]
    Validation(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}

/// Operações de `/api/routes` e `/api/locations` que o cliente usa.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_routes(&self) -> Result<Vec<Route>, GatewayError>;
    async fn list_locations(&self) -> Result<Vec<Location>, GatewayError>;

    async fn create_route(&self, payload: &CreateRoutePayload) -> Result<Route, GatewayError>;
    async fn update_routes(
        &self,
        entries: &[RouteBatchEntry],
    ) -> Result<BatchOutcome<Route>, GatewayError>;
    async fn delete_route(&self, id: i32) -> Result<(), GatewayError>;

    async fn create_location(
        &self,
        payload: &CreateLocationPayload,
    ) -> Result<Location, GatewayError>;
    async fn update_locations(
        &self,
        entries: &[LocationBatchEntry],
    ) -> Result<BatchOutcome<Location>, GatewayError>;
    async fn delete_location(&self, id: i32) -> Result<(), GatewayError>;

    async fn add_image(&self, id: i32, url: &str) -> Result<Location, GatewayError>;
    async fn remove_image(&self, id: i32, url: &str) -> Result<Location, GatewayError>;
}
