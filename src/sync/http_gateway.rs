// src/sync/http_gateway.rs
// Gateway sobre HTTP (reqwest) falando com o próprio servidor axum.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    models::{
        BatchOutcome, CreateLocationPayload, CreateRoutePayload, Location, LocationBatchEntry,
        Route, RouteBatchEntry,
    },
    sync::gateway::{Gateway, GatewayError},
};

/// Corpo de erro do servidor: `{ "error": "..." }`
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// `base_url` sem o prefixo `/api`, ex.: `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/api/{}", self.base_url, resource)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        tracing::debug!(status = %status, error = %message, "Servidor recusou a requisição");

        match status {
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(message)),
            StatusCode::BAD_REQUEST => Err(GatewayError::Validation(message)),
            _ => Err(GatewayError::Server {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_routes(&self) -> Result<Vec<Route>, GatewayError> {
        let response = self.client.get(self.url("routes")).send().await?;
        Self::handle_response(response).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>, GatewayError> {
        let response = self.client.get(self.url("locations")).send().await?;
        Self::handle_response(response).await
    }

    async fn create_route(&self, payload: &CreateRoutePayload) -> Result<Route, GatewayError> {
        let response = self
            .client
            .post(self.url("routes"))
            .json(payload)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn update_routes(
        &self,
        entries: &[RouteBatchEntry],
    ) -> Result<BatchOutcome<Route>, GatewayError> {
        let response = self
            .client
            .put(self.url("routes"))
            .json(&json!({ "routes": entries }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete_route(&self, id: i32) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url("routes"))
            .query(&[("id", id)])
            .send()
            .await?;
        Self::handle_response::<Value>(response).await.map(|_| ())
    }

    async fn create_location(
        &self,
        payload: &CreateLocationPayload,
    ) -> Result<Location, GatewayError> {
        let response = self
            .client
            .post(self.url("locations"))
            .json(payload)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn update_locations(
        &self,
        entries: &[LocationBatchEntry],
    ) -> Result<BatchOutcome<Location>, GatewayError> {
        let response = self
            .client
            .put(self.url("locations"))
            .json(&json!({ "locations": entries }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete_location(&self, id: i32) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url("locations"))
            .query(&[("id", id)])
            .send()
            .await?;
        Self::handle_response::<Value>(response).await.map(|_| ())
    }

    async fn add_image(&self, id: i32, url: &str) -> Result<Location, GatewayError> {
        let response = self
            .client
            .post(self.url("locations"))
            .query(&[("id", id)])
            .json(&json!({ "imageUrl": url }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn remove_image(&self, id: i32, url: &str) -> Result<Location, GatewayError> {
        let id = id.to_string();
        let response = self
            .client
            .delete(self.url("locations"))
            .query(&[("id", id.as_str()), ("imageUrl", url)])
            .send()
            .await?;
        Self::handle_response(response).await
    }
}
