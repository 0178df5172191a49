use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Route not found")]
    RouteNotFound(i32),

    #[error("Location not found")]
    LocationNotFound(i32),

    // O pool não foi criado (sem connection string ou string inválida).
    #[error("Database not connected")]
    DatabaseNotConnected,

    #[error("{0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("{0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Erro de validação de um único campo, no mesmo formato do `validator`.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        let message: String = message.into();
        let mut err = ValidationError::new("invalid");
        err.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RouteNotFound(_) | AppError::LocationNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseNotConnected
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::ValidationError(errors) => {
                let mut details = BTreeMap::new();
                let mut summary = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("Invalid value for '{}'.", field))
                        })
                        .collect();
                    summary.extend(messages.iter().cloned());
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": summary.join(" "),
                    "details": details,
                }));
                (status, body).into_response()
            }
            e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                // Ferramenta interna: a mensagem crua volta para o cliente.
                tracing::error!("Internal server error: {}", e);
                (status, Json(json!({ "error": e.to_string() }))).into_response()
            }
            e => (status, Json(json!({ "error": e.to_string() }))).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(AppError::RouteNotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::invalid_field("route", "required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DatabaseNotConnected.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::DatabaseNotConnected.to_string(), "Database not connected");
    }
}
