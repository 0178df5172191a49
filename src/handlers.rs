pub mod locations;
pub mod meta;
pub mod routes;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::error::AppError;

/// Ids chegam como texto na query string.
pub(crate) fn parse_id(field: &str, raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid '{}': {}", field, raw)))
}

/// Lê o corpo cru como JSON. Corpo vazio (ou só espaços) => `None`.
/// O corpo é lido depois do `require_pool`, e erros de formato saem como `{error}`.
pub(crate) fn read_json(body: &[u8]) -> Result<Option<Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

/// Como `read_json`, mas o corpo é obrigatório.
pub(crate) fn require_json(body: &[u8]) -> Result<Value, AppError> {
    read_json(body)?.ok_or_else(|| AppError::BadRequest("Request body is required".to_string()))
}

/// Converte o corpo já lido em JSON para o payload esperado; erro de formato vira 400.
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

/// Id vindo da query (`?id=`) ou, na falta dela, do corpo (`{"id": ...}`).
pub(crate) fn resolve_id(query: Option<&str>, body: Option<&Value>) -> Result<Option<i32>, AppError> {
    if let Some(raw) = query {
        return parse_id("id", raw).map(Some);
    }

    match body.and_then(|b| b.get("id")) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .filter(|n| *n >= 0)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid 'id': {}", n))),
        Some(Value::String(s)) => parse_id("id", s).map(Some),
        Some(other) => Err(AppError::BadRequest(format!("Invalid 'id': {}", other))),
    }
}

// OPTIONS responde 200 sem tocar no banco.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_must_be_non_negative_integers() {
        assert_eq!(parse_id("id", "42").unwrap(), 42);
        assert!(parse_id("id", "-1").is_err());
        assert!(parse_id("id", "abc").is_err());
    }

    #[test]
    fn query_id_wins_over_body_id() {
        let body = json!({ "id": 9 });
        assert_eq!(resolve_id(Some("3"), Some(&body)).unwrap(), Some(3));
        assert_eq!(resolve_id(None, Some(&body)).unwrap(), Some(9));
        assert_eq!(resolve_id(None, Some(&json!({ "id": "11" }))).unwrap(), Some(11));
        assert_eq!(resolve_id(None, None).unwrap(), None);
        assert!(resolve_id(None, Some(&json!({ "id": true }))).is_err());
    }

    #[test]
    fn raw_body_is_read_as_json() {
        assert_eq!(read_json(b"").unwrap(), None);
        assert_eq!(read_json(b"  \n").unwrap(), None);
        assert_eq!(read_json(br#"{"id": 4}"#).unwrap(), Some(json!({ "id": 4 })));
        assert!(matches!(read_json(b"{not json"), Err(AppError::BadRequest(_))));
        assert!(matches!(require_json(b""), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        let result: Result<crate::models::RouteBatchEntry, _> = parse_body(json!({ "id": "x" }));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
