// tests/api_tests.rs
// Roteador completo, sem banco: caminho "desconectado", CORS e rotas auxiliares.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use route_manager::{AppState, Settings, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn create_test_app() -> Router {
    let settings = Settings::from_lookup(|_| None).unwrap();
    build_router(AppState::with_pool(settings, None))
}

async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = create_test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::get("/api/health").body(Body::empty()).unwrap();
    let (status, _, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_version_endpoint() {
    let request = Request::get("/api/version").body(Body::empty()).unwrap();
    let (status, _, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_data_endpoints_without_database() {
    let requests = vec![
        Request::get("/api/routes").body(Body::empty()).unwrap(),
        Request::get("/api/locations?routeId=3").body(Body::empty()).unwrap(),
        json_request(
            Method::POST,
            "/api/routes",
            json!({ "route": "North", "shift": "AM", "warehouse": "W1" }),
        ),
        json_request(Method::PUT, "/api/locations", json!({ "locations": [] })),
        Request::delete("/api/routes?id=1").body(Body::empty()).unwrap(),
        Request::delete("/api/locations?id=1").body(Body::empty()).unwrap(),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let (status, _, body) = send(request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": "Database not connected" }), "{}", uri);
    }
}

#[tokio::test]
async fn test_unparseable_bodies_still_report_missing_database() {
    let requests = vec![
        // sem content-type
        Request::post("/api/routes")
            .body(Body::from(r#"{"route":"North","shift":"AM","warehouse":"W1"}"#))
            .unwrap(),
        // JSON malformado
        Request::put("/api/routes?id=1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"description\": "))
            .unwrap(),
        Request::post("/api/locations").body(Body::empty()).unwrap(),
        Request::put("/api/locations?id=1")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("not json"))
            .unwrap(),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let (status, headers, body) = send(request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json", "{}", uri);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": "Database not connected" }), "{}", uri);
    }
}

#[tokio::test]
async fn test_options_returns_ok() {
    for uri in ["/api/routes", "/api/locations"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(request).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/routes")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("PUT"));
    assert!(methods.contains("DELETE"));
}

#[tokio::test]
async fn test_cors_header_on_errors() {
    let request = Request::get("/api/routes")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_openapi_document() {
    let request = Request::get("/api/openapi.json").body(Body::empty()).unwrap();
    let (status, _, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"].get("/api/routes").is_some());
    assert!(doc["paths"].get("/api/locations").is_some());
    // corpo opcional do DELETE (remoção de imagem)
    assert!(doc["paths"]["/api/locations"]["delete"].get("requestBody").is_some());
    assert!(doc["paths"]["/api/routes"]["post"].get("requestBody").is_some());
}

#[tokio::test]
async fn test_unknown_path() {
    let request = Request::get("/api/drivers").body(Body::empty()).unwrap();
    let (status, _, _) = send(request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
