//! HTTP surface tests
//!
//! Requests that are rejected before any storage access, so a lazy pool that
//! never connects is enough.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use stock_ledger_backend::config::{DatabaseConfig, LedgerConfig, ServerConfig};
use stock_ledger_backend::{create_app, AppState, Config};

fn test_app() -> Router {
    let url = "postgres://stock_ledger@localhost:1/unused";
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy(url)
        .unwrap();
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: url.to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
        },
        ledger: LedgerConfig::default(),
    };
    create_app(AppState::new(pool, config))
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn error_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_root_banner() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_movement_type_in_query_is_bad_request() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/movements?type=teleport")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "type");
    }

    #[tokio::test]
    async fn test_unknown_movement_type_in_body_is_rejected() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/v1/movements",
                r#"{"product_id":"prd_1","type":"teleport","quantity":1}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected_before_storage() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/v1/movements",
                r#"{"product_id":"prd_1","type":"out","quantity":0}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["field"], "quantity");
    }

    #[tokio::test]
    async fn test_empty_batch_is_bad_request() {
        let response = test_app()
            .oneshot(json_request("POST", "/api/v1/movements/batch", r#"{"movements":[]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["field"], "movements");
    }

    #[tokio::test]
    async fn test_transfer_to_same_target_is_bad_request() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/v1/movements/transfer",
                r#"{"from":{"product_id":"prd_1","variant_id":null},"to":{"product_id":"prd_1","variant_id":null},"quantity":2}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["field"], "to");
    }

    #[tokio::test]
    async fn test_acknowledging_without_session_is_bad_request() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/notifications/low-stock-prd_1/read")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"]["field"], "X-Session-Id");
    }

    #[tokio::test]
    async fn test_oversized_chart_window_is_bad_request() {
        for days in ["367", "4294967295"] {
            let response = test_app()
                .oneshot(
                    Request::builder()
                        .uri(format!("/api/v1/dashboard/charts?days={days}"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = error_body(response).await;
            assert_eq!(body["error"]["field"], "days");
        }
    }

    #[tokio::test]
    async fn test_negative_stock_level_is_bad_request() {
        let response = test_app()
            .oneshot(json_request(
                "POST",
                "/api/v1/products/prd_1/stock-level",
                r#"{"level":-4}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
