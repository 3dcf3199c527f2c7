mod promotions;
mod runs;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use promodb_core::StoresFile;
use promodb_pipeline::Reconciler;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub reconciler: Arc<Reconciler>,
    pub stores: Arc<StoresFile>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &promodb_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/promotions", get(promotions::list_promotions))
        .route("/api/v1/runs", post(runs::submit_run))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match promodb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::promotions::PromotionItem;
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use promodb_catalog::{CatalogMatcher, OffClient};
    use promodb_enrich::Enricher;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn promotion_item_is_serializable() {
        // Proves the type compiles and serde works — no DB needed.
        let item = PromotionItem {
            promo_id: Uuid::nil(),
            store_name: "Colruyt".to_string(),
            barcode: "5410228112345".to_string(),
            display_name: "Jupiler Pils Bak 24x25cl".to_string(),
            discount_label: Some("1+1 GRATIS".to_string()),
            original_price: Some(Decimal::new(1999, 2)),
            promo_price: Some(Decimal::new(1000, 2)),
            equivalent_percentage: Some(Decimal::new(5000, 2)),
            is_multi_unit: true,
            deal_quantity: 2,
            category: "Drinken".to_string(),
            primary_macro: "None".to_string(),
            is_healthy: false,
            valid_from: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2026, 7, 14).unwrap(),
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"display_name\":\"Jupiler Pils Bak 24x25cl\""));
        assert!(json.contains("\"deal_quantity\":2"));
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal_error() {
        let response = ApiError::new("req-1", "weird", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Offline collaborators: a matcher whose remote endpoint is unreachable
    /// (degrades to "no match") and a disabled enricher.
    fn offline_state(pool: sqlx::PgPool) -> AppState {
        let remote = OffClient::with_base_url(1, "http://127.0.0.1:9").expect("client");
        let matcher = CatalogMatcher::new(pool.clone(), remote);
        let reconciler = Reconciler::new(pool.clone(), matcher, Enricher::disabled(), 2);
        let stores: StoresFile = serde_yaml::from_str(
            "stores:\n  - name: Colruyt\n    logo_url: https://logo.example/c.png\n",
        )
        .expect("roster");
        AppState {
            pool,
            reconciler: Arc::new(reconciler),
            stores: Arc::new(stores),
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok_with_live_database(pool: sqlx::PgPool) {
        use tower::ServiceExt;

        let app = build_app(offline_state(pool));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn submit_run_reconciles_and_lists_promotions(pool: sqlx::PgPool) {
        use tower::ServiceExt;

        let app = build_app(offline_state(pool));

        let payload = serde_json::json!({
            "store": "Colruyt",
            "valid_from": "2026-07-01",
            "valid_until": "2026-07-14",
            "items": [
                {
                    "url": "https://www.colruyt.be/nl/producten/jupiler",
                    "name": "Jupiler Pils Bak 24x25cl",
                    "discount": "1+1 GRATIS",
                    "barcode": "5410228112345",
                    "price": 19.99
                }
            ]
        });

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/runs")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        // No catalog, no reachable remote: the group is a placeholder, still persisted.
        assert_eq!(json["data"]["matched"].as_u64(), Some(0));
        assert_eq!(json["data"]["not_found"].as_u64(), Some(1));
        assert_eq!(json["data"]["created"].as_u64(), Some(1));
        assert_eq!(json["data"]["errors"].as_array().map(Vec::len), Some(0));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/promotions?store=colruyt")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(
            data[0]["display_name"].as_str(),
            Some("Jupiler Pils Bak 24x25cl")
        );
        assert_eq!(data[0]["deal_quantity"].as_i64(), Some(2));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn submit_run_rejects_inverted_period(pool: sqlx::PgPool) {
        use tower::ServiceExt;

        let app = build_app(offline_state(pool));
        let payload = serde_json::json!({
            "store": "Colruyt",
            "valid_from": "2026-07-14",
            "valid_until": "2026-07-01",
            "items": []
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/runs")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
