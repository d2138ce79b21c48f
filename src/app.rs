use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::handlers::{
    create_api_router, health_check, json_error_middleware, metrics_handler, not_found_handler,
    security_headers_middleware,
};
use crate::observability::{observability_middleware, Metrics};
use crate::services::{FoodService, OrderService};

/// Build the full application router with every middleware layer applied
pub fn create_app(
    metrics: Arc<Metrics>,
    food_service: Arc<FoodService>,
    order_service: Arc<OrderService>,
    max_request_size: usize,
) -> Router {
    let metrics_for_middleware = metrics.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        .merge(create_api_router(food_service, order_service))
        .fallback(not_found_handler)
        // Outermost layer last
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_request_size))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(cors)
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Food, FoodFilters, Order, OrderFilters, OrderStatus, RepositoryError};
    use crate::repositories::{FoodRepository, OrderRepository};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{DateTime, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn json_of(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    struct EmptyFoods;

    #[async_trait]
    impl FoodRepository for EmptyFoods {
        async fn find_all(&self, _filters: FoodFilters) -> Result<Vec<Food>, RepositoryError> {
            Ok(vec![])
        }
        async fn find_by_id(&self, _id: &str) -> Result<Option<Food>, RepositoryError> {
            Ok(None)
        }
        async fn create(&self, food: Food) -> Result<Food, RepositoryError> {
            Ok(food)
        }
        async fn update(&self, food: Food) -> Result<Food, RepositoryError> {
            Ok(food)
        }
        async fn delete(&self, _id: &str) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
    }

    struct EmptyOrders;

    #[async_trait]
    impl OrderRepository for EmptyOrders {
        async fn find_all(&self, _filters: OrderFilters) -> Result<Vec<Order>, RepositoryError> {
            Ok(vec![])
        }
        async fn create(&self, order: Order) -> Result<Order, RepositoryError> {
            Ok(order)
        }
        async fn update_status(
            &self,
            _id: &str,
            _status: OrderStatus,
            _updated_at: DateTime<Utc>,
        ) -> Result<Order, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
    }

    fn test_app(max_request_size: usize) -> (Router, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let app = create_app(
            metrics.clone(),
            Arc::new(FoodService::new(Arc::new(EmptyFoods))),
            Arc::new(OrderService::new(Arc::new(EmptyOrders))),
            max_request_size,
        );
        (app, metrics)
    }

    #[tokio::test]
    async fn test_health_route_has_security_and_cors_headers() {
        let (app, _) = test_app(1024);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/status")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_requests_are_counted() {
        let (app, metrics) = test_app(1024);

        let response = app
            .oneshot(Request::builder().uri("/food").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("http_requests_total"));
        assert!(encoded.contains(r#"endpoint="/food""#));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let (app, _) = test_app(16);
        let body = r#"{"foodName":"A very long name that exceeds the limit"}"#;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/food")
                    .header("content-type", "application/json")
                    .header("content-length", body.len())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(json_of(response).await["message"], "Payload Too Large");
    }

    #[tokio::test]
    async fn test_wrong_method_returns_json_error() {
        let (app, _) = test_app(1024);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/food/order")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        let body = json_of(response).await;
        assert_eq!(body["message"], "Method Not Allowed");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_path_returns_json_not_found() {
        let (app, _) = test_app(1024);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/pets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(response).await["message"], "Not Found");
    }
}
