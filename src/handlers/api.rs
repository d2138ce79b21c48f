use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::{RepositoryError, ServiceError};
use crate::services::{FoodService, OrderService};

use super::food::{create_food, delete_food, get_food, list_foods, update_food};
use super::order::{cancel_order, create_order, list_orders, update_order_status};

/// Error half of every API handler result
pub type ApiError = (StatusCode, Json<Value>);

/// Shared application state containing all services
#[derive(Clone)]
pub struct ApiState {
    pub food_service: Arc<FoodService>,
    pub order_service: Arc<OrderService>,
}

/// Create API router with all food and order endpoints
pub fn create_api_router(
    food_service: Arc<FoodService>,
    order_service: Arc<OrderService>,
) -> Router {
    let state = ApiState {
        food_service,
        order_service,
    };

    Router::new()
        .route("/food", get(list_foods).post(create_food))
        .route("/food/order", post(create_order))
        .route("/food/orders", get(list_orders))
        .route("/food/order/:id", put(update_order_status))
        .route("/food/order/cancelled/:id", put(cancel_order))
        .route(
            "/food/:id",
            get(get_food).patch(update_food).delete(delete_food),
        )
        .with_state(state)
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "message": message.into(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Unwrap a JSON body extractor, turning any rejection into a 400
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            crate::warn_with_trace!("Rejected request body: {}", rejection.body_text());
            Err(error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            ))
        }
    }
}

pub(crate) fn query_rejection(rejection: QueryRejection) -> ApiError {
    crate::warn_with_trace!("Rejected query string: {}", rejection.body_text());
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid query parameters: {}", rejection.body_text()),
    )
}

/// Convert ServiceError to HTTP response
pub(crate) fn service_error_to_response(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::FoodNotFound { .. } | ServiceError::OrderNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        ServiceError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        ServiceError::Repository { source } => match source {
            RepositoryError::NotFound => StatusCode::NOT_FOUND,
            RepositoryError::ConstraintViolation { .. } => StatusCode::BAD_REQUEST,
            RepositoryError::ConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    };

    if status.is_server_error() {
        crate::error_with_trace!("Request failed: {}", err);
    }

    error_response(status, err.to_string())
}
