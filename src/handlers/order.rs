use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::instrument;

use crate::models::{CreateOrderRequest, Order, OrderFilters, OrderStatus, UpdateOrderStatusRequest};

use super::api::{
    error_response, json_body, query_rejection, service_error_to_response, ApiError, ApiState,
};

/// Query parameters for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

#[instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<ApiState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let request = json_body(body)?;

    let order = state
        .order_service
        .create_order(request)
        .await
        .map_err(service_error_to_response)?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Write a new status onto an existing order
#[instrument(skip(state, body))]
pub async fn update_order_status(
    State(state): State<ApiState>,
    Path(order_id): Path<String>,
    body: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let request = json_body(body)?;

    state
        .order_service
        .update_status(&order_id, request)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Cancellation route kept for older clients. Behaves exactly like
/// `update_order_status`; the status comes from the body.
#[instrument(skip(state, body))]
pub async fn cancel_order(
    state: State<ApiState>,
    order_id: Path<String>,
    body: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    update_order_status(state, order_id, body).await
}

/// List orders, optionally restricted to one status
#[instrument(skip(state, query))]
pub async fn list_orders(
    State(state): State<ApiState>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;

    let filters = query_to_filters(query).map_err(|message| {
        crate::warn_with_trace!("Invalid query parameters: {}", message);
        error_response(StatusCode::BAD_REQUEST, message)
    })?;

    let orders = state
        .order_service
        .list_orders(filters)
        .await
        .map_err(service_error_to_response)?;

    crate::info_with_trace!("Successfully listed {} orders", orders.len());
    Ok(Json(orders))
}

fn query_to_filters(query: ListOrdersQuery) -> Result<OrderFilters, String> {
    let status = match query.status.filter(|s| !s.is_empty()) {
        Some(status) => Some(status.parse::<OrderStatus>()?),
        None => None,
    };

    Ok(OrderFilters { status })
}
