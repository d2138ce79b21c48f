use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::models::{
    CreateFoodRequest, DeleteFoodResponse, Food, FoodFilters, FoodType, UpdateFoodRequest,
};

use super::api::{
    error_response, json_body, query_rejection, service_error_to_response, ApiError, ApiState,
};

/// Query parameters for listing foods
#[derive(Debug, Default, Deserialize)]
pub struct ListFoodsQuery {
    #[serde(rename = "type")]
    pub food_type: Option<String>,
    pub maxdeliverytime: Option<String>,
}

/// List all foods with optional filters
#[instrument(skip(state, query))]
pub async fn list_foods(
    State(state): State<ApiState>,
    query: Result<Query<ListFoodsQuery>, QueryRejection>,
) -> Result<Json<Vec<Food>>, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;

    let filters = query_to_filters(query).map_err(|message| {
        crate::warn_with_trace!("Invalid query parameters: {}", message);
        error_response(StatusCode::BAD_REQUEST, message)
    })?;

    let foods = state
        .food_service
        .list_foods(filters)
        .await
        .map_err(service_error_to_response)?;

    crate::info_with_trace!("Successfully listed {} foods", foods.len());
    Ok(Json(foods))
}

/// Get a specific food by ID
#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<ApiState>,
    Path(food_id): Path<String>,
) -> Result<Json<Food>, ApiError> {
    state
        .food_service
        .get_food(&food_id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<ApiState>,
    body: Result<Json<CreateFoodRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Food>), ApiError> {
    let request = json_body(body)?;

    let food = state
        .food_service
        .create_food(request)
        .await
        .map_err(service_error_to_response)?;

    crate::info_with_trace!("Created food {}", food.id);
    Ok((StatusCode::CREATED, Json(food)))
}

/// Apply a partial update to a food
#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<ApiState>,
    Path(food_id): Path<String>,
    body: Result<Json<UpdateFoodRequest>, JsonRejection>,
) -> Result<Json<Food>, ApiError> {
    let request = json_body(body)?;

    state
        .food_service
        .update_food(&food_id, request)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<ApiState>,
    Path(food_id): Path<String>,
) -> Result<Json<DeleteFoodResponse>, ApiError> {
    state
        .food_service
        .delete_food(&food_id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Convert query parameters to filters. Empty values are ignored.
fn query_to_filters(query: ListFoodsQuery) -> Result<FoodFilters, String> {
    let mut filters = FoodFilters::default();

    if let Some(food_type) = query.food_type.filter(|v| !v.is_empty()) {
        filters.food_type = Some(food_type.parse::<FoodType>()?);
    }

    if let Some(minutes) = query.maxdeliverytime.filter(|v| !v.is_empty()) {
        let parsed = minutes
            .trim()
            .parse::<Decimal>()
            .map_err(|_| format!("Invalid maxdeliverytime: {}", minutes))?;
        filters.max_delivery_time = Some(parsed);
    }

    Ok(filters)
}
