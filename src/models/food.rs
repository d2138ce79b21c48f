use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{generate_id, FoodType};

/// Catalog entry for a purchasable dish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_type: Option<FoodType>,
    /// Minutes, fractions allowed
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub max_delivery_time: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request model for creating a new food item. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub food_type: Option<FoodType>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub max_delivery_time: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

/// Partial update for a food item.
///
/// `None` means the field was not supplied and keeps its stored value.
/// `Some` overwrites, including zero and the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodRequest {
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub food_type: Option<FoodType>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub max_delivery_time: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

/// Filters for listing food items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodFilters {
    pub food_type: Option<FoodType>,
    pub max_delivery_time: Option<Decimal>,
}

/// Body returned after a successful delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFoodResponse {
    pub message: String,
}

impl Default for DeleteFoodResponse {
    fn default() -> Self {
        Self {
            message: "Food item deleted".to_string(),
        }
    }
}

impl Food {
    /// Create a new Food with a generated ID and timestamps
    pub fn new(request: CreateFoodRequest) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            food_name: request.food_name,
            food_type: request.food_type,
            max_delivery_time: request.max_delivery_time,
            price: request.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every field supplied in the request
    pub fn update(&mut self, request: UpdateFoodRequest) {
        if let Some(food_name) = request.food_name {
            self.food_name = Some(food_name);
        }
        if let Some(food_type) = request.food_type {
            self.food_type = Some(food_type);
        }
        if let Some(max_delivery_time) = request.max_delivery_time {
            self.max_delivery_time = Some(max_delivery_time);
        }
        if let Some(price) = request.price {
            self.price = Some(price);
        }
        self.updated_at = Utc::now();
    }

    /// Check if the food matches the given filters.
    ///
    /// A delivery-time filter never matches a food without a delivery time.
    pub fn matches_filters(&self, filters: &FoodFilters) -> bool {
        if let Some(food_type) = &filters.food_type {
            if self.food_type.as_ref() != Some(food_type) {
                return false;
            }
        }

        if let Some(max_delivery_time) = filters.max_delivery_time {
            match self.max_delivery_time {
                Some(minutes) if minutes <= max_delivery_time => {}
                _ => return false,
            }
        }

        true
    }
}
