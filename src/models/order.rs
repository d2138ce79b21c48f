use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{generate_id, OrderStatus};

/// A request to purchase a food item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Loose reference; the food may no longer exist
    pub food_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request model for placing an order.
///
/// Any `status` supplied by the client is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub food_id: Option<String>,
}

/// Request model for writing an order status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Accepted for compatibility with older clients, never read
    #[serde(default, skip_serializing)]
    pub order_id: Option<serde_json::Value>,
}

/// Filters for listing orders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
}

impl Order {
    /// Create a freshly placed order for `food_id`
    pub fn new(food_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            food_id,
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn matches_filters(&self, filters: &OrderFilters) -> bool {
        match filters.status {
            Some(status) => self.status == status,
            None => true,
        }
    }
}
