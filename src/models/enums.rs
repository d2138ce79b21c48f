use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog categories a food item can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    #[serde(rename = "delicious food")]
    DeliciousFood,
    #[serde(rename = "nutritious food")]
    NutritiousFood,
    #[serde(rename = "fast food")]
    FastFood,
    #[serde(rename = "beverages")]
    Beverages,
    #[serde(rename = "dessert")]
    Dessert,
}

impl FoodType {
    pub const ALL: [FoodType; 5] = [
        FoodType::DeliciousFood,
        FoodType::NutritiousFood,
        FoodType::FastFood,
        FoodType::Beverages,
        FoodType::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodType::DeliciousFood => "delicious food",
            FoodType::NutritiousFood => "nutritious food",
            FoodType::FastFood => "fast food",
            FoodType::Beverages => "beverages",
            FoodType::Dessert => "dessert",
        }
    }
}

impl fmt::Display for FoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delicious food" => Ok(FoodType::DeliciousFood),
            "nutritious food" => Ok(FoodType::NutritiousFood),
            "fast food" => Ok(FoodType::FastFood),
            "beverages" => Ok(FoodType::Beverages),
            "dessert" => Ok(FoodType::Dessert),
            _ => Err(format!("Invalid food type: {}", s)),
        }
    }
}

/// Lifecycle status of an order. Any status may be written over any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Placed,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "placed" => Ok(OrderStatus::Placed),
            "out for delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}
