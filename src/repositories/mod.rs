// Repositories module - data access layer

mod dynamodb;
pub mod food_repository;
pub mod order_repository;
pub mod table_manager;


pub use food_repository::{DynamoDbFoodRepository, FoodRepository};
pub use order_repository::{DynamoDbOrderRepository, OrderRepository};
pub use table_manager::TableManager;
