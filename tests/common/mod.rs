#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use foodorder_rs::models::{
    Food, FoodFilters, Order, OrderFilters, OrderStatus, RepositoryError,
};
use foodorder_rs::repositories::{FoodRepository, OrderRepository};
use foodorder_rs::services::{FoodService, OrderService};
use foodorder_rs::{create_app, Metrics};

/// Keeps insertion order so listings are deterministic
struct Table<T> {
    order: Vec<String>,
    rows: HashMap<String, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn values(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect()
    }

    fn insert(&mut self, id: String, row: T) -> Result<(), RepositoryError> {
        if self.rows.contains_key(&id) {
            return Err(RepositoryError::ConstraintViolation {
                message: format!("Item {} already exists", id),
            });
        }
        self.order.push(id.clone());
        self.rows.insert(id, row);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFoodRepository {
    table: RwLock<Table<Food>>,
}

#[async_trait]
impl FoodRepository for InMemoryFoodRepository {
    async fn find_all(&self, filters: FoodFilters) -> Result<Vec<Food>, RepositoryError> {
        Ok(self
            .table
            .read()
            .await
            .values()
            .into_iter()
            .filter(|food| food.matches_filters(&filters))
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Food>, RepositoryError> {
        Ok(self.table.read().await.rows.get(id).cloned())
    }

    async fn create(&self, food: Food) -> Result<Food, RepositoryError> {
        self.table
            .write()
            .await
            .insert(food.id.clone(), food.clone())?;
        Ok(food)
    }

    async fn update(&self, food: Food) -> Result<Food, RepositoryError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&food.id) {
            Some(row) => {
                *row = food.clone();
                Ok(food)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        if table.rows.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        table.order.retain(|existing| existing != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    table: RwLock<Table<Order>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_all(&self, filters: OrderFilters) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .table
            .read()
            .await
            .values()
            .into_iter()
            .filter(|order| order.matches_filters(&filters))
            .collect())
    }

    async fn create(&self, order: Order) -> Result<Order, RepositoryError> {
        self.table
            .write()
            .await
            .insert(order.id.clone(), order.clone())?;
        Ok(order)
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(id) {
            Some(order) => {
                order.status = status;
                order.updated_at = updated_at;
                Ok(order.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub metrics: Arc<Metrics>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
        let food_service = Arc::new(FoodService::new(Arc::new(
            InMemoryFoodRepository::default(),
        )));
        let order_service = Arc::new(OrderService::new(Arc::new(
            InMemoryOrderRepository::default(),
        )));

        let app = create_app(metrics.clone(), food_service, order_service, 1024 * 1024);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            client: Client::new(),
            base_url,
            metrics,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
