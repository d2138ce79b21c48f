use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::dynamodb::{
    condition_failed_as_not_found, optional_parsed, optional_string, optional_timestamp,
    required_string, required_timestamp, DynamoDbTable, Item,
};
use crate::models::{Food, FoodFilters, FoodType, RepositoryResult};
use crate::observability::DatabaseTracingMiddleware;

/// Data access for catalog entries
#[async_trait]
pub trait FoodRepository: Send + Sync {
    /// Find all foods matching the filters
    async fn find_all(&self, filters: FoodFilters) -> RepositoryResult<Vec<Food>>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Food>>;

    /// Insert a new food; fails if the id is taken
    async fn create(&self, food: Food) -> RepositoryResult<Food>;

    /// Replace a stored food; `RepositoryError::NotFound` if it is gone
    async fn update(&self, food: Food) -> RepositoryResult<Food>;

    /// Remove a food; `RepositoryError::NotFound` if it is gone
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}

/// DynamoDB implementation of the FoodRepository trait
pub struct DynamoDbFoodRepository {
    table: DynamoDbTable,
}

impl DynamoDbFoodRepository {
    pub fn new(
        client: Arc<DynamoDbClient>,
        table_name: String,
        region: String,
        db_tracing: DatabaseTracingMiddleware,
    ) -> Self {
        Self {
            table: DynamoDbTable::new(client, table_name, region, db_tracing),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table.table_name
    }

    /// Convert a Food to DynamoDB attributes; unset fields are omitted
    pub fn food_to_item(&self, food: &Food) -> Item {
        let mut item = HashMap::new();

        item.insert("id".to_string(), AttributeValue::S(food.id.clone()));
        if let Some(ref food_name) = food.food_name {
            item.insert(
                "food_name".to_string(),
                AttributeValue::S(food_name.clone()),
            );
        }
        if let Some(food_type) = food.food_type {
            item.insert(
                "food_type".to_string(),
                AttributeValue::S(food_type.as_str().to_string()),
            );
        }
        if let Some(minutes) = food.max_delivery_time {
            item.insert(
                "max_delivery_time".to_string(),
                AttributeValue::N(minutes.to_string()),
            );
        }
        if let Some(price) = food.price {
            item.insert("price".to_string(), AttributeValue::N(price.to_string()));
        }
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(food.created_at.to_rfc3339()),
        );
        item.insert(
            "updated_at".to_string(),
            AttributeValue::S(food.updated_at.to_rfc3339()),
        );

        item
    }

    pub fn item_to_food(&self, item: Item) -> RepositoryResult<Food> {
        let created_at = required_timestamp(&item, "created_at")?;

        Ok(Food {
            id: required_string(&item, "id")?,
            food_name: optional_string(&item, "food_name"),
            food_type: optional_parsed::<FoodType>(&item, "food_type")?,
            max_delivery_time: optional_parsed(&item, "max_delivery_time")?,
            price: optional_parsed(&item, "price")?,
            created_at,
            // Older items may predate updated_at
            updated_at: optional_timestamp(&item, "updated_at").unwrap_or(created_at),
        })
    }
}

#[async_trait]
impl FoodRepository for DynamoDbFoodRepository {
    #[instrument(skip(self), fields(table = %self.table.table_name))]
    async fn find_all(&self, filters: FoodFilters) -> RepositoryResult<Vec<Food>> {
        info!("Finding all foods with filters");

        let mut scan = self.table.client.scan().table_name(&self.table.table_name);

        let mut filter_expressions = Vec::new();
        let mut expression_attribute_values = HashMap::new();

        if let Some(food_type) = filters.food_type {
            filter_expressions.push("food_type = :food_type");
            expression_attribute_values.insert(
                ":food_type".to_string(),
                AttributeValue::S(food_type.as_str().to_string()),
            );
        }

        if let Some(max_delivery_time) = filters.max_delivery_time {
            filter_expressions.push("max_delivery_time <= :max_delivery_time");
            expression_attribute_values.insert(
                ":max_delivery_time".to_string(),
                AttributeValue::N(max_delivery_time.to_string()),
            );
        }

        if !filter_expressions.is_empty() {
            scan = scan
                .filter_expression(filter_expressions.join(" AND "))
                .set_expression_attribute_values(Some(expression_attribute_values));
        }

        let items = self.table.scan_all(scan).await?;

        let mut foods = Vec::with_capacity(items.len());
        for item in items {
            match self.item_to_food(item) {
                Ok(food) => foods.push(food),
                Err(e) => warn!("Skipping unreadable food item: {}", e),
            }
        }

        info!("Found {} foods", foods.len());
        Ok(foods)
    }

    #[instrument(skip(self), fields(table = %self.table.table_name, id = %id))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Food>> {
        let response = self
            .table
            .call(
                "GetItem",
                self.table
                    .client
                    .get_item()
                    .table_name(&self.table.table_name)
                    .key("id", AttributeValue::S(id.to_string()))
                    .send(),
            )
            .await?;

        response.item.map(|item| self.item_to_food(item)).transpose()
    }

    #[instrument(skip(self, food), fields(table = %self.table.table_name, id = %food.id))]
    async fn create(&self, food: Food) -> RepositoryResult<Food> {
        info!("Creating food");

        self.table
            .call(
                "PutItem",
                self.table
                    .client
                    .put_item()
                    .table_name(&self.table.table_name)
                    .set_item(Some(self.food_to_item(&food)))
                    .condition_expression("attribute_not_exists(id)")
                    .send(),
            )
            .await?;

        Ok(food)
    }

    #[instrument(skip(self, food), fields(table = %self.table.table_name, id = %food.id))]
    async fn update(&self, food: Food) -> RepositoryResult<Food> {
        info!("Updating food");

        self.table
            .call(
                "PutItem",
                self.table
                    .client
                    .put_item()
                    .table_name(&self.table.table_name)
                    .set_item(Some(self.food_to_item(&food)))
                    .condition_expression("attribute_exists(id)")
                    .send(),
            )
            .await
            .map_err(condition_failed_as_not_found)?;

        Ok(food)
    }

    #[instrument(skip(self), fields(table = %self.table.table_name, id = %id))]
    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        info!("Deleting food");

        self.table
            .call(
                "DeleteItem",
                self.table
                    .client
                    .delete_item()
                    .table_name(&self.table.table_name)
                    .key("id", AttributeValue::S(id.to_string()))
                    .condition_expression("attribute_exists(id)")
                    .send(),
            )
            .await
            .map_err(condition_failed_as_not_found)?;

        Ok(())
    }
}
