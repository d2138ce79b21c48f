use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::dynamodb::{
    condition_failed_as_not_found, optional_timestamp, required_string, required_timestamp,
    DynamoDbTable, Item,
};
use crate::models::{Order, OrderFilters, OrderStatus, RepositoryError, RepositoryResult};
use crate::observability::DatabaseTracingMiddleware;

/// Data access for orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_all(&self, filters: OrderFilters) -> RepositoryResult<Vec<Order>>;

    async fn create(&self, order: Order) -> RepositoryResult<Order>;

    /// Overwrite the status and return the order as stored afterwards.
    /// `RepositoryError::NotFound` if no order has this id.
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<Order>;
}

pub struct DynamoDbOrderRepository {
    table: DynamoDbTable,
}

impl DynamoDbOrderRepository {
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

    pub fn order_to_item(&self, order: &Order) -> Item {
        HashMap::from([
            ("id".to_string(), AttributeValue::S(order.id.clone())),
            (
                "food_id".to_string(),
                AttributeValue::S(order.food_id.clone()),
            ),
            (
                "status".to_string(),
                AttributeValue::S(order.status.as_str().to_string()),
            ),
            (
                "created_at".to_string(),
                AttributeValue::S(order.created_at.to_rfc3339()),
            ),
            (
                "updated_at".to_string(),
                AttributeValue::S(order.updated_at.to_rfc3339()),
            ),
        ])
    }

    pub fn item_to_order(&self, item: Item) -> RepositoryResult<Order> {
        let status = required_string(&item, "status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|message| RepositoryError::MalformedItem { message })?;
        let created_at = required_timestamp(&item, "created_at")?;

        Ok(Order {
            id: required_string(&item, "id")?,
            food_id: required_string(&item, "food_id")?,
            status,
            created_at,
            updated_at: optional_timestamp(&item, "updated_at").unwrap_or(created_at),
        })
    }
}

#[async_trait]
impl OrderRepository for DynamoDbOrderRepository {
    #[instrument(skip(self), fields(table = %self.table.table_name))]
    async fn find_all(&self, filters: OrderFilters) -> RepositoryResult<Vec<Order>> {
        info!("Finding orders");

        let mut scan = self.table.client.scan().table_name(&self.table.table_name);

        if let Some(status) = filters.status {
            // status is a DynamoDB reserved word
            scan = scan
                .filter_expression("#status = :status")
                .expression_attribute_names("#status", "status")
                .expression_attribute_values(
                    ":status",
                    AttributeValue::S(status.as_str().to_string()),
                );
        }

        let items = self.table.scan_all(scan).await?;

        let mut orders = Vec::with_capacity(items.len());
        for item in items {
            match self.item_to_order(item) {
                Ok(order) => orders.push(order),
                Err(e) => warn!("Skipping unreadable order item: {}", e),
            }
        }

        info!("Found {} orders", orders.len());
        Ok(orders)
    }

    #[instrument(skip(self, order), fields(table = %self.table.table_name, id = %order.id))]
    async fn create(&self, order: Order) -> RepositoryResult<Order> {
        info!("Creating order");

        self.table
            .call(
                "PutItem",
                self.table
                    .client
                    .put_item()
                    .table_name(&self.table.table_name)
                    .set_item(Some(self.order_to_item(&order)))
                    .condition_expression("attribute_not_exists(id)")
                    .send(),
            )
            .await?;

        Ok(order)
    }

    #[instrument(skip(self), fields(table = %self.table.table_name, id = %id, status = %status))]
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> RepositoryResult<Order> {
        info!("Updating order status");

        let response = self
            .table
            .call(
                "UpdateItem",
                self.table
                    .client
                    .update_item()
                    .table_name(&self.table.table_name)
                    .key("id", AttributeValue::S(id.to_string()))
                    .update_expression("SET #status = :status, updated_at = :updated_at")
                    .condition_expression("attribute_exists(id)")
                    .expression_attribute_names("#status", "status")
                    .expression_attribute_values(
                        ":status",
                        AttributeValue::S(status.as_str().to_string()),
                    )
                    .expression_attribute_values(
                        ":updated_at",
                        AttributeValue::S(updated_at.to_rfc3339()),
                    )
                    .return_values(ReturnValue::AllNew)
                    .send(),
            )
            .await
            .map_err(condition_failed_as_not_found)?;

        let attributes = response
            .attributes
            .ok_or_else(|| RepositoryError::MalformedItem {
                message: "UpdateItem returned no attributes".to_string(),
            })?;

        self.item_to_order(attributes)
    }
}
