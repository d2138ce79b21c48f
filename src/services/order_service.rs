use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    is_valid_id, CreateOrderRequest, Order, OrderFilters, RepositoryError, ServiceError,
    ServiceResult, UpdateOrderStatusRequest, Validate, ValidationError,
};
use crate::observability::BusinessTracingMiddleware;
use crate::repositories::OrderRepository;

/// Service for placing orders and moving them between statuses.
///
/// There is no transition guard: any status may be written over any other.
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    tracing: Option<Arc<BusinessTracingMiddleware>>,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self {
            repository,
            tracing: None,
        }
    }

    pub fn new_with_tracing(
        repository: Arc<dyn OrderRepository>,
        tracing: Arc<BusinessTracingMiddleware>,
    ) -> Self {
        Self {
            repository,
            tracing: Some(tracing),
        }
    }

    async fn traced<F, T>(&self, operation: &str, status: Option<&str>, future: F) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        match &self.tracing {
            Some(tracing) => tracing.trace_order_operation(operation, status, future).await,
            None => future.await,
        }
    }

    /// Place an order. The food reference is not checked for existence.
    #[instrument(skip(self, request), fields(food_id = ?request.food_id))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> ServiceResult<Order> {
        self.traced("create", Some("Placed"), async {
            request.validate()?;
            let food_id = request.food_id.ok_or_else(|| ValidationError::RequiredField {
                field: "foodId".to_string(),
            })?;

            let created = self.repository.create(Order::new(food_id)).await?;

            crate::info_with_trace!("Order created successfully with ID: {}", created.id);
            Ok(created)
        })
        .await
    }

    /// Write `request.status` onto the order and return the stored result
    #[instrument(skip(self, request), fields(id = %id, status = ?request.status))]
    pub async fn update_status(
        &self,
        id: &str,
        request: UpdateOrderStatusRequest,
    ) -> ServiceResult<Order> {
        let status_label = request.status.map(|s| s.as_str());

        self.traced("update_status", status_label, async {
            request.validate()?;
            let status = request.status.ok_or_else(|| ValidationError::RequiredField {
                field: "status".to_string(),
            })?;

            if !is_valid_id(id) {
                crate::warn_with_trace!("Malformed order id");
                return Err(ServiceError::OrderNotFound { id: id.to_string() });
            }

            let order = self
                .repository
                .update_status(id, status, Utc::now())
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => ServiceError::OrderNotFound { id: id.to_string() },
                    other => other.into(),
                })?;

            crate::info_with_trace!("Order status set to {}", order.status);
            Ok(order)
        })
        .await
    }

    /// List orders, optionally only those with the given status
    #[instrument(skip(self), fields(filters = ?filters))]
    pub async fn list_orders(&self, filters: OrderFilters) -> ServiceResult<Vec<Order>> {
        let status_label = filters.status.map(|s| s.as_str());

        self.traced("list", status_label, async {
            let orders: Vec<Order> = self
                .repository
                .find_all(filters.clone())
                .await?
                .into_iter()
                .filter(|order| order.matches_filters(&filters))
                .collect();

            crate::info_with_trace!("Found {} orders", orders.len());
            Ok(orders)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{generate_id, OrderStatus};
    use crate::observability::Metrics;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use mockall::mock;
    use mockall::predicate::{always, eq};

    mock! {
        TestOrderRepository {}

        #[async_trait]
        impl OrderRepository for TestOrderRepository {
            async fn find_all(&self, filters: OrderFilters) -> Result<Vec<Order>, RepositoryError>;
            async fn create(&self, order: Order) -> Result<Order, RepositoryError>;
            async fn update_status(
                &self,
                id: &str,
                status: OrderStatus,
                updated_at: DateTime<Utc>,
            ) -> Result<Order, RepositoryError>;
        }
    }

    fn status_request(status: OrderStatus) -> UpdateOrderStatusRequest {
        UpdateOrderStatusRequest {
            status: Some(status),
            order_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_order_is_placed() {
        let mut mock_repo = MockTestOrderRepository::new();
        mock_repo.expect_create().times(1).returning(Ok);

        let service = OrderService::new(Arc::new(mock_repo));
        let food_id = generate_id();

        let order = service
            .create_order(CreateOrderRequest {
                food_id: Some(food_id.clone()),
            })
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.food_id, food_id);
    }

    #[tokio::test]
    async fn test_create_order_requires_food_id() {
        let mut mock_repo = MockTestOrderRepository::new();
        mock_repo.expect_create().never();

        let service = OrderService::new(Arc::new(mock_repo));

        match service.create_order(CreateOrderRequest::default()).await {
            Err(ServiceError::ValidationError { message }) => assert!(message.contains("foodId")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_updates_have_no_transition_guard() {
        let mut mock_repo = MockTestOrderRepository::new();
        let order = Order::new(generate_id());
        let id = order.id.clone();

        mock_repo
            .expect_update_status()
            .with(eq(id.clone()), always(), always())
            .times(2)
            .returning(move |_, status, updated_at| {
                let mut updated = order.clone();
                updated.status = status;
                updated.updated_at = updated_at;
                Ok(updated)
            });

        let service = OrderService::new(Arc::new(mock_repo));

        let cancelled = service
            .update_status(&id, status_request(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let delivered = service
            .update_status(&id, status_request(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_update_status_missing_order() {
        let mut mock_repo = MockTestOrderRepository::new();
        mock_repo
            .expect_update_status()
            .returning(|_, _, _| Err(RepositoryError::NotFound));

        let service = OrderService::new(Arc::new(mock_repo));
        let id = generate_id();

        match service
            .update_status(&id, status_request(OrderStatus::Delivered))
            .await
        {
            Err(ServiceError::OrderNotFound { id: missing }) => assert_eq!(missing, id),
            other => panic!("Expected OrderNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_status_requires_status() {
        let mut mock_repo = MockTestOrderRepository::new();
        mock_repo.expect_update_status().never();

        let service = OrderService::new(Arc::new(mock_repo));

        let result = service
            .update_status(&generate_id(), UpdateOrderStatusRequest::default())
            .await;
        assert!(matches!(result, Err(ServiceError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_update_status_malformed_id() {
        let mut mock_repo = MockTestOrderRepository::new();
        mock_repo.expect_update_status().never();

        let service = OrderService::new(Arc::new(mock_repo));

        let result = service
            .update_status("42", status_request(OrderStatus::Cancelled))
            .await;
        assert!(matches!(result, Err(ServiceError::OrderNotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_orders_by_status() {
        let mut mock_repo = MockTestOrderRepository::new();
        let placed = Order::new(generate_id());
        let mut delivered = Order::new(generate_id());
        delivered.status = OrderStatus::Delivered;
        let orders = vec![placed.clone(), delivered.clone()];

        mock_repo
            .expect_find_all()
            .returning(move |_| Ok(orders.clone()));

        let service = OrderService::new(Arc::new(mock_repo));

        let all = service.list_orders(OrderFilters::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_delivered = service
            .list_orders(OrderFilters {
                status: Some(OrderStatus::Delivered),
            })
            .await
            .unwrap();
        assert_eq!(only_delivered, vec![delivered]);
    }

    #[tokio::test]
    async fn test_tracing_records_order_metrics() {
        let mut mock_repo = MockTestOrderRepository::new();
        mock_repo
            .expect_update_status()
            .returning(|_, _, _| Err(RepositoryError::ConnectionFailed));

        let metrics = Arc::new(Metrics::new().unwrap());
        let service = OrderService::new_with_tracing(
            Arc::new(mock_repo),
            Arc::new(BusinessTracingMiddleware::new(metrics.clone())),
        );

        let result = service
            .update_status(&generate_id(), status_request(OrderStatus::OutForDelivery))
            .await;
        assert!(result.is_err());

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains(r#"order_status="Out for Delivery""#));
        assert!(encoded.contains(r#"status="error""#));
    }
}
