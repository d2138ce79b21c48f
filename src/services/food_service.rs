use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    is_valid_id, CreateFoodRequest, DeleteFoodResponse, Food, FoodFilters, RepositoryError,
    ServiceError, ServiceResult, UpdateFoodRequest, Validate,
};
use crate::observability::BusinessTracingMiddleware;
use crate::repositories::FoodRepository;

/// Service for managing the food catalog
pub struct FoodService {
    repository: Arc<dyn FoodRepository>,
    tracing: Option<Arc<BusinessTracingMiddleware>>,
}

impl FoodService {
    pub fn new(repository: Arc<dyn FoodRepository>) -> Self {
        Self {
            repository,
            tracing: None,
        }
    }

    /// Create a FoodService that records catalog metrics
    pub fn new_with_tracing(
        repository: Arc<dyn FoodRepository>,
        tracing: Arc<BusinessTracingMiddleware>,
    ) -> Self {
        Self {
            repository,
            tracing: Some(tracing),
        }
    }

    async fn traced<F, T>(&self, operation: &str, food_type: Option<&str>, future: F) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        match &self.tracing {
            Some(tracing) => {
                tracing
                    .trace_food_operation(operation, food_type, future)
                    .await
            }
            None => future.await,
        }
    }

    /// List foods matching the filters, in store order
    #[instrument(skip(self), fields(filters = ?filters))]
    pub async fn list_foods(&self, filters: FoodFilters) -> ServiceResult<Vec<Food>> {
        let food_type = filters.food_type.map(|t| t.as_str());

        self.traced("list", food_type, async {
            crate::info_with_trace!("Listing foods with filters");

            let foods: Vec<Food> = self
                .repository
                .find_all(filters.clone())
                .await?
                .into_iter()
                .filter(|food| food.matches_filters(&filters))
                .collect();

            crate::info_with_trace!("Found {} foods matching criteria", foods.len());
            Ok(foods)
        })
        .await
    }

    /// Get a food by id; malformed ids are reported as not found
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_food(&self, id: &str) -> ServiceResult<Food> {
        self.traced("get", None, self.load(id)).await
    }

    #[instrument(skip(self, request), fields(food_name = ?request.food_name))]
    pub async fn create_food(&self, request: CreateFoodRequest) -> ServiceResult<Food> {
        let food_type = request.food_type.map(|t| t.as_str());

        self.traced("create", food_type, async {
            request.validate()?;

            let created = self.repository.create(Food::new(request)).await?;

            crate::info_with_trace!("Food created successfully with ID: {}", created.id);
            Ok(created)
        })
        .await
    }

    /// Apply a partial update: every supplied field overwrites, the rest stay
    #[instrument(skip(self, request), fields(id = %id))]
    pub async fn update_food(&self, id: &str, request: UpdateFoodRequest) -> ServiceResult<Food> {
        self.traced("update", None, async {
            request.validate()?;

            let mut food = self.load(id).await?;
            food.update(request);

            let updated = self
                .repository
                .update(food)
                .await
                .map_err(|e| not_found_or(e, id))?;

            crate::info_with_trace!("Food updated successfully");
            Ok(updated)
        })
        .await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_food(&self, id: &str) -> ServiceResult<DeleteFoodResponse> {
        self.traced("delete", None, async {
            self.load(id).await?;

            self.repository
                .delete(id)
                .await
                .map_err(|e| not_found_or(e, id))?;

            crate::info_with_trace!("Food deleted successfully");
            Ok(DeleteFoodResponse::default())
        })
        .await
    }

    async fn load(&self, id: &str) -> ServiceResult<Food> {
        if !is_valid_id(id) {
            crate::warn_with_trace!("Malformed food id");
            return Err(ServiceError::FoodNotFound { id: id.to_string() });
        }

        match self.repository.find_by_id(id).await? {
            Some(food) => Ok(food),
            None => {
                crate::warn_with_trace!("Food not found");
                Err(ServiceError::FoodNotFound { id: id.to_string() })
            }
        }
    }
}

/// The record vanished between load and write
fn not_found_or(error: RepositoryError, id: &str) -> ServiceError {
    match error {
        RepositoryError::NotFound => ServiceError::FoodNotFound { id: id.to_string() },
        other => other.into(),
    }
}
