use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::scan::builders::ScanFluentBuilder;
use aws_sdk_dynamodb::operation::RequestId;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::{Client as DynamoDbClient, Error as DynamoDbError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, Instrument};

use crate::models::{RepositoryError, RepositoryResult};
use crate::observability::DatabaseTracingMiddleware;

pub(crate) type Item = HashMap<String, AttributeValue>;

/// One DynamoDB table plus the plumbing every call against it goes through:
/// a client span, database metrics and error mapping.
pub(crate) struct DynamoDbTable {
    pub(crate) client: Arc<DynamoDbClient>,
    pub(crate) table_name: String,
    region: String,
    db_tracing: DatabaseTracingMiddleware,
}

impl DynamoDbTable {
    pub(crate) fn new(
        client: Arc<DynamoDbClient>,
        table_name: String,
        region: String,
        db_tracing: DatabaseTracingMiddleware,
    ) -> Self {
        Self {
            client,
            table_name,
            region,
            db_tracing,
        }
    }

    fn span(&self, operation: &str) -> tracing::Span {
        tracing::info_span!(
            "DynamoDB",
            "otel.kind" = "client",
            "otel.name" = format!("DynamoDB.{}", operation),
            "aws.service" = "DynamoDB",
            "aws.operation" = operation,
            "aws.region" = %self.region,
            "aws.dynamodb.table_name" = %self.table_name,
            "aws.request_id" = tracing::field::Empty,
            "rpc.system" = "aws-api",
            "rpc.service" = "DynamoDB",
            "rpc.method" = operation,
            "db.system" = "dynamodb",
            "db.name" = %self.table_name,
            "db.operation" = operation,
        )
    }

    /// Run one SDK call inside a client span, recording database metrics
    pub(crate) async fn call<F, T, E, R>(&self, operation: &str, request: F) -> RepositoryResult<T>
    where
        F: Future<Output = Result<T, SdkError<E, R>>>,
        T: RequestId,
        DynamoDbError: From<SdkError<E, R>>,
    {
        let span = self.span(operation);

        self.db_tracing
            .trace_operation(
                operation,
                &self.table_name,
                async {
                    let output = request
                        .await
                        .map_err(|e| map_sdk_error(&self.table_name, e))?;
                    if let Some(request_id) = output.request_id() {
                        tracing::Span::current().record("aws.request_id", request_id);
                    }
                    Ok(output)
                }
                .instrument(span),
            )
            .await
    }

    /// Scan every page, following `LastEvaluatedKey`
    pub(crate) async fn scan_all(&self, scan: ScanFluentBuilder) -> RepositoryResult<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let page = scan.clone().set_exclusive_start_key(start_key.take());
            let output = self.call("Scan", page.send()).await?;

            items.extend(output.items.unwrap_or_default());

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }
}

pub(crate) fn map_sdk_error<E, R>(table_name: &str, error: SdkError<E, R>) -> RepositoryError
where
    DynamoDbError: From<SdkError<E, R>>,
{
    match &error {
        SdkError::DispatchFailure(_) => {
            error!(table = %table_name, "Could not reach DynamoDB");
            return RepositoryError::ConnectionFailed;
        }
        SdkError::TimeoutError(_) => return RepositoryError::Timeout,
        _ => {}
    }

    map_dynamodb_error(table_name, error.into())
}

pub(crate) fn map_dynamodb_error(table_name: &str, error: DynamoDbError) -> RepositoryError {
    match error {
        DynamoDbError::ConditionalCheckFailedException(e) => RepositoryError::ConstraintViolation {
            message: e
                .message()
                .unwrap_or("The conditional request failed")
                .to_string(),
        },
        DynamoDbError::ResourceNotFoundException(_) => RepositoryError::TableNotFound {
            table_name: table_name.to_string(),
        },
        other => {
            error!(table = %table_name, "DynamoDB error: {:?}", other);
            RepositoryError::AwsSdk {
                message: other.to_string(),
            }
        }
    }
}

/// A failed `attribute_exists(id)` condition means the record is gone
pub(crate) fn condition_failed_as_not_found(error: RepositoryError) -> RepositoryError {
    match error {
        RepositoryError::ConstraintViolation { .. } => RepositoryError::NotFound,
        other => other,
    }
}

pub(crate) fn required_string(item: &Item, name: &str) -> RepositoryResult<String> {
    optional_string(item, name).ok_or_else(|| RepositoryError::MalformedItem {
        message: format!("Missing {}", name),
    })
}

pub(crate) fn optional_string(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

/// Parse an optional attribute; present but unparseable is an error
pub(crate) fn optional_parsed<T: FromStr>(item: &Item, name: &str) -> RepositoryResult<Option<T>> {
    let raw = match item.get(name) {
        Some(AttributeValue::S(s)) | Some(AttributeValue::N(s)) => s,
        Some(AttributeValue::Null(_)) | None => return Ok(None),
        Some(_) => {
            return Err(RepositoryError::MalformedItem {
                message: format!("Unexpected attribute type for {}", name),
            })
        }
    };

    raw.parse::<T>()
        .map(Some)
        .map_err(|_| RepositoryError::MalformedItem {
            message: format!("Invalid {}: {}", name, raw),
        })
}

pub(crate) fn optional_timestamp(item: &Item, name: &str) -> Option<DateTime<Utc>> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn required_timestamp(item: &Item, name: &str) -> RepositoryResult<DateTime<Utc>> {
    optional_timestamp(item, name).ok_or_else(|| RepositoryError::MalformedItem {
        message: format!("Invalid {}", name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ResourceNotFoundException,
    };

    fn item(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_condition_failure_maps_to_constraint_violation() {
        let error = DynamoDbError::ConditionalCheckFailedException(
            ConditionalCheckFailedException::builder()
                .message("The conditional request failed")
                .build(),
        );

        let mapped = map_dynamodb_error("Foods", error);
        assert!(matches!(mapped, RepositoryError::ConstraintViolation { .. }));
        assert!(matches!(
            condition_failed_as_not_found(mapped),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn test_missing_table_maps_to_table_not_found() {
        let error = DynamoDbError::ResourceNotFoundException(
            ResourceNotFoundException::builder().build(),
        );

        match map_dynamodb_error("Orders", error) {
            RepositoryError::TableNotFound { table_name } => assert_eq!(table_name, "Orders"),
            other => panic!("Expected TableNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_pass_through_not_found_mapping() {
        assert!(matches!(
            condition_failed_as_not_found(RepositoryError::ConnectionFailed),
            RepositoryError::ConnectionFailed
        ));
    }

    #[test]
    fn test_attribute_helpers() {
        let item = item(&[
            ("id", AttributeValue::S("abc".to_string())),
            ("max_delivery_time", AttributeValue::N("30".to_string())),
            ("price", AttributeValue::N("not-a-number".to_string())),
            ("flag", AttributeValue::Bool(true)),
            ("created_at", AttributeValue::S("2024-01-02T03:04:05Z".to_string())),
        ]);

        assert_eq!(required_string(&item, "id").unwrap(), "abc");
        assert!(required_string(&item, "missing").is_err());
        assert_eq!(optional_parsed::<u32>(&item, "max_delivery_time").unwrap(), Some(30));
        assert_eq!(optional_parsed::<u32>(&item, "missing").unwrap(), None);
        assert!(optional_parsed::<u32>(&item, "price").is_err());
        assert!(optional_parsed::<u32>(&item, "flag").is_err());
        assert!(required_timestamp(&item, "created_at").is_ok());
        assert!(optional_timestamp(&item, "updated_at").is_none());
    }
}
