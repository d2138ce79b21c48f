use rust_decimal::Decimal;

use super::{
    is_valid_id, CreateFoodRequest, CreateOrderRequest, UpdateFoodRequest,
    UpdateOrderStatusRequest, ValidationError, ValidationResult,
};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_FOOD_NAME_LENGTH: usize = 200;
pub const MIN_PRICE: Decimal = Decimal::ZERO;
pub const MAX_PRICE: Decimal = Decimal::from_parts(999999, 0, 0, false, 2); // 9999.99
pub const MAX_PRICE_SCALE: u32 = 2;
pub const MAX_DELIVERY_TIME_MINUTES: Decimal = Decimal::from_parts(1440, 0, 0, false, 0);

impl Validate for CreateFoodRequest {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.food_name {
            validate_food_name(name)?;
        }
        if let Some(price) = &self.price {
            validate_food_price(price)?;
        }
        if let Some(minutes) = &self.max_delivery_time {
            validate_max_delivery_time(minutes)?;
        }
        Ok(())
    }
}

impl Validate for UpdateFoodRequest {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.food_name {
            validate_food_name(name)?;
        }
        if let Some(price) = &self.price {
            validate_food_price(price)?;
        }
        if let Some(minutes) = &self.max_delivery_time {
            validate_max_delivery_time(minutes)?;
        }
        Ok(())
    }
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> ValidationResult<()> {
        match &self.food_id {
            Some(food_id) => validate_record_id("foodId", food_id),
            None => Err(ValidationError::RequiredField {
                field: "foodId".to_string(),
            }),
        }
    }
}

impl Validate for UpdateOrderStatusRequest {
    fn validate(&self) -> ValidationResult<()> {
        if self.status.is_none() {
            return Err(ValidationError::RequiredField {
                field: "status".to_string(),
            });
        }
        Ok(())
    }
}

/// Validate food name. Empty names are allowed.
pub fn validate_food_name(name: &str) -> ValidationResult<()> {
    let length = name.chars().count();
    if length > MAX_FOOD_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "foodName".to_string(),
            max_length: MAX_FOOD_NAME_LENGTH,
            actual_length: length,
        });
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidValue {
            field: "foodName".to_string(),
            value: name.escape_debug().to_string(),
            reason: "Contains invalid control characters".to_string(),
        });
    }

    Ok(())
}

/// Validate food price
pub fn validate_food_price(price: &Decimal) -> ValidationResult<()> {
    if *price < MIN_PRICE || *price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: MIN_PRICE.to_string(),
            max: MAX_PRICE.to_string(),
            value: price.to_string(),
        });
    }

    if price.normalize().scale() > MAX_PRICE_SCALE {
        return Err(ValidationError::InvalidValue {
            field: "price".to_string(),
            value: price.to_string(),
            reason: "Price cannot have more than 2 decimal places".to_string(),
        });
    }

    Ok(())
}

/// Validate delivery time in minutes
pub fn validate_max_delivery_time(minutes: &Decimal) -> ValidationResult<()> {
    if *minutes < Decimal::ZERO || *minutes > MAX_DELIVERY_TIME_MINUTES {
        return Err(ValidationError::OutOfRange {
            field: "maxDeliveryTime".to_string(),
            min: "0".to_string(),
            max: MAX_DELIVERY_TIME_MINUTES.to_string(),
            value: minutes.to_string(),
        });
    }

    Ok(())
}

/// Validate a reference to another record
pub fn validate_record_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    if !is_valid_id(id) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: "32 lowercase hexadecimal characters".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{generate_id, OrderStatus};
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_create_food_request() {
        let request = CreateFoodRequest {
            food_name: Some("Pizza".to_string()),
            food_type: None,
            max_delivery_time: Some(dec!(30)),
            price: Some(dec!(12.50)),
        };
        assert!(request.validate().is_ok());

        // every field is optional
        assert!(CreateFoodRequest::default().validate().is_ok());
    }

    #[test]
    fn test_food_name_validation() {
        assert!(validate_food_name("").is_ok());
        assert!(validate_food_name("Pad Thai").is_ok());
        assert!(validate_food_name(&"a".repeat(MAX_FOOD_NAME_LENGTH)).is_ok());

        match validate_food_name(&"a".repeat(MAX_FOOD_NAME_LENGTH + 1)) {
            Err(ValidationError::TooLong { actual_length, .. }) => {
                assert_eq!(actual_length, MAX_FOOD_NAME_LENGTH + 1)
            }
            other => panic!("Expected TooLong, got {:?}", other),
        }

        assert!(validate_food_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn test_price_validation() {
        assert!(validate_food_price(&Decimal::ZERO).is_ok());
        assert!(validate_food_price(&dec!(9999.99)).is_ok());
        assert!(validate_food_price(&dec!(12.500)).is_ok());

        assert!(validate_food_price(&dec!(-0.01)).is_err());
        assert!(validate_food_price(&dec!(10000)).is_err());
        assert!(validate_food_price(&dec!(1.999)).is_err());
    }

    #[test]
    fn test_delivery_time_validation() {
        assert!(validate_max_delivery_time(&Decimal::ZERO).is_ok());
        assert!(validate_max_delivery_time(&dec!(30.5)).is_ok());
        assert!(validate_max_delivery_time(&MAX_DELIVERY_TIME_MINUTES).is_ok());

        assert!(validate_max_delivery_time(&dec!(1440.01)).is_err());
        assert!(validate_max_delivery_time(&dec!(-5)).is_err());
        assert!(validate_max_delivery_time(&dec!(-0.5)).is_err());
    }

    #[test]
    fn test_update_request_validation() {
        let request = UpdateFoodRequest {
            price: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        let request = UpdateFoodRequest {
            max_delivery_time: Some(dec!(5000)),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_order_validation() {
        let request = CreateOrderRequest {
            food_id: Some(generate_id()),
        };
        assert!(request.validate().is_ok());

        match CreateOrderRequest::default().validate() {
            Err(ValidationError::RequiredField { field }) => assert_eq!(field, "foodId"),
            other => panic!("Expected RequiredField, got {:?}", other),
        }

        let request = CreateOrderRequest {
            food_id: Some("pizza".to_string()),
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_update_status_validation() {
        let request = UpdateOrderStatusRequest {
            status: Some(OrderStatus::Delivered),
            order_id: None,
        };
        assert!(request.validate().is_ok());
        assert!(UpdateOrderStatusRequest::default().validate().is_err());
    }
}
