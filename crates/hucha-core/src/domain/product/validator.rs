//! Product validation
//!
//! Structural validation for product create and update inputs, accumulating
//! all failures into one per-field diagnostic map.

use rust_decimal::Decimal;

use super::model::{NewProduct, ProductInput, ProductUpdate, ProductUpdateInput, Sku};
use crate::domain::money;
use crate::error::{Result, ValidationErrors};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;
const PRICE_INTEGRAL_DIGITS: u32 = 8;

/// Validator for product inputs
pub struct ProductValidator;

impl ProductValidator {
    /// Validate a create input.
    ///
    /// Rules:
    /// - name: required, 3 to 100 characters
    /// - description: optional, at most 500 characters
    /// - quantity / minStock: required, non-negative; independent of each
    ///   other, so a product may be created already below its minimum
    /// - price: required, > 0, at most 8 integral digits and 2 decimals
    /// - sku: required, `^[A-Z]{3}-[0-9]{4}$`
    pub fn validate_create(input: &ProductInput) -> Result<NewProduct> {
        let mut errors = ValidationErrors::new();

        let name = Self::check_name(input.name.as_deref(), &mut errors);
        let description = Self::check_description(input.description.as_deref(), &mut errors);

        let quantity = match input.quantity {
            None => {
                errors.push("quantity", "quantity is required");
                None
            }
            Some(q) if q < 0 => {
                errors.push("quantity", "quantity must not be negative");
                None
            }
            Some(q) => Some(q),
        };

        let min_stock = Self::check_min_stock(input.min_stock, &mut errors);
        let price = Self::check_price(input.price, &mut errors);

        let sku = match input.sku.as_deref() {
            None => {
                errors.push("sku", "sku is required");
                None
            }
            Some(raw) => {
                let parsed = Sku::parse(raw);
                if parsed.is_none() {
                    errors.push(
                        "sku",
                        "sku must be 3 uppercase letters, a hyphen, and 4 digits (e.g. PRD-0001)",
                    );
                }
                parsed
            }
        };

        errors.into_result()?;

        Ok(NewProduct {
            name: name.unwrap(),
            description,
            quantity: quantity.unwrap(),
            min_stock: min_stock.unwrap(),
            price: price.unwrap(),
            sku: sku.unwrap(),
        })
    }

    /// Validate an update input. Only descriptive fields are replaceable;
    /// quantity and SKU never pass through here.
    pub fn validate_update(input: &ProductUpdateInput) -> Result<ProductUpdate> {
        let mut errors = ValidationErrors::new();

        let name = Self::check_name(input.name.as_deref(), &mut errors);
        let description = Self::check_description(input.description.as_deref(), &mut errors);
        let min_stock = Self::check_min_stock(input.min_stock, &mut errors);
        let price = Self::check_price(input.price, &mut errors);

        errors.into_result()?;

        Ok(ProductUpdate {
            name: name.unwrap(),
            description,
            min_stock: min_stock.unwrap(),
            price: price.unwrap(),
        })
    }

    fn check_name(name: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
        match name {
            None => {
                errors.push("name", "name is required");
                None
            }
            Some(raw) => {
                let trimmed = raw.trim();
                let len = trimmed.chars().count();
                if !(NAME_MIN..=NAME_MAX).contains(&len) {
                    errors.push(
                        "name",
                        format!("name must contain between {} and {} characters", NAME_MIN, NAME_MAX),
                    );
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    fn check_description(
        description: Option<&str>,
        errors: &mut ValidationErrors,
    ) -> Option<String> {
        match description {
            None => None,
            Some(raw) => {
                if raw.chars().count() > DESCRIPTION_MAX {
                    errors.push(
                        "description",
                        format!("description must contain at most {} characters", DESCRIPTION_MAX),
                    );
                    None
                } else {
                    Some(raw.to_string())
                }
            }
        }
    }

    fn check_min_stock(min_stock: Option<i64>, errors: &mut ValidationErrors) -> Option<i64> {
        match min_stock {
            None => {
                errors.push("minStock", "minStock is required");
                None
            }
            Some(m) if m < 0 => {
                errors.push("minStock", "minStock must not be negative");
                None
            }
            Some(m) => Some(m),
        }
    }

    fn check_price(price: Option<Decimal>, errors: &mut ValidationErrors) -> Option<Decimal> {
        match price {
            None => {
                errors.push("price", "price is required");
                None
            }
            Some(value) => {
                if value <= Decimal::ZERO {
                    errors.push("price", "price must be greater than 0");
                    None
                } else if money::fractional_digits(value) > 2 {
                    errors.push("price", "price must have at most 2 decimal places");
                    None
                } else if !money::fits_integral_digits(value, PRICE_INTEGRAL_DIGITS) {
                    errors.push(
                        "price",
                        format!("price must have at most {} integral digits", PRICE_INTEGRAL_DIGITS),
                    );
                    None
                } else {
                    Some(value)
                }
            }
        }
    }
}
