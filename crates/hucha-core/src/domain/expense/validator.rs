//! Expense validation
//!
//! Structural validation of decoded expense inputs. All failures are
//! accumulated into one per-field diagnostic map so a single response names
//! every offending field.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::{Category, ExpenseInput, NewExpense, PaymentMethod};
use crate::domain::money;
use crate::error::{Result, ValidationErrors};

const DESCRIPTION_MIN: usize = 3;
const DESCRIPTION_MAX: usize = 200;
const AMOUNT_INTEGRAL_DIGITS: u32 = 10;

/// Validator for expense create and full-update inputs
pub struct ExpenseValidator;

impl ExpenseValidator {
    /// Validate a decoded input against the expense invariants.
    ///
    /// Rules:
    /// - description: required, 3 to 200 characters
    /// - amount: required, > 0, at most 10 integral digits and 2 decimals
    /// - category / paymentMethod: required, member of the closed set
    /// - date: required, not after `today`
    ///
    /// Updates are full replacement, so the same rules apply to both
    /// operations.
    pub fn validate(input: &ExpenseInput, today: NaiveDate) -> Result<NewExpense> {
        let mut errors = ValidationErrors::new();

        let description = match input.description.as_deref() {
            None => {
                errors.push("description", "description is required");
                None
            }
            Some(raw) => {
                let trimmed = raw.trim();
                let len = trimmed.chars().count();
                if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&len) {
                    errors.push(
                        "description",
                        format!(
                            "description must contain between {} and {} characters",
                            DESCRIPTION_MIN, DESCRIPTION_MAX
                        ),
                    );
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        };

        let amount = match input.amount {
            None => {
                errors.push("amount", "amount is required");
                None
            }
            Some(value) => Self::check_amount(value, &mut errors),
        };

        let category = match input.category.as_deref() {
            None => {
                errors.push("category", "category is required");
                None
            }
            Some(name) => {
                let parsed = Category::parse(name);
                if parsed.is_none() {
                    errors.push("category", format!("unknown category '{}'", name));
                }
                parsed
            }
        };

        let payment_method = match input.payment_method.as_deref() {
            None => {
                errors.push("paymentMethod", "paymentMethod is required");
                None
            }
            Some(name) => {
                let parsed = PaymentMethod::parse(name);
                if parsed.is_none() {
                    errors.push("paymentMethod", format!("unknown payment method '{}'", name));
                }
                parsed
            }
        };

        let date = match input.date {
            None => {
                errors.push("date", "date is required");
                None
            }
            Some(date) => {
                if date > today {
                    errors.push("date", "date must not be in the future");
                    None
                } else {
                    Some(date)
                }
            }
        };

        errors.into_result()?;

        // All fields validated above; unwraps cannot fire once the map is empty.
        Ok(NewExpense {
            description: description.unwrap(),
            amount: amount.unwrap(),
            category: category.unwrap(),
            payment_method: payment_method.unwrap(),
            date: date.unwrap(),
        })
    }

    fn check_amount(value: Decimal, errors: &mut ValidationErrors) -> Option<Decimal> {
        if value <= Decimal::ZERO {
            errors.push("amount", "amount must be greater than 0");
            return None;
        }
        if money::fractional_digits(value) > 2 {
            errors.push("amount", "amount must have at most 2 decimal places");
            return None;
        }
        if !money::fits_integral_digits(value, AMOUNT_INTEGRAL_DIGITS) {
            errors.push(
                "amount",
                format!("amount must have at most {} integral digits", AMOUNT_INTEGRAL_DIGITS),
            );
            return None;
        }
        Some(value)
    }
}
