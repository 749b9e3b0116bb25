//! Product entity and SKU format

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock Keeping Unit: three uppercase letters, a hyphen, four digits
/// (`ABC-0001`). Globally unique, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Parse a candidate SKU, returning `None` when the format does not
    /// match. The shape is fixed, so a byte check suffices.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 8 {
            return None;
        }
        let letters_ok = bytes[..3].iter().all(u8::is_ascii_uppercase);
        let digits_ok = bytes[4..].iter().all(u8::is_ascii_digit);
        if letters_ok && bytes[3] == b'-' && digits_ok {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted product record.
///
/// `quantity` is mutated only through the stock engine; the permitted range
/// is `0..=i64::MAX`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    pub sku: Sku,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Whether current stock is strictly below the configured minimum
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.min_stock
    }
}

/// Decoded create request body, prior to validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub min_stock: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub price: Option<Decimal>,
    pub sku: Option<String>,
}

/// Decoded update request body. `quantity` and `sku` are deliberately not
/// part of this shape: quantity moves through stock operations only, and the
/// SKU is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_stock: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub price: Option<Decimal>,
}

/// A fully validated product, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub min_stock: i64,
    pub price: Decimal,
    pub sku: Sku,
}

/// Validated replacement for a product's descriptive fields
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
    pub min_stock: i64,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_accepts_exact_format() {
        assert!(Sku::parse("ABC-0001").is_some());
        assert!(Sku::parse("PRD-9999").is_some());
    }

    #[test]
    fn sku_rejects_malformed_inputs() {
        for bad in [
            "AB-0001",    // two letters
            "abcd-0001",  // lowercase, four letters
            "ABC-001",    // three digits
            "ABC-00001",  // five digits
            "ABC_0001",   // wrong separator
            "ABC-00A1",   // letter among digits
            "",
        ] {
            assert!(Sku::parse(bad).is_none(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn sku_rejects_non_ascii() {
        assert!(Sku::parse("ÁBC-0001").is_none());
        assert!(Sku::parse("ABC-000١").is_none());
    }

    #[test]
    fn low_stock_is_strict_inequality() {
        let product = Product {
            id: 1,
            name: "Widget".to_string(),
            description: None,
            quantity: 5,
            min_stock: 5,
            price: Decimal::new(100, 2),
            sku: Sku::parse("WID-0001").unwrap(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };
        assert!(!product.is_low_stock());

        let below = Product {
            quantity: 4,
            ..product
        };
        assert!(below.is_low_stock());
    }

    #[test]
    fn product_serializes_with_wire_names() {
        let product = Product {
            id: 7,
            name: "Widget".to_string(),
            description: Some("A widget".to_string()),
            quantity: 3,
            min_stock: 10,
            price: Decimal::new(1999, 2),
            sku: Sku::parse("WID-0001").unwrap(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };

        let value = serde_json::to_value(&product).expect("serialize");
        assert_eq!(value["minStock"], 10);
        assert_eq!(value["sku"], "WID-0001");
        assert_eq!(value["quantity"], 3);
    }
}
