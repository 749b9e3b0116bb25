//! Error types for Hucha

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Result type alias using Hucha's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Per-field validation diagnostics, keyed by field name.
///
/// A `BTreeMap` keeps the field order deterministic so error responses are
/// stable for clients and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic for a field. The first message per field wins.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Convert into an error if any diagnostic was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Hucha error types
#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    // Entity errors
    #[error("Expense with id {0} not found")]
    ExpenseNotFound(i64),

    #[error("Product with id {0} not found")]
    ProductNotFound(i64),

    #[error("Product with SKU '{0}' not found")]
    SkuNotFound(String),

    // Stock errors
    #[error("A product with SKU '{0}' already exists")]
    DuplicateSku(String),

    #[error("Insufficient stock: current {current}, requested {requested}")]
    InsufficientStock { current: i64, requested: i64 },

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored data could not be parsed: {0}")]
    Parse(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a validation error for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }

    /// Whether the caller can recover by fixing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::ExpenseNotFound(_)
                | Self::ProductNotFound(_)
                | Self::SkuNotFound(_)
                | Self::DuplicateSku(_)
                | Self::InsufficientStock { .. }
        )
    }
}
