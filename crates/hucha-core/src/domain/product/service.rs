//! Product domain service
//!
//! Enforces business invariants for the inventory core and owns the stock
//! engine semantics: SKU uniqueness, non-negative stock, and the documented
//! quantity range `0..=i64::MAX`.

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::model::{Product, ProductInput, ProductUpdateInput, Sku};
use super::repository::ProductRepository;
use super::validator::ProductValidator;
use crate::domain::money;
use crate::error::{Error, Result};

/// Domain service for the inventory core
#[derive(Debug, Clone)]
pub struct ProductService {
    repo: ProductRepository,
}

impl ProductService {
    /// Create a new service on top of the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: ProductRepository::new(pool),
        }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    // ========== CRUD ==========

    /// Validate and persist a new product.
    ///
    /// The SKU pre-check gives a friendly fast path; the unique index remains
    /// authoritative when two creates race, and the repository surfaces that
    /// collision as `DuplicateSku` too.
    pub async fn create(&self, input: ProductInput) -> Result<Product> {
        let product = ProductValidator::validate_create(&input)?;
        if self.repo.sku_exists(&product.sku).await? {
            return Err(Error::DuplicateSku(product.sku.as_str().to_string()));
        }
        let created = self.repo.insert(&product, Self::now()).await?;
        tracing::info!(id = created.id, sku = %created.sku, "Product created");
        Ok(created)
    }

    /// All products, most recently updated first
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.repo.list().await
    }

    /// One product by id
    pub async fn get(&self, id: i64) -> Result<Product> {
        self.repo.get(id).await?.ok_or(Error::ProductNotFound(id))
    }

    /// One product by SKU (raw string as it appears on the wire)
    pub async fn get_by_sku(&self, raw: &str) -> Result<Product> {
        let sku = Sku::parse(raw)
            .ok_or_else(|| Error::SkuNotFound(raw.to_string()))?;
        self.repo
            .get_by_sku(&sku)
            .await?
            .ok_or_else(|| Error::SkuNotFound(raw.to_string()))
    }

    /// Replace a product's descriptive fields. Quantity and SKU are never
    /// changed here; quantity moves through the stock engine only.
    pub async fn update(&self, id: i64, input: ProductUpdateInput) -> Result<Product> {
        let update = ProductValidator::validate_update(&input)?;
        if !self.repo.update_details(id, &update, Self::now()).await? {
            return Err(Error::ProductNotFound(id));
        }
        self.get(id).await
    }

    /// Remove a product
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(Error::ProductNotFound(id));
        }
        tracing::info!(id, "Product deleted");
        Ok(())
    }

    // ========== Stock engine ==========

    /// Atomic stock increment.
    ///
    /// `quantity' = quantity + n` with `n >= 1`; an increment that would
    /// leave the permitted range fails `Validation` without mutating.
    pub async fn stock_in(&self, id: i64, quantity: i64) -> Result<Product> {
        Self::check_delta(quantity)?;
        if self.repo.increment_stock(id, quantity, Self::now()).await? {
            let product = self.get(id).await?;
            tracing::info!(id, delta = quantity, stock = product.quantity, "Stock in");
            return Ok(product);
        }

        // Zero rows: either the product is missing or the guard rejected an
        // overflow. The read decides which.
        match self.repo.get(id).await? {
            None => Err(Error::ProductNotFound(id)),
            Some(_) => Err(Error::validation(
                "cantidad",
                "increment would exceed the maximum representable stock",
            )),
        }
    }

    /// Atomic stock decrement.
    ///
    /// `quantity' = quantity - n` with `n >= 1` and `quantity >= n`; an
    /// under-flowing decrement fails `InsufficientStock` without mutating.
    pub async fn stock_out(&self, id: i64, quantity: i64) -> Result<Product> {
        Self::check_delta(quantity)?;
        if self.repo.decrement_stock(id, quantity, Self::now()).await? {
            let product = self.get(id).await?;
            tracing::info!(id, delta = quantity, stock = product.quantity, "Stock out");
            return Ok(product);
        }

        match self.repo.get(id).await? {
            None => Err(Error::ProductNotFound(id)),
            Some(product) => Err(Error::InsufficientStock {
                current: product.quantity,
                requested: quantity,
            }),
        }
    }

    fn check_delta(quantity: i64) -> Result<()> {
        if quantity < 1 {
            return Err(Error::validation("cantidad", "cantidad must be at least 1"));
        }
        Ok(())
    }

    // ========== Queries ==========

    /// Products below their minimum stock, largest shortfall first
    pub async fn low_stock(&self) -> Result<Vec<Product>> {
        self.repo.low_stock().await
    }

    /// Case-insensitive substring search on name
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Product>> {
        self.repo.search_by_name(query).await
    }

    /// Products with `min <= price <= max`. An inverted range matches
    /// nothing. Bounds carry the same precision rules as prices.
    pub async fn filter_by_price(&self, min: Decimal, max: Decimal) -> Result<Vec<Product>> {
        let mut bounds_err = crate::error::ValidationErrors::new();
        for (field, value) in [("min", min), ("max", max)] {
            if value < Decimal::ZERO {
                bounds_err.push(field, format!("{field} must not be negative"));
            } else if money::fractional_digits(value) > 2 {
                bounds_err.push(field, format!("{field} must have at most 2 decimal places"));
            }
        }
        bounds_err.into_result()?;

        self.repo
            .filter_by_price(money::to_cents(min), money::to_cents(max))
            .await
    }
}
