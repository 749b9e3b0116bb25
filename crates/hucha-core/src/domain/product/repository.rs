//! Product repository for database operations
//!
//! Owns all SQL for the products table, including the atomic stock
//! mutations. Stock changes are single conditional UPDATE statements: the
//! invariant check rides in the WHERE clause and the affected-row count
//! decides success, so there is no read-modify-write window.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use super::model::{NewProduct, Product, ProductUpdate, Sku};
use crate::domain::money;
use crate::error::{Error, Result};

/// Repository for product database operations
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, name, description, quantity, min_stock, price_cents, sku, \
                              created_at, updated_at";

impl ProductRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========== CRUD ==========

    /// Insert a validated product. The unique index on `sku` is authoritative
    /// for duplicates: a violating insert (including one that races a domain
    /// pre-check) surfaces as `DuplicateSku`.
    pub async fn insert(&self, product: &NewProduct, now: NaiveDateTime) -> Result<Product> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, quantity, min_stock, price_cents, sku,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.quantity)
        .bind(product.min_stock)
        .bind(money::to_cents(product.price))
        .bind(product.sku.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_insert_error(e, &product.sku))?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: product.name.clone(),
            description: product.description.clone(),
            quantity: product.quantity,
            min_stock: product.min_stock,
            price: product.price,
            sku: product.sku.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn map_insert_error(error: sqlx::Error, sku: &Sku) -> Error {
        let is_unique = error
            .as_database_error()
            .is_some_and(|d| d.is_unique_violation());
        if is_unique {
            Error::DuplicateSku(sku.as_str().to_string())
        } else {
            Error::Database(error)
        }
    }

    /// Whether any product already uses this SKU
    pub async fn sku_exists(&self, sku: &Sku) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE sku = ?")
            .bind(sku.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(count > 0)
    }

    /// Get a product by ID
    pub async fn get(&self, id: i64) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Get a product by SKU
    pub async fn get_by_sku(&self, sku: &Sku) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE sku = ?"
        ))
        .bind(sku.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(ProductRow::into_product).transpose()
    }

    /// List all products, most recently updated first
    pub async fn list(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY updated_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Replace a product's descriptive fields (name, description, price,
    /// minStock). Quantity and SKU are untouched. Returns false when the id
    /// does not exist.
    pub async fn update_details(
        &self,
        id: i64,
        update: &ProductUpdate,
        now: NaiveDateTime,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?,
                description = ?,
                min_stock = ?,
                price_cents = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.min_stock)
        .bind(money::to_cents(update.price))
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a product by ID. Returns false when the id does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    // ========== Stock mutations ==========

    /// Atomically add `delta` to a product's quantity. The guard keeps the
    /// result inside the permitted range (`<= i64::MAX`). Returns true when
    /// a row was updated.
    pub async fn increment_stock(
        &self,
        id: i64,
        delta: i64,
        now: NaiveDateTime,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?, updated_at = ?
            WHERE id = ? AND quantity <= ?
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .bind(i64::MAX - delta)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically subtract `delta` from a product's quantity. The guard
    /// (`quantity >= delta`) keeps the invariant `quantity >= 0`; a zero
    /// affected-row count means the product is missing or the stock is
    /// insufficient, which the service disambiguates with a follow-up read.
    pub async fn decrement_stock(
        &self,
        id: i64,
        delta: i64,
        now: NaiveDateTime,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - ?, updated_at = ?
            WHERE id = ? AND quantity >= ?
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    // ========== Queries ==========

    /// Products below their minimum stock, largest shortfall first
    pub async fn low_stock(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE quantity < min_stock \
             ORDER BY (min_stock - quantity) DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Case-insensitive substring search on name, ordered by name ASC,
    /// id ASC. `INSTR` keeps `%`/`_` in the query literal.
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE INSTR(LOWER(name), LOWER(?)) > 0 \
             ORDER BY name ASC, id ASC"
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Products whose price lies in the inclusive `[min, max]` cents range
    pub async fn filter_by_price(&self, min_cents: i64, max_cents: i64) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE price_cents BETWEEN ? AND ? \
             ORDER BY price_cents ASC, id ASC"
        ))
        .bind(min_cents)
        .bind(max_cents)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }
}

// ========== Database Row Types ==========

/// Database row for a full product
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    quantity: i64,
    min_stock: i64,
    price_cents: i64,
    sku: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl ProductRow {
    fn into_product(self) -> Result<Product> {
        let sku = Sku::parse(&self.sku)
            .ok_or_else(|| Error::Parse(format!("Invalid stored SKU: {}", self.sku)))?;

        Ok(Product {
            id: self.id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            min_stock: self.min_stock,
            price: money::from_cents(self.price_cents),
            sku,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
