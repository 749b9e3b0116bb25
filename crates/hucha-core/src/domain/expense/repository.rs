//! Expense repository for database operations
//!
//! Owns all SQL for the expenses table. Amounts are stored as integer cents;
//! every list query carries the documented total order
//! (`expense_date DESC, id DESC`). Aggregate queries run inside a single
//! read transaction so their sums and counts are mutually consistent.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

use super::model::{Category, Expense, NewExpense, PaymentMethod};
use crate::domain::money;
use crate::error::{Error, Result};

/// Repository for expense database operations
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, description, amount_cents, category, payment_method, \
                              expense_date, created_at, updated_at";

impl ExpenseRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========== CRUD ==========

    /// Insert a validated expense and return the stored record
    pub async fn insert(&self, expense: &NewExpense, now: NaiveDateTime) -> Result<Expense> {
        let result = sqlx::query(
            r#"
            INSERT INTO expenses (description, amount_cents, category, payment_method,
                                  expense_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.description)
        .bind(money::to_cents(expense.amount))
        .bind(expense.category.as_str())
        .bind(expense.payment_method.as_str())
        .bind(expense.date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            description: expense.description.clone(),
            amount: expense.amount,
            category: expense.category,
            payment_method: expense.payment_method,
            date: expense.date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an expense by ID
    pub async fn get(&self, id: i64) -> Result<Option<Expense>> {
        let row: Option<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM expenses WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(ExpenseRow::into_expense).transpose()
    }

    /// List all expenses, ordered by date DESC, id DESC
    pub async fn list(&self) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM expenses ORDER BY expense_date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    /// List expenses for one category
    pub async fn list_by_category(&self, category: Category) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM expenses WHERE category = ? \
             ORDER BY expense_date DESC, id DESC"
        ))
        .bind(category.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    /// List expenses for one payment method
    pub async fn list_by_payment_method(&self, method: PaymentMethod) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM expenses WHERE payment_method = ? \
             ORDER BY expense_date DESC, id DESC"
        ))
        .bind(method.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    /// List expenses with `from <= date <= to`. An inverted range matches
    /// nothing, which is the documented empty result.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM expenses WHERE expense_date BETWEEN ? AND ? \
             ORDER BY expense_date DESC, id DESC"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    /// List expenses for one category inside an inclusive date range
    pub async fn list_by_category_between(
        &self,
        category: Category,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM expenses \
             WHERE category = ? AND expense_date BETWEEN ? AND ? \
             ORDER BY expense_date DESC, id DESC"
        ))
        .bind(category.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    /// Full replacement of an expense's mutable fields; `created_at` is
    /// preserved. Returns false when the id does not exist.
    pub async fn update(
        &self,
        id: i64,
        expense: &NewExpense,
        now: NaiveDateTime,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                description = ?,
                amount_cents = ?,
                category = ?,
                payment_method = ?,
                expense_date = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&expense.description)
        .bind(money::to_cents(expense.amount))
        .bind(expense.category.as_str())
        .bind(expense.payment_method.as_str())
        .bind(expense.date)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an expense by ID. Returns false when the id does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    // ========== Aggregates ==========

    /// Per-category totals over the whole store, ordered by total DESC,
    /// category ASC. Categories with no expenses do not appear.
    pub async fn aggregate_by_category(&self) -> Result<Vec<CategoryTotalRow>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let rows: Vec<CategoryTotalRow> = sqlx::query_as(
            r#"
            SELECT category, SUM(amount_cents) AS total_cents, COUNT(*) AS expense_count
            FROM expenses
            GROUP BY category
            ORDER BY total_cents DESC, category ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(rows)
    }

    /// Total and count over an inclusive date range
    pub async fn aggregate_period(&self, from: NaiveDate, to: NaiveDate) -> Result<PeriodTotalsRow> {
        let row: PeriodTotalsRow = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) AS total_cents, COUNT(*) AS expense_count
            FROM expenses
            WHERE expense_date BETWEEN ? AND ?
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row)
    }

    /// Period totals plus per-category totals for the same range, computed in
    /// one read transaction so the two are mutually consistent.
    pub async fn aggregate_period_with_categories(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(PeriodTotalsRow, Vec<CategoryTotalRow>)> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let totals: PeriodTotalsRow = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) AS total_cents, COUNT(*) AS expense_count
            FROM expenses
            WHERE expense_date BETWEEN ? AND ?
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let categories: Vec<CategoryTotalRow> = sqlx::query_as(
            r#"
            SELECT category, SUM(amount_cents) AS total_cents, COUNT(*) AS expense_count
            FROM expenses
            WHERE expense_date BETWEEN ? AND ?
            GROUP BY category
            ORDER BY total_cents DESC, category ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok((totals, categories))
    }
}

// ========== Database Row Types ==========

/// Database row for a full expense
#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: i64,
    description: String,
    amount_cents: i64,
    category: String,
    payment_method: String,
    expense_date: NaiveDate,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl ExpenseRow {
    fn into_expense(self) -> Result<Expense> {
        let category = Category::parse(&self.category)
            .ok_or_else(|| Error::Parse(format!("Invalid expense category: {}", self.category)))?;
        let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            Error::Parse(format!("Invalid payment method: {}", self.payment_method))
        })?;

        Ok(Expense {
            id: self.id,
            description: self.description,
            amount: money::from_cents(self.amount_cents),
            category,
            payment_method,
            date: self.expense_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for one category's aggregate totals
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryTotalRow {
    pub category: String,
    pub total_cents: i64,
    pub expense_count: i64,
}

/// Database row for period totals
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodTotalsRow {
    pub total_cents: i64,
    pub expense_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn create_test_pool() -> SqlitePool {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        db.pool().clone()
    }

    fn new_expense(amount: &str, category: Category, date: &str) -> NewExpense {
        NewExpense {
            description: "Test expense".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            category,
            payment_method: PaymentMethod::Cash,
            date: NaiveDate::from_str(date).unwrap(),
        }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        let created = repo
            .insert(&new_expense("25.50", Category::Food, "2024-11-19"), now())
            .await
            .expect("Failed to insert");

        let fetched = repo
            .get(created.id)
            .await
            .expect("Failed to get")
            .expect("Expense not found");

        assert_eq!(fetched, created);
        assert_eq!(fetched.amount, Decimal::from_str("25.50").unwrap());
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        let first = repo
            .insert(&new_expense("1.00", Category::Food, "2024-11-01"), now())
            .await
            .unwrap();
        let second = repo
            .insert(&new_expense("2.00", Category::Food, "2024-11-01"), now())
            .await
            .unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_list_ordering_date_desc_then_id_desc() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        let older = repo
            .insert(&new_expense("1.00", Category::Food, "2024-11-01"), now())
            .await
            .unwrap();
        let tied_a = repo
            .insert(&new_expense("2.00", Category::Food, "2024-11-10"), now())
            .await
            .unwrap();
        let tied_b = repo
            .insert(&new_expense("3.00", Category::Food, "2024-11-10"), now())
            .await
            .unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![tied_b.id, tied_a.id, older.id]);
    }

    #[tokio::test]
    async fn test_filters() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        repo.insert(&new_expense("10.00", Category::Food, "2024-11-05"), now())
            .await
            .unwrap();
        repo.insert(&new_expense("7.25", Category::Transport, "2024-11-06"), now())
            .await
            .unwrap();

        let food = repo.list_by_category(Category::Food).await.unwrap();
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].category, Category::Food);

        let cash = repo
            .list_by_payment_method(PaymentMethod::Cash)
            .await
            .unwrap();
        assert_eq!(cash.len(), 2);

        let in_range = repo
            .list_between(
                NaiveDate::from_str("2024-11-06").unwrap(),
                NaiveDate::from_str("2024-11-30").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(in_range.len(), 1);

        let combined = repo
            .list_by_category_between(
                Category::Food,
                NaiveDate::from_str("2024-11-01").unwrap(),
                NaiveDate::from_str("2024-11-30").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(combined.len(), 1);
    }

    #[tokio::test]
    async fn test_inverted_range_is_empty() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        repo.insert(&new_expense("10.00", Category::Food, "2024-11-05"), now())
            .await
            .unwrap();

        let rows = repo
            .list_between(
                NaiveDate::from_str("2024-11-30").unwrap(),
                NaiveDate::from_str("2024-11-01").unwrap(),
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        let created = repo
            .insert(&new_expense("10.00", Category::Food, "2024-11-05"), now())
            .await
            .unwrap();

        let later = created.created_at + chrono::Duration::seconds(60);
        let replaced = new_expense("12.00", Category::Transport, "2024-11-06");
        let updated = repo.update(created.id, &replaced, later).await.unwrap();
        assert!(updated);

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.updated_at, later);
        assert_eq!(fetched.category, Category::Transport);
        assert_eq!(fetched.amount, Decimal::from_str("12.00").unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_id_returns_false() {
        let repo = ExpenseRepository::new(create_test_pool().await);
        let updated = repo
            .update(999, &new_expense("1.00", Category::Food, "2024-11-05"), now())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        let created = repo
            .insert(&new_expense("10.00", Category::Food, "2024-11-05"), now())
            .await
            .unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_aggregate_by_category_ordering_and_sums() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        repo.insert(&new_expense("10.00", Category::Food, "2024-11-01"), now())
            .await
            .unwrap();
        repo.insert(&new_expense("20.00", Category::Food, "2024-11-02"), now())
            .await
            .unwrap();
        repo.insert(&new_expense("5.50", Category::Food, "2024-11-03"), now())
            .await
            .unwrap();
        repo.insert(&new_expense("7.25", Category::Transport, "2024-11-03"), now())
            .await
            .unwrap();

        let rows = repo.aggregate_by_category().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "FOOD");
        assert_eq!(rows[0].total_cents, 3550);
        assert_eq!(rows[0].expense_count, 3);
        assert_eq!(rows[1].category, "TRANSPORT");
        assert_eq!(rows[1].total_cents, 725);
        assert_eq!(rows[1].expense_count, 1);

        // Sum over reported categories equals the global sum
        let global: i64 = rows.iter().map(|r| r.total_cents).sum();
        assert_eq!(global, 3550 + 725);
    }

    #[tokio::test]
    async fn test_aggregate_period_empty_range() {
        let repo = ExpenseRepository::new(create_test_pool().await);

        let totals = repo
            .aggregate_period(
                NaiveDate::from_str("2024-01-01").unwrap(),
                NaiveDate::from_str("2024-01-31").unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(totals.total_cents, 0);
        assert_eq!(totals.expense_count, 0);
    }
}
