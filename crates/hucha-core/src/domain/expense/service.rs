//! Expense domain service
//!
//! Enforces business invariants, orchestrates repository calls, and computes
//! the derived reports. Repository failures surface as `Error::Database`;
//! nothing is retried here.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::model::{Category, Expense, ExpenseInput, PaymentMethod};
use super::reports::{CategoryReport, MonthReport, PeriodReport};
use super::repository::{CategoryTotalRow, ExpenseRepository};
use super::validator::ExpenseValidator;
use crate::domain::money;
use crate::error::{Error, Result};

/// Domain service for the expense core
#[derive(Debug, Clone)]
pub struct ExpenseService {
    repo: ExpenseRepository,
}

impl ExpenseService {
    /// Create a new service on top of the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: ExpenseRepository::new(pool),
        }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn parse_category(name: &str) -> Result<Category> {
        Category::parse(name)
            .ok_or_else(|| Error::validation("category", format!("unknown category '{}'", name)))
    }

    fn parse_payment_method(name: &str) -> Result<PaymentMethod> {
        PaymentMethod::parse(name).ok_or_else(|| {
            Error::validation("paymentMethod", format!("unknown payment method '{}'", name))
        })
    }

    // ========== CRUD ==========

    /// Validate and persist a new expense
    pub async fn create(&self, input: ExpenseInput) -> Result<Expense> {
        let expense = ExpenseValidator::validate(&input, Self::today())?;
        let created = self.repo.insert(&expense, Self::now()).await?;
        tracing::info!(id = created.id, category = %created.category.as_str(), "Expense created");
        Ok(created)
    }

    /// All expenses, ordered by date DESC, id DESC
    pub async fn list(&self) -> Result<Vec<Expense>> {
        self.repo.list().await
    }

    /// One expense by id
    pub async fn get(&self, id: i64) -> Result<Expense> {
        self.repo.get(id).await?.ok_or(Error::ExpenseNotFound(id))
    }

    /// Full replacement of an expense's mutable fields
    pub async fn update(&self, id: i64, input: ExpenseInput) -> Result<Expense> {
        let expense = ExpenseValidator::validate(&input, Self::today())?;
        if !self.repo.update(id, &expense, Self::now()).await? {
            return Err(Error::ExpenseNotFound(id));
        }
        self.get(id).await
    }

    /// Remove an expense
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(Error::ExpenseNotFound(id));
        }
        tracing::info!(id, "Expense deleted");
        Ok(())
    }

    // ========== Filters ==========

    /// Expenses for one category (name as it appears on the wire)
    pub async fn list_by_category(&self, name: &str) -> Result<Vec<Expense>> {
        let category = Self::parse_category(name)?;
        self.repo.list_by_category(category).await
    }

    /// Expenses for one payment method
    pub async fn list_by_payment_method(&self, name: &str) -> Result<Vec<Expense>> {
        let method = Self::parse_payment_method(name)?;
        self.repo.list_by_payment_method(method).await
    }

    /// Expenses inside an inclusive date range
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Expense>> {
        self.repo.list_between(from, to).await
    }

    /// Expenses for one category inside an inclusive date range
    pub async fn list_by_category_between(
        &self,
        name: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>> {
        let category = Self::parse_category(name)?;
        self.repo.list_by_category_between(category, from, to).await
    }

    // ========== Reports ==========

    /// R1: total and count per category, ordered by total DESC, name ASC
    pub async fn report_by_category(&self) -> Result<Vec<CategoryReport>> {
        let rows = self.repo.aggregate_by_category().await?;
        rows.into_iter().map(Self::category_report).collect()
    }

    /// R2: totals and half-up rounded average over `[from, to]`
    pub async fn report_period(&self, from: NaiveDate, to: NaiveDate) -> Result<PeriodReport> {
        let totals = self.repo.aggregate_period(from, to).await?;
        let total_amount = money::from_cents(totals.total_cents);
        let average = if totals.expense_count == 0 {
            Decimal::ZERO
        } else {
            money::round_half_up(total_amount / Decimal::from(totals.expense_count))
        };

        Ok(PeriodReport {
            start_date: from,
            end_date: to,
            total_amount,
            expense_count: totals.expense_count,
            average_expense: average,
        })
    }

    /// R3: summary of the current calendar month
    pub async fn report_current_month(&self) -> Result<MonthReport> {
        self.report_month_of(Self::today()).await
    }

    /// Month summary for the calendar month containing `date`.
    ///
    /// Split out of [`report_current_month`](Self::report_current_month) so
    /// tests can pin the month.
    pub async fn report_month_of(&self, date: NaiveDate) -> Result<MonthReport> {
        let first_day = date.with_day(1).expect("day 1 is always valid");
        let last_day = first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .expect("month arithmetic stays in range");

        let (totals, categories) = self
            .repo
            .aggregate_period_with_categories(first_day, last_day)
            .await?;

        // Rows arrive ordered by total DESC, category ASC, so the first row
        // is the most expensive category with the lexicographic tie-break
        // already applied. The least expensive needs its own comparison:
        // taking the last row would break ties the wrong way.
        let most = categories.first().map(|r| Self::parse_row_category(r)).transpose()?;
        let least = categories
            .iter()
            .min_by(|a, b| {
                a.total_cents
                    .cmp(&b.total_cents)
                    .then_with(|| a.category.cmp(&b.category))
            })
            .map(Self::parse_row_category)
            .transpose()?;

        Ok(MonthReport {
            month: first_day.format("%B").to_string().to_uppercase(),
            year: first_day.year(),
            total_amount: money::from_cents(totals.total_cents),
            expense_count: totals.expense_count,
            most_expensive_category: most,
            least_expensive_category: least,
        })
    }

    fn category_report(row: CategoryTotalRow) -> Result<CategoryReport> {
        let category = Self::parse_row_category(&row)?;
        Ok(CategoryReport {
            category,
            total_amount: money::from_cents(row.total_cents),
            expense_count: row.expense_count,
        })
    }

    fn parse_row_category(row: &CategoryTotalRow) -> Result<Category> {
        Category::parse(&row.category)
            .ok_or_else(|| Error::Parse(format!("Invalid expense category: {}", row.category)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use std::str::FromStr;

    async fn service() -> ExpenseService {
        let db = Database::in_memory().await.expect("test database");
        ExpenseService::new(db.pool().clone())
    }

    fn input(amount: &str, category: &str, date: NaiveDate) -> ExpenseInput {
        ExpenseInput {
            description: Some("Test expense".to_string()),
            amount: Some(Decimal::from_str(amount).unwrap()),
            category: Some(category.to_string()),
            payment_method: Some("CASH".to_string()),
            date: Some(date),
        }
    }

    fn past_date() -> NaiveDate {
        ExpenseService::today() - chrono::Duration::days(400)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc = service().await;
        let created = svc
            .create(input("25.50", "FOOD", past_date()))
            .await
            .expect("create");

        let fetched = svc.get(created.id).await.expect("get");
        assert_eq!(fetched, created);
        assert!(fetched.created_at <= fetched.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_future_date() {
        let svc = service().await;
        let tomorrow = ExpenseService::today().succ_opt().unwrap();
        let err = svc
            .create(input("25.50", "FOOD", tomorrow))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(e) if e.contains("date")));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let svc = service().await;
        assert!(matches!(svc.get(42).await, Err(Error::ExpenseNotFound(42))));
    }

    #[tokio::test]
    async fn update_is_full_replacement() {
        let svc = service().await;
        let created = svc
            .create(input("10.00", "FOOD", past_date()))
            .await
            .unwrap();

        let updated = svc
            .update(created.id, input("12.00", "TRANSPORT", past_date()))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.category, Category::Transport);
        assert_eq!(updated.amount, Decimal::from_str("12.00").unwrap());
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let svc = service().await;
        let err = svc
            .update(42, input("10.00", "FOOD", past_date()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExpenseNotFound(42)));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = service().await;
        let created = svc
            .create(input("10.00", "FOOD", past_date()))
            .await
            .unwrap();

        svc.delete(created.id).await.expect("delete");
        assert!(matches!(
            svc.get(created.id).await,
            Err(Error::ExpenseNotFound(_))
        ));
        assert!(matches!(
            svc.delete(created.id).await,
            Err(Error::ExpenseNotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_category_filter_is_validation() {
        let svc = service().await;
        let err = svc.list_by_category("GROCERIES").await.unwrap_err();
        assert!(matches!(err, Error::Validation(e) if e.contains("category")));
    }

    #[tokio::test]
    async fn report_by_category_matches_scenario() {
        let svc = service().await;
        let date = past_date();
        for amount in ["10.00", "20.00", "5.50"] {
            svc.create(input(amount, "FOOD", date)).await.unwrap();
        }
        svc.create(input("7.25", "TRANSPORT", date)).await.unwrap();

        let report = svc.report_by_category().await.unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].category, Category::Food);
        assert_eq!(report[0].total_amount, Decimal::from_str("35.50").unwrap());
        assert_eq!(report[0].expense_count, 3);
        assert_eq!(report[1].category, Category::Transport);
        assert_eq!(report[1].total_amount, Decimal::from_str("7.25").unwrap());
        assert_eq!(report[1].expense_count, 1);
    }

    #[tokio::test]
    async fn report_period_average_rounds_half_up() {
        let svc = service().await;
        let date = past_date();
        // 10.00 + 10.00 + 5.00 = 25.00 over 3 -> 8.333... -> 8.33
        for amount in ["10.00", "10.00", "5.00"] {
            svc.create(input(amount, "FOOD", date)).await.unwrap();
        }

        let report = svc.report_period(date, date).await.unwrap();
        assert_eq!(report.total_amount, Decimal::from_str("25.00").unwrap());
        assert_eq!(report.expense_count, 3);
        assert_eq!(report.average_expense, Decimal::from_str("8.33").unwrap());
    }

    #[tokio::test]
    async fn report_period_empty_has_zero_average() {
        let svc = service().await;
        let date = past_date();
        let report = svc.report_period(date, date).await.unwrap();
        assert_eq!(report.expense_count, 0);
        assert_eq!(report.total_amount, Decimal::ZERO);
        assert_eq!(report.average_expense, Decimal::ZERO);
    }

    #[tokio::test]
    async fn month_report_extremes_and_tie_breaks() {
        let svc = service().await;
        let date = past_date().with_day(15).unwrap();

        svc.create(input("30.00", "FOOD", date)).await.unwrap();
        svc.create(input("5.00", "TRANSPORT", date)).await.unwrap();
        // EDUCATION ties TRANSPORT at the minimum; EDUCATION wins the
        // tie-break because it sorts first by name.
        svc.create(input("5.00", "EDUCATION", date)).await.unwrap();

        let report = svc.report_month_of(date).await.unwrap();
        assert_eq!(report.total_amount, Decimal::from_str("40.00").unwrap());
        assert_eq!(report.expense_count, 3);
        assert_eq!(report.most_expensive_category, Some(Category::Food));
        assert_eq!(report.least_expensive_category, Some(Category::Education));
        assert_eq!(report.year, date.year());
        assert!(report.month.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn month_report_empty_month_has_no_extremes() {
        let svc = service().await;
        let report = svc.report_month_of(past_date()).await.unwrap();
        assert_eq!(report.expense_count, 0);
        assert_eq!(report.total_amount, Decimal::ZERO);
        assert_eq!(report.most_expensive_category, None);
        assert_eq!(report.least_expensive_category, None);
    }

    #[tokio::test]
    async fn month_report_excludes_adjacent_months() {
        let svc = service().await;
        let mid = past_date().with_day(15).unwrap();
        let previous_month = mid.checked_sub_months(Months::new(1)).unwrap();

        svc.create(input("10.00", "FOOD", mid)).await.unwrap();
        svc.create(input("99.00", "FOOD", previous_month)).await.unwrap();

        let report = svc.report_month_of(mid).await.unwrap();
        assert_eq!(report.expense_count, 1);
        assert_eq!(report.total_amount, Decimal::from_str("10.00").unwrap());
    }

    #[tokio::test]
    async fn month_name_is_uppercase_english() {
        let svc = service().await;
        let november = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        let report = svc.report_month_of(november).await.unwrap();
        assert_eq!(report.month, "NOVEMBER");
        assert_eq!(report.year, 2023);
    }
}
