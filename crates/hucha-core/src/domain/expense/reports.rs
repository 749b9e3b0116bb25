//! Aggregate report types
//!
//! Derived views over the expense store. Reports are computed on demand and
//! never cached; totals are exact decimal sums, and only `averageExpense` is
//! rounded (half-up, two fractional digits).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::model::Category;

/// One row of the by-category report: total and count for a category that has
/// at least one expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub category: Category,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    pub expense_count: i64,
}

/// Aggregate over a closed `[from, to]` date interval
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    pub expense_count: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub average_expense: Decimal,
}

/// Summary of the current calendar month.
///
/// `month` is the uppercase English month name (e.g. `NOVEMBER`). The
/// category extremes are absent when the month has no expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthReport {
    pub month: String,
    pub year: i32,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    pub expense_count: i64,
    pub most_expensive_category: Option<Category>,
    pub least_expensive_category: Option<Category>,
}
