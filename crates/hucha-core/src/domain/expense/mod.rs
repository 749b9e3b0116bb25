//! Expense domain
//!
//! Validated CRUD on monetary records with date-range and categorical
//! filtering, plus three derived aggregate reports.

pub mod model;
pub mod reports;
pub mod repository;
pub mod service;
pub mod validator;

pub use model::{Category, Expense, ExpenseInput, NewExpense, PaymentMethod};
pub use reports::{CategoryReport, MonthReport, PeriodReport};
pub use repository::ExpenseRepository;
pub use service::ExpenseService;
