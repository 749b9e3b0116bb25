//! Hucha Core Library
//!
//! This crate provides the core functionality for Hucha, including:
//! - Storage (SQLite connection pool + versioned migrations)
//! - Expense domain (validated CRUD, filters, aggregate reports)
//! - Product domain (validated CRUD, atomic stock engine, low-stock alerts)
//! - Configuration

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::expense::ExpenseService;
    pub use crate::domain::product::ProductService;
    pub use crate::error::{Error, Result};
    pub use crate::storage::{Database, DatabaseConfig};
}
