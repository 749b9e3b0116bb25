//! Shared application state

use hucha_core::domain::expense::ExpenseService;
use hucha_core::domain::product::ProductService;
use hucha_core::storage::Database;

/// Handler state: one service per domain, all sharing the pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub expenses: ExpenseService,
    pub products: ProductService,
}

impl AppState {
    pub fn new(db: &Database) -> Self {
        Self {
            expenses: ExpenseService::new(db.pool().clone()),
            products: ProductService::new(db.pool().clone()),
        }
    }
}
