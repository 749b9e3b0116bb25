//! Domain layer
//!
//! Business entities, validation, and domain services for the expense and
//! inventory cores. Services enforce invariants and own transactional
//! composition; repositories own the SQL.

pub mod expense;
pub mod money;
pub mod product;
