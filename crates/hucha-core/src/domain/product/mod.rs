//! Product domain
//!
//! Product records identified by a formatted SKU, with an atomic stock
//! engine (stock-in/stock-out with under-flow rejection) and low-stock
//! detection.

pub mod model;
pub mod repository;
pub mod service;
pub mod validator;

pub use model::{NewProduct, Product, ProductInput, ProductUpdate, ProductUpdateInput, Sku};
pub use repository::ProductRepository;
pub use service::ProductService;
