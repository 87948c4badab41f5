pub mod row_engine;
pub mod row_service;

pub use row_engine::*;
pub use row_service::*;
