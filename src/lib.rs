pub mod canvas;
pub mod config;
pub mod errors;
pub mod notifications;
pub mod preferences;
pub mod rows;

pub mod database;
pub mod services;
pub mod store;
