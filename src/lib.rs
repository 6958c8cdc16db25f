pub mod backup;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod ids;
pub mod labels;
pub mod models;
pub mod store;
pub mod tasks;
pub mod transfer;
pub mod ui;

pub use error::{AppError, Result};
