pub mod app;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;
pub mod sync;

pub use app::build_router;
pub use common::error::AppError;
pub use config::{AppState, Settings};
