//! Circulation Server
//!
//! Data model and REST JSON API for a small library: catalog items and
//! their authors and genres, physical copies (labels), members, staff
//! positions and employees, and the loans that tie them together.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod rules;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
