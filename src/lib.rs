//! Labtrack Laboratory Equipment Borrowing System
//!
//! Tracks who holds what equipment, how much inventory remains available,
//! when items are due and what is owed when they come back late. Lifecycle
//! operations move a borrow through request, approval or denial, partial and
//! complete return, and archival, keeping quantity counters consistent across
//! every collection they touch.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn store::Store>,
    pub services: Arc<services::Services>,
}
