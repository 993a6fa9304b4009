//! Salon booking
//!
//! Appointment scheduling for a salon/spa chain: the availability engine and
//! booking wizard used by the public booking flow, and the booking backend
//! that serves catalog, calendars and slots and commits appointments.

use std::sync::Arc;

pub mod api;
pub mod booking;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
}
