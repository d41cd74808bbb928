//! Member registry service
//!
//! Registration form validation and submission, photo previews, and the
//! read-only member directory, exposed over HTTP.

pub mod api;
pub mod config;
pub mod registration;
pub mod sessions;

pub use api::{create_router, AppState};
pub use config::AppConfig;
