//! Study Buddy Core Library
//!
//! This crate provides the foundational utilities shared by every Study
//! Buddy crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management and credential resolution

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{ApiKey, AppConfig};
pub use error::{AppError, AppResult};
