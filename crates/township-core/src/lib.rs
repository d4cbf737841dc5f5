//! Core types and configuration for the Township Dashboard.
//!
//! Provides the in-memory table model, the column catalog, the error type,
//! CLI settings with last-used persistence, and number formatting helpers.

pub mod catalog;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, Result};
