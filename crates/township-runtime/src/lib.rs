//! Runtime layer for the Township Dashboard.
//!
//! Owns the loaded table ([`store::Store`]) and the cascading filter
//! selection ([`dashboard::DashboardState`]) that the views render.

pub mod dashboard;
pub mod store;

pub use township_core as core;
pub use township_data as data;
