//! Terminal UI for the Township Dashboard.
//!
//! Renders the header, KPI cards, facet sidebar, plot table and edit form
//! with [`ratatui`], and runs the keyboard-driven event loop over a
//! [`township_runtime::store::Store`].

pub mod app;
pub mod components;
pub mod table_view;
pub mod themes;

pub use township_core as core;
