//! Data pipeline for the Township Dashboard.
//!
//! Loads raw sheet rows through a [`source::TableSource`], normalizes headers
//! and cell types, filters by township and facets, aggregates the summary
//! totals, and applies single-field edits that are persisted by rewriting the
//! whole sheet.

pub mod aggregator;
pub mod export;
pub mod file_source;
pub mod filter;
pub mod http_source;
pub mod mutator;
pub mod normalizer;
pub mod source;

pub use township_core as core;
