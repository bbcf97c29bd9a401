#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database connection and filtered queries for the bus explorer.
//!
//! Uses `switchy_database` over the pre-generated `bus_routes` `SQLite`
//! file. All predicates are built with `$N` placeholders and bound
//! parameters via `query_raw_params()`; no user-controlled value is ever
//! interpolated into SQL text.

pub mod db;
pub mod queries;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The store could not be opened.
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The filter criteria failed validation before any SQL was built.
    #[error("Invalid filter: {0}")]
    Filter(#[from] bus_explorer_database_models::FilterError),

    /// A fetched row did not match the expected shape.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
