//! Database connection utilities.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Default path of the bus-route `SQLite` database.
pub const DEFAULT_DB_PATH: &str = "data/bus_routes.db";

/// Opens the bus-route `SQLite` database at `path`.
///
/// The file is produced by the scraping pipeline ahead of time; this
/// service only reads from it, so no schema setup or migration happens
/// here.
///
/// # Errors
///
/// Returns [`DbError::Connection`] if the database cannot be opened.
pub fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))?;
    Ok(db)
}

/// Opens the database at the path from the `BUS_ROUTES_DB_PATH`
/// environment variable, falling back to [`DEFAULT_DB_PATH`].
///
/// # Errors
///
/// Returns [`DbError::Connection`] if the database cannot be opened.
pub fn open_from_env() -> Result<Box<dyn Database>, DbError> {
    let path =
        std::env::var("BUS_ROUTES_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    open_db(Path::new(&path))
}
