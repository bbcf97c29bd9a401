#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the bus explorer dashboard.
//!
//! Serves the REST API the dashboard frontend drives: filter option
//! lists (states, cascading route names), the filtered detail and
//! booking-link projections, CSV downloads of either table, and the
//! compact overview listing. Queries run against the pre-generated
//! bus-route `SQLite` database; this service never writes to it.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use bus_explorer_database::db;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Bus-route `SQLite` database (pre-generated, read-only).
    pub db: Arc<dyn Database>,
}

/// Starts the bus explorer API server.
///
/// Opens the bus-route database and starts the Actix-Web HTTP server.
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the bus-route database cannot be opened.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Opening bus-route database...");
    let db_conn = db::open_from_env().expect("Failed to open bus-route database");

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/states", web::get().to(handlers::states))
                    .route("/route-names", web::get().to(handlers::route_names))
                    .route("/overview", web::get().to(handlers::overview))
                    .route("/filtered", web::get().to(handlers::filtered))
                    .route(
                        "/export/routes.csv",
                        web::get().to(handlers::export_routes),
                    )
                    .route(
                        "/export/booking-links.csv",
                        web::get().to(handlers::export_booking_links),
                    ),
            )
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
