//! HTTP handler functions for the bus explorer API.
//!
//! Each interaction builds one [`RouteFilter`] from the raw query
//! parameters and derives everything else from it. Invalid criteria are
//! rejected with a 400 before any query is sent; store failures are
//! logged and reported as 500s, never as silently empty results.

use actix_web::{HttpResponse, web};
use bus_explorer_database::{DbError, queries};
use bus_explorer_database_models::RouteFilter;
use bus_explorer_export::{
    BOOKING_LINKS_CSV_FILENAME, CSV_CONTENT_TYPE, ROUTES_CSV_FILENAME, booking_links_to_csv,
    routes_to_csv,
};
use bus_explorer_server_models::{
    ALL_STATES, ApiBookingLink, ApiHealth, ApiOverviewRow, ApiRoute, FilteredResponse,
    RouteNameParams, RouteQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/states`
///
/// Returns the full sorted state list for the state picker.
pub async fn states(state: web::Data<AppState>) -> HttpResponse {
    match queries::list_states(state.db.as_ref()).await {
        Ok(states) => HttpResponse::Ok().json(states),
        Err(e) => {
            log::error!("Failed to list states: {e}");
            error_response(&e, "Failed to list states")
        }
    }
}

/// `GET /api/route-names`
///
/// Returns the route picker options for the selected state. Cascades:
/// called again whenever the state selection changes.
pub async fn route_names(
    state: web::Data<AppState>,
    params: web::Query<RouteNameParams>,
) -> HttpResponse {
    let selected_state = params
        .state
        .as_deref()
        .filter(|s| !s.is_empty() && *s != ALL_STATES);

    match queries::list_route_names(state.db.as_ref(), selected_state).await {
        Ok(routes) => HttpResponse::Ok().json(routes),
        Err(e) => {
            log::error!("Failed to list route names: {e}");
            error_response(&e, "Failed to list route names")
        }
    }
}

/// `GET /api/overview`
///
/// Returns the compact unfiltered listing shown before any filtering.
pub async fn overview(state: web::Data<AppState>) -> HttpResponse {
    match queries::query_overview(state.db.as_ref()).await {
        Ok(rows) => {
            let rows: Vec<ApiOverviewRow> = rows.into_iter().map(ApiOverviewRow::from).collect();
            HttpResponse::Ok().json(rows)
        }
        Err(e) => {
            log::error!("Failed to query overview: {e}");
            error_response(&e, "Failed to query overview")
        }
    }
}

/// `GET /api/filtered`
///
/// Runs both projections for one set of filter criteria and returns
/// them together, so the displayed tables always agree.
pub async fn filtered(
    state: web::Data<AppState>,
    params: web::Query<RouteQueryParams>,
) -> HttpResponse {
    let filter = match RouteFilter::try_from(&*params) {
        Ok(filter) => filter,
        Err(e) => return bad_request(&e),
    };

    match queries::query_projections(state.db.as_ref(), &filter).await {
        Ok((routes, links)) => HttpResponse::Ok().json(FilteredResponse {
            routes: routes.into_iter().map(ApiRoute::from).collect(),
            booking_links: links.into_iter().map(ApiBookingLink::from).collect(),
        }),
        Err(e) => {
            log::error!("Failed to query filtered routes: {e}");
            error_response(&e, "Failed to query filtered routes")
        }
    }
}

/// `GET /api/export/routes.csv`
///
/// Downloads the detail table for the given criteria as CSV.
pub async fn export_routes(
    state: web::Data<AppState>,
    params: web::Query<RouteQueryParams>,
) -> HttpResponse {
    let filter = match RouteFilter::try_from(&*params) {
        Ok(filter) => filter,
        Err(e) => return bad_request(&e),
    };

    let rows = match queries::query_routes(state.db.as_ref(), &filter).await {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to query routes for export: {e}");
            return error_response(&e, "Failed to query routes for export");
        }
    };

    match routes_to_csv(&rows) {
        Ok(bytes) => csv_attachment(ROUTES_CSV_FILENAME, bytes),
        Err(e) => {
            log::error!("Failed to serialize route export: {e}");
            internal_error("Failed to serialize route export")
        }
    }
}

/// `GET /api/export/booking-links.csv`
///
/// Downloads the booking-link table for the given criteria as CSV.
pub async fn export_booking_links(
    state: web::Data<AppState>,
    params: web::Query<RouteQueryParams>,
) -> HttpResponse {
    let filter = match RouteFilter::try_from(&*params) {
        Ok(filter) => filter,
        Err(e) => return bad_request(&e),
    };

    let rows = match queries::query_booking_links(state.db.as_ref(), &filter).await {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to query booking links for export: {e}");
            return error_response(&e, "Failed to query booking links for export");
        }
    };

    match booking_links_to_csv(&rows) {
        Ok(bytes) => csv_attachment(BOOKING_LINKS_CSV_FILENAME, bytes),
        Err(e) => {
            log::error!("Failed to serialize booking-link export: {e}");
            internal_error("Failed to serialize booking-link export")
        }
    }
}

/// Builds a CSV download response with the fixed filename.
fn csv_attachment(filename: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(CSV_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes)
}

/// Maps a database failure to a response, keeping validation failures
/// distinguishable from store failures.
fn error_response(e: &DbError, message: &str) -> HttpResponse {
    match e {
        DbError::Filter(filter_error) => bad_request(filter_error),
        _ => internal_error(message),
    }
}

fn bad_request(e: &impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": e.to_string()
    }))
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": message
    }))
}
