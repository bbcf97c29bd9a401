#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the bus explorer server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the database row types to allow independent evolution
//! of the API contract. The raw selection parameters arrive exactly as
//! the UI widgets hold them (sentinel labels included); normalization
//! into a [`RouteFilter`] happens in one place, the `TryFrom` impl
//! below.

use bus_explorer_database_models::{
    BookingLinkRow, DEFAULT_PRICE_MAX, DEFAULT_PRICE_MIN, FilterError, OverviewRow, RouteFilter,
    RouteRow,
};
use bus_explorer_route_models::{BusTypeCategory, DepartureWindow};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Sentinel option meaning "no state constraint".
pub const ALL_STATES: &str = "All States";

/// Sentinel option meaning "no route constraint".
pub const ALL_ROUTES: &str = "All Routes";

/// Sentinel option meaning "no departure-time constraint".
pub const ALL_TIMES: &str = "All Times";

/// Raw filter selections as sent by the UI.
///
/// Every field is optional; an absent field, an empty string, or the
/// matching "All ..." sentinel all mean "no constraint".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQueryParams {
    /// Selected state, or the "All States" sentinel.
    pub state: Option<String>,
    /// Selected route name, or the "All Routes" sentinel.
    pub route_name: Option<String>,
    /// Lower fare bound in INR.
    pub price_min: Option<f64>,
    /// Upper fare bound in INR.
    pub price_max: Option<f64>,
    /// Minimum star rating, 0.0-5.0.
    pub min_rating: Option<f64>,
    /// Departure window label (e.g. `"6am-12pm"`), or "All Times".
    pub departure_window: Option<String>,
    /// Bus type label (e.g. `"NON AC"`), or "All Types".
    pub bus_type: Option<String>,
}

/// Query parameters for the dependent route-name list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNameParams {
    /// Selected state, or the "All States" sentinel for all routes.
    pub state: Option<String>,
}

impl TryFrom<&RouteQueryParams> for RouteFilter {
    type Error = FilterError;

    /// Normalizes raw selections into validated filter criteria.
    fn try_from(params: &RouteQueryParams) -> Result<Self, FilterError> {
        let state = selection(params.state.as_deref(), ALL_STATES);
        let route_name = selection(params.route_name.as_deref(), ALL_ROUTES);

        let departure_window = match params.departure_window.as_deref() {
            None | Some("" | ALL_TIMES) => None,
            Some(label) => Some(
                label
                    .parse::<DepartureWindow>()
                    .map_err(|_| FilterError::UnknownTimeWindow(label.to_string()))?,
            ),
        };

        // "All Types" is a real variant here, parsed like the rest.
        let bus_type = match params.bus_type.as_deref() {
            None | Some("") => BusTypeCategory::All,
            Some(label) => label
                .parse::<BusTypeCategory>()
                .map_err(|_| FilterError::UnknownBusType(label.to_string()))?,
        };

        let filter = Self {
            state,
            route_name,
            price_min: params.price_min.unwrap_or(DEFAULT_PRICE_MIN),
            price_max: params.price_max.unwrap_or(DEFAULT_PRICE_MAX),
            min_star_rating: params.min_rating.unwrap_or(0.0),
            departure_window,
            bus_type,
        };
        filter.validate()?;

        Ok(filter)
    }
}

/// Maps an optional raw selection to a constraint, treating the empty
/// string and the sentinel label as "no constraint".
fn selection(raw: Option<&str>, sentinel: &str) -> Option<String> {
    raw.filter(|value| !value.is_empty() && *value != sentinel)
        .map(ToOwned::to_owned)
}

/// A bus-route offering as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRoute {
    /// State the route operates in.
    pub state: String,
    /// Bus operator name.
    pub bus_name: String,
    /// Route name, `"<from> to <to>"`.
    pub route_name: String,
    /// Free-text bus type tag.
    pub bus_type: String,
    /// Departure time of day.
    pub departing_time: NaiveTime,
    /// Arrival time of day.
    pub arrival_time: NaiveTime,
    /// Journey duration as scraped.
    pub duration: String,
    /// Star rating, 0.0-5.0.
    pub star_rating: f64,
    /// Fare price in INR.
    pub fare_price: f64,
    /// Number of seats still available.
    pub seat_availability: i64,
}

impl From<RouteRow> for ApiRoute {
    fn from(row: RouteRow) -> Self {
        Self {
            state: row.state,
            bus_name: row.bus_name,
            route_name: row.route_name,
            bus_type: row.bus_type,
            departing_time: row.departing_time,
            arrival_time: row.arrival_time,
            duration: row.duration,
            star_rating: row.star_rating,
            fare_price: row.fare_price,
            seat_availability: row.seat_availability,
        }
    }
}

/// A booking link as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBookingLink {
    /// Bus operator name.
    pub bus_name: String,
    /// Booking page URL.
    pub route_link: String,
}

impl From<BookingLinkRow> for ApiBookingLink {
    fn from(row: BookingLinkRow) -> Self {
        Self {
            bus_name: row.bus_name,
            route_link: row.route_link,
        }
    }
}

/// A compact overview entry as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverviewRow {
    /// State the route operates in.
    pub state: String,
    /// Route name, `"<from> to <to>"`.
    pub route_name: String,
    /// Bus operator name.
    pub bus_name: String,
    /// Departure time of day.
    pub departing_time: NaiveTime,
    /// Arrival time of day.
    pub arrival_time: NaiveTime,
    /// Free-text bus type tag.
    pub bus_type: String,
}

impl From<OverviewRow> for ApiOverviewRow {
    fn from(row: OverviewRow) -> Self {
        Self {
            state: row.state,
            route_name: row.route_name,
            bus_name: row.bus_name,
            departing_time: row.departing_time,
            arrival_time: row.arrival_time,
            bus_type: row.bus_type,
        }
    }
}

/// Both projections of one filtered interaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResponse {
    /// Full detail table.
    pub routes: Vec<ApiRoute>,
    /// Booking-link table (null-link rows already dropped).
    pub booking_links: Vec<ApiBookingLink>,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
