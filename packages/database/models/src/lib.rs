#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and filter criteria definitions.
//!
//! These types represent the shapes of data as stored in and retrieved
//! from the scraped `bus_routes` `SQLite` table. They are distinct from
//! the API response types in `bus_explorer_server_models`. The quirks of
//! the scraped schema (the `seat_availablity` spelling and the
//! capital-D `Duration` column) are confined to [`Projection`] and the
//! row parsers; everything above the SQL boundary uses regular names.

use bus_explorer_route_models::{BusTypeCategory, DepartureWindow};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower bound of the price slider, in INR.
pub const DEFAULT_PRICE_MIN: f64 = 0.0;

/// Upper bound of the price slider, in INR.
pub const DEFAULT_PRICE_MAX: f64 = 5000.0;

/// Storage format of the `departing_time` / `arrival_time` columns.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Errors from validating or normalizing a [`RouteFilter`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The price range is inverted.
    #[error("invalid price range: min {min} exceeds max {max}")]
    PriceRange {
        /// Requested minimum fare.
        min: f64,
        /// Requested maximum fare.
        max: f64,
    },

    /// The minimum star rating is outside the rating scale.
    #[error("star rating {value} out of range: expected 0.0-5.0")]
    RatingOutOfRange {
        /// The offending rating value.
        value: f64,
    },

    /// The bus-type label is not one of the offered options.
    #[error("unknown bus type option: {0}")]
    UnknownBusType(String),

    /// The departure-window label is not one of the offered options.
    #[error("unknown departure time option: {0}")]
    UnknownTimeWindow(String),
}

/// Normalized filter criteria for one dashboard interaction.
///
/// Immutable once built: every query of the interaction (detail
/// projection, booking-link projection, exports) is derived from the
/// same value, so the result tables cannot diverge. `None` fields mean
/// "no constraint": the "All States" / "All Routes" / "All Times"
/// sentinels are mapped to `None` before this type is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFilter {
    /// Restrict results to one state.
    pub state: Option<String>,
    /// Restrict results to one route (e.g. `"Bangalore to Mysore"`).
    pub route_name: Option<String>,
    /// Minimum fare price, inclusive.
    pub price_min: f64,
    /// Maximum fare price, inclusive.
    pub price_max: f64,
    /// Minimum star rating, inclusive.
    pub min_star_rating: f64,
    /// Restrict departures to one time window.
    pub departure_window: Option<DepartureWindow>,
    /// Bus-type category constraint.
    pub bus_type: BusTypeCategory,
}

impl Default for RouteFilter {
    fn default() -> Self {
        Self {
            state: None,
            route_name: None,
            price_min: DEFAULT_PRICE_MIN,
            price_max: DEFAULT_PRICE_MAX,
            min_star_rating: 0.0,
            departure_window: None,
            bus_type: BusTypeCategory::All,
        }
    }
}

impl RouteFilter {
    /// Checks the numeric invariants the UI should already enforce.
    ///
    /// The query builder re-runs this before emitting any SQL, so a
    /// hand-built invalid filter can never produce a partial query.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the price range is inverted or the
    /// minimum star rating falls outside `[0.0, 5.0]`.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.price_min > self.price_max {
            return Err(FilterError::PriceRange {
                min: self.price_min,
                max: self.price_max,
            });
        }
        if !(0.0..=5.0).contains(&self.min_star_rating) {
            return Err(FilterError::RatingOutOfRange {
                value: self.min_star_rating,
            });
        }
        Ok(())
    }
}

/// Column projection a filtered query selects.
///
/// Both projections share one predicate builder; only the selected
/// columns differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Full detail table shown in the dashboard.
    Detail,
    /// Bus name + booking link subset.
    BookingLinks,
}

impl Projection {
    /// Store column names this projection selects, in output order.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Detail => &[
                "state",
                "bus_name",
                "route_name",
                "bus_type",
                "departing_time",
                "arrival_time",
                "Duration",
                "star_rating",
                "fare_price",
                "seat_availablity",
            ],
            Self::BookingLinks => &["bus_name", "route_link"],
        }
    }
}

/// A bus-route offering as retrieved by the detail projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    /// State the route operates in.
    pub state: String,
    /// Bus operator name.
    pub bus_name: String,
    /// Route name, `"<from> to <to>"`.
    pub route_name: String,
    /// Free-text bus type tag (e.g. `"AC Sleeper"`).
    pub bus_type: String,
    /// Departure time of day.
    pub departing_time: NaiveTime,
    /// Arrival time of day.
    pub arrival_time: NaiveTime,
    /// Journey duration as scraped (free text, e.g. `"6h 30m"`).
    pub duration: String,
    /// Star rating, 0.0-5.0.
    pub star_rating: f64,
    /// Fare price in INR.
    pub fare_price: f64,
    /// Number of seats still available.
    pub seat_availability: i64,
}

/// A row of the booking-link projection.
///
/// Rows whose stored link is NULL are dropped while building the table,
/// so the link is not optional here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLinkRow {
    /// Bus operator name.
    pub bus_name: String,
    /// Booking page URL.
    pub route_link: String,
}

/// A row of the compact unfiltered overview listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
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
