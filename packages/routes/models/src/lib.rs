#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bus type categories and departure time windows.
//!
//! This crate defines the closed vocabulary the filter sidebar offers:
//! the bus-type categories a user can pick (with their substring-match
//! semantics against the free-text `bus_type` tags in the scraped data)
//! and the fixed departure-time buckets. The "All ..." sentinel options
//! map to the absence of a constraint and are handled at the API
//! boundary, not here.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Bus-type category filter options.
///
/// The scraped `bus_type` column holds free-text tags such as
/// `"AC Sleeper"` or `"NON A/C Seater / Sleeper (2+1)"`, so categories
/// match by case-sensitive substring rather than equality. The strum
/// serializations are the exact labels the UI presents.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum BusTypeCategory {
    /// No bus-type constraint.
    #[default]
    #[strum(serialize = "All Types")]
    All,
    /// Air-conditioned buses. Matches `AC` or `A/C` tags while rejecting
    /// the `NON AC` / `NON A/C` tags that also contain `AC` as a
    /// substring.
    #[strum(serialize = "AC")]
    Ac,
    /// Non-air-conditioned buses.
    #[strum(serialize = "NON AC")]
    NonAc,
    /// Seater buses.
    #[strum(serialize = "Seater")]
    Seater,
    /// Sleeper buses.
    #[strum(serialize = "Sleeper")]
    Sleeper,
}

impl BusTypeCategory {
    /// Returns all variants of this enum, in the order the UI lists them.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::All, Self::Ac, Self::NonAc, Self::Seater, Self::Sleeper]
    }

    /// SQL `LIKE` patterns a matching `bus_type` tag must satisfy (any
    /// of). Empty for [`Self::All`], which constrains nothing.
    #[must_use]
    pub const fn matching_patterns(self) -> &'static [&'static str] {
        match self {
            Self::All => &[],
            Self::Ac => &["%AC%", "%A/C%"],
            Self::NonAc => &["%NON AC%"],
            Self::Seater => &["%Seater%"],
            Self::Sleeper => &["%Sleeper%"],
        }
    }

    /// SQL `LIKE` patterns a matching `bus_type` tag must NOT satisfy.
    ///
    /// Only [`Self::Ac`] excludes anything: `NON AC` contains `AC` as a
    /// substring, so the positive match alone would pull in every
    /// non-AC bus.
    #[must_use]
    pub const fn excluded_patterns(self) -> &'static [&'static str] {
        match self {
            Self::Ac => &["%NON AC%", "%NON A/C%"],
            Self::All | Self::NonAc | Self::Seater | Self::Sleeper => &[],
        }
    }

    /// Returns whether a free-text `bus_type` tag belongs to this
    /// category, mirroring the SQL predicate built from
    /// [`Self::matching_patterns`] / [`Self::excluded_patterns`].
    #[must_use]
    pub fn matches(self, bus_type: &str) -> bool {
        match self {
            Self::All => true,
            Self::Ac => {
                (bus_type.contains("AC") || bus_type.contains("A/C"))
                    && !bus_type.contains("NON AC")
                    && !bus_type.contains("NON A/C")
            }
            Self::NonAc => bus_type.contains("NON AC"),
            Self::Seater => bus_type.contains("Seater"),
            Self::Sleeper => bus_type.contains("Sleeper"),
        }
    }
}

/// Departure-time window filter options.
///
/// Four fixed, mutually exclusive buckets covering the day. The "All
/// Times" sentinel is not a variant: an unconstrained interaction
/// carries `Option::<DepartureWindow>::None` instead. Bounds are
/// inclusive on both ends, matching the `BETWEEN` predicate the query
/// builder emits against the `HH:MM:SS` text the store holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum DepartureWindow {
    /// Midnight up to 6am.
    #[strum(serialize = "Before 6am")]
    EarlyMorning,
    /// 6am up to noon.
    #[strum(serialize = "6am-12pm")]
    Morning,
    /// Noon up to 6pm.
    #[strum(serialize = "12pm-6pm")]
    Afternoon,
    /// 6pm to end of day.
    #[strum(serialize = "After 6pm")]
    Evening,
}

impl DepartureWindow {
    /// Returns all variants of this enum, in chronological order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::EarlyMorning,
            Self::Morning,
            Self::Afternoon,
            Self::Evening,
        ]
    }

    /// Inclusive start and end of this window.
    #[must_use]
    pub fn bounds(self) -> (NaiveTime, NaiveTime) {
        let ((sh, sm, ss), (eh, em, es)) = match self {
            Self::EarlyMorning => ((0, 0, 0), (6, 0, 0)),
            Self::Morning => ((6, 0, 0), (12, 0, 0)),
            Self::Afternoon => ((12, 0, 0), (18, 0, 0)),
            Self::Evening => ((18, 0, 0), (23, 59, 59)),
        };
        (hms(sh, sm, ss), hms(eh, em, es))
    }

    /// Returns whether a departure time falls inside this window.
    #[must_use]
    pub fn contains(self, time: NaiveTime) -> bool {
        let (start, end) = self.bounds();
        (start..=end).contains(&time)
    }
}

/// Builds a [`NaiveTime`] from literal in-range components.
fn hms(hour: u32, min: u32, sec: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, sec).expect("window bound is a valid time of day")
}
