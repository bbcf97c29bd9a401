#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CSV export formatting for bus explorer result tables.
//!
//! Serializes a result table to comma-separated bytes for download: one
//! header row of display column names, no index column, columns in
//! projection order. The output re-parses with any standard CSV reader
//! to the same cells in the same order.

use bus_explorer_database_models::{BookingLinkRow, RouteRow, TIME_FORMAT};
use thiserror::Error;

/// Download filename for the detail table export.
pub const ROUTES_CSV_FILENAME: &str = "filtered_bus_routes.csv";

/// Download filename for the booking-link table export.
pub const BOOKING_LINKS_CSV_FILENAME: &str = "booking_links_filtered_routes.csv";

/// MIME type both exports are served with.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Display column headers for the detail table, in projection order.
const ROUTE_HEADERS: [&str; 10] = [
    "State",
    "Bus Name",
    "From to To",
    "Bus Types",
    "Departure Time",
    "Arrival Time",
    "Duration",
    "Star Rating",
    "Price",
    "Seat Availability",
];

/// Display column headers for the booking-link table.
const BOOKING_LINK_HEADERS: [&str; 2] = ["Bus Name", "Booking Link"];

/// Errors from serializing a result table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A record failed to serialize.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// The writer could not be flushed into the output buffer.
    #[error("CSV flush error: {0}")]
    Flush(String),
}

/// Serializes the detail table to CSV bytes.
///
/// An empty table still produces a valid header-only file.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization fails; no partial download
/// is produced.
pub fn routes_to_csv(rows: &[RouteRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ROUTE_HEADERS)?;

    for row in rows {
        writer.write_record(&[
            row.state.clone(),
            row.bus_name.clone(),
            row.route_name.clone(),
            row.bus_type.clone(),
            row.departing_time.format(TIME_FORMAT).to_string(),
            row.arrival_time.format(TIME_FORMAT).to_string(),
            row.duration.clone(),
            row.star_rating.to_string(),
            row.fare_price.to_string(),
            row.seat_availability.to_string(),
        ])?;
    }

    finish(writer)
}

/// Serializes the booking-link table to CSV bytes.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization fails; no partial download
/// is produced.
pub fn booking_links_to_csv(rows: &[BookingLinkRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(BOOKING_LINK_HEADERS)?;

    for row in rows {
        writer.write_record(&[row.bus_name.clone(), row.route_link.clone()])?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    fn sample_routes() -> Vec<RouteRow> {
        vec![
            RouteRow {
                state: "Karnataka".to_string(),
                bus_name: "Airavat Club Class".to_string(),
                route_name: "Bangalore to Mysore".to_string(),
                bus_type: "AC Sleeper (2+1)".to_string(),
                departing_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
                arrival_time: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
                duration: "3h 15m".to_string(),
                star_rating: 4.5,
                fare_price: 800.0,
                seat_availability: 12,
            },
            RouteRow {
                state: "Kerala".to_string(),
                bus_name: "Kerala Lines".to_string(),
                route_name: "Kochi to Trivandrum, via Alappuzha".to_string(),
                bus_type: "A/C Semi Sleeper".to_string(),
                departing_time: NaiveTime::from_hms_opt(18, 15, 0).unwrap(),
                arrival_time: NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
                duration: "5h 15m".to_string(),
                star_rating: 4.0,
                fare_price: 950.5,
                seat_availability: 8,
            },
        ]
    }

    #[test]
    fn route_export_roundtrips_through_a_csv_reader() {
        let rows = sample_routes();
        let bytes = routes_to_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(ROUTE_HEADERS.as_slice())
        );

        let records: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), rows.len());

        // The embedded comma in the second route name must survive.
        assert_eq!(&records[1][2], "Kochi to Trivandrum, via Alappuzha");
        assert_eq!(&records[0][4], "06:30:00");
        assert_eq!(&records[0][7], "4.5");
        assert_eq!(&records[1][8], "950.5");
        assert_eq!(&records[1][9], "8");
    }

    #[test]
    fn empty_route_table_exports_a_header_only_file() {
        let bytes = routes_to_csv(&[]).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        assert_eq!(reader.headers().unwrap().len(), ROUTE_HEADERS.len());
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn booking_link_export_has_no_index_column() {
        let rows = vec![
            BookingLinkRow {
                bus_name: "Airavat Club Class".to_string(),
                route_link: "https://bus.example/airavat".to_string(),
            },
            BookingLinkRow {
                bus_name: "Kerala Lines".to_string(),
                route_link: "https://bus.example/kerala-lines".to_string(),
            },
        ];

        let bytes = booking_links_to_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(BOOKING_LINK_HEADERS.as_slice())
        );
        let records: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 2);
        assert_eq!(&records[1][1], "https://bus.example/kerala-lines");
    }

    #[test]
    fn filenames_match_the_download_contract() {
        assert_eq!(ROUTES_CSV_FILENAME, "filtered_bus_routes.csv");
        assert_eq!(BOOKING_LINKS_CSV_FILENAME, "booking_links_filtered_routes.csv");
    }
}
