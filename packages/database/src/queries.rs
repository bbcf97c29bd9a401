//! Query construction and execution for bus-route filtering.
//!
//! One predicate builder serves every projection: the detail table and
//! the booking-link table for an interaction are built from the same
//! [`RouteFilter`], so their criteria cannot diverge. Placeholders are
//! positional `$N` throughout and every value is bound, including in the
//! dependent route-name lookup.

use std::fmt::Write as _;

use bus_explorer_database_models::{
    BookingLinkRow, FilterError, OverviewRow, Projection, RouteFilter, RouteRow, TIME_FORMAT,
};
use chrono::NaiveTime;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Builds the parameterized query for one projection of `filter`.
///
/// The predicate always constrains `star_rating` and `fare_price`; the
/// optional clauses follow in a fixed order (state, route, departure
/// window, bus type) so identical filters produce identical SQL. The
/// returned parameter list mirrors placeholder order exactly.
///
/// # Errors
///
/// Returns [`FilterError`] if the filter fails validation; nothing is
/// built from an invalid filter.
pub fn build_filter_query(
    projection: Projection,
    filter: &RouteFilter,
) -> Result<(String, Vec<DatabaseValue>), FilterError> {
    filter.validate()?;

    let mut sql = format!(
        "SELECT {} FROM bus_routes WHERE star_rating >= $1 AND fare_price BETWEEN $2 AND $3",
        projection.columns().join(", ")
    );
    let mut params = vec![
        DatabaseValue::Real64(filter.min_star_rating),
        DatabaseValue::Real64(filter.price_min),
        DatabaseValue::Real64(filter.price_max),
    ];

    if let Some(state) = &filter.state {
        write!(sql, " AND state = ${}", params.len() + 1).unwrap();
        params.push(DatabaseValue::String(state.clone()));
    }

    if let Some(route_name) = &filter.route_name {
        write!(sql, " AND route_name = ${}", params.len() + 1).unwrap();
        params.push(DatabaseValue::String(route_name.clone()));
    }

    if let Some(window) = filter.departure_window {
        let (start, end) = window.bounds();
        write!(
            sql,
            " AND departing_time BETWEEN ${} AND ${}",
            params.len() + 1,
            params.len() + 2
        )
        .unwrap();
        params.push(DatabaseValue::String(start.format(TIME_FORMAT).to_string()));
        params.push(DatabaseValue::String(end.format(TIME_FORMAT).to_string()));
    }

    match filter.bus_type.matching_patterns() {
        [] => {}
        [pattern] => {
            write!(sql, " AND bus_type LIKE ${}", params.len() + 1).unwrap();
            params.push(DatabaseValue::String((*pattern).to_string()));
        }
        patterns => {
            let mut alternatives = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                alternatives.push(format!("bus_type LIKE ${}", params.len() + 1));
                params.push(DatabaseValue::String((*pattern).to_string()));
            }
            write!(sql, " AND ({})", alternatives.join(" OR ")).unwrap();
        }
    }

    for pattern in filter.bus_type.excluded_patterns() {
        write!(sql, " AND bus_type NOT LIKE ${}", params.len() + 1).unwrap();
        params.push(DatabaseValue::String((*pattern).to_string()));
    }

    Ok((sql, params))
}

/// Runs the detail projection for `filter`.
///
/// # Errors
///
/// Returns [`DbError`] if the filter is invalid, the query fails, or a
/// row does not match the expected shape.
pub async fn query_routes(
    db: &dyn Database,
    filter: &RouteFilter,
) -> Result<Vec<RouteRow>, DbError> {
    let (sql, params) = build_filter_query(Projection::Detail, filter)?;
    let rows = db.query_raw_params(&sql, &params).await?;

    let mut routes = Vec::with_capacity(rows.len());
    for row in &rows {
        let departing: String = row
            .to_value("departing_time")
            .map_err(|e| conversion("departing_time", e))?;
        let arriving: String = row
            .to_value("arrival_time")
            .map_err(|e| conversion("arrival_time", e))?;

        routes.push(RouteRow {
            state: row.to_value("state").map_err(|e| conversion("state", e))?,
            bus_name: row
                .to_value("bus_name")
                .map_err(|e| conversion("bus_name", e))?,
            route_name: row
                .to_value("route_name")
                .map_err(|e| conversion("route_name", e))?,
            bus_type: row
                .to_value("bus_type")
                .map_err(|e| conversion("bus_type", e))?,
            departing_time: parse_time("departing_time", &departing)?,
            arrival_time: parse_time("arrival_time", &arriving)?,
            duration: row
                .to_value("Duration")
                .map_err(|e| conversion("Duration", e))?,
            star_rating: row
                .to_value("star_rating")
                .map_err(|e| conversion("star_rating", e))?,
            fare_price: row
                .to_value("fare_price")
                .map_err(|e| conversion("fare_price", e))?,
            seat_availability: row
                .to_value("seat_availablity")
                .map_err(|e| conversion("seat_availablity", e))?,
        });
    }

    Ok(routes)
}

/// Runs the booking-link projection for `filter`.
///
/// Rows without a stored link are dropped here, so the returned table
/// never carries nulls and its indices are contiguous.
///
/// # Errors
///
/// Returns [`DbError`] if the filter is invalid, the query fails, or a
/// row does not match the expected shape.
pub async fn query_booking_links(
    db: &dyn Database,
    filter: &RouteFilter,
) -> Result<Vec<BookingLinkRow>, DbError> {
    let (sql, params) = build_filter_query(Projection::BookingLinks, filter)?;
    let rows = db.query_raw_params(&sql, &params).await?;

    let mut links = Vec::with_capacity(rows.len());
    for row in &rows {
        let bus_name: String = row
            .to_value("bus_name")
            .map_err(|e| conversion("bus_name", e))?;
        let route_link: Option<String> = row
            .to_value("route_link")
            .map_err(|e| conversion("route_link", e))?;

        if let Some(route_link) = route_link {
            links.push(BookingLinkRow {
                bus_name,
                route_link,
            });
        }
    }

    Ok(links)
}

/// Runs both projections for the same filter.
///
/// The two tables of an interaction come from one `RouteFilter` and one
/// builder, so their bound parameter values are identical by
/// construction.
///
/// # Errors
///
/// Returns [`DbError`] if either projection fails; no partial pair is
/// returned.
pub async fn query_projections(
    db: &dyn Database,
    filter: &RouteFilter,
) -> Result<(Vec<RouteRow>, Vec<BookingLinkRow>), DbError> {
    let routes = query_routes(db, filter).await?;
    let links = query_booking_links(db, filter).await?;
    Ok((routes, links))
}

/// Lists every distinct state, lexicographically sorted.
///
/// Always the full set: the state picker is never narrowed by other
/// selections.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn list_states(db: &dyn Database) -> Result<Vec<String>, DbError> {
    let rows = db
        .query_raw_params("SELECT DISTINCT state FROM bus_routes ORDER BY state", &[])
        .await?;

    rows.iter()
        .map(|row| row.to_value("state").map_err(|e| conversion("state", e)))
        .collect()
}

/// Lists distinct route names, lexicographically sorted, optionally
/// narrowed to one state.
///
/// Recomputed on every call: the route picker cascades from the state
/// picker, and a stale list would offer routes the current state does
/// not have.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn list_route_names(
    db: &dyn Database,
    state: Option<&str>,
) -> Result<Vec<String>, DbError> {
    let rows = match state {
        Some(state) => {
            db.query_raw_params(
                "SELECT DISTINCT route_name FROM bus_routes WHERE state = $1 ORDER BY route_name",
                &[DatabaseValue::String(state.to_string())],
            )
            .await?
        }
        None => {
            db.query_raw_params(
                "SELECT DISTINCT route_name FROM bus_routes ORDER BY route_name",
                &[],
            )
            .await?
        }
    };

    rows.iter()
        .map(|row| {
            row.to_value("route_name")
                .map_err(|e| conversion("route_name", e))
        })
        .collect()
}

/// Fetches the compact unfiltered overview listing.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row does not match the
/// expected shape.
pub async fn query_overview(db: &dyn Database) -> Result<Vec<OverviewRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT state, route_name, bus_name, departing_time, arrival_time, bus_type
             FROM bus_routes",
            &[],
        )
        .await?;

    let mut overview = Vec::with_capacity(rows.len());
    for row in &rows {
        let departing: String = row
            .to_value("departing_time")
            .map_err(|e| conversion("departing_time", e))?;
        let arriving: String = row
            .to_value("arrival_time")
            .map_err(|e| conversion("arrival_time", e))?;

        overview.push(OverviewRow {
            state: row.to_value("state").map_err(|e| conversion("state", e))?,
            route_name: row
                .to_value("route_name")
                .map_err(|e| conversion("route_name", e))?,
            bus_name: row
                .to_value("bus_name")
                .map_err(|e| conversion("bus_name", e))?,
            departing_time: parse_time("departing_time", &departing)?,
            arrival_time: parse_time("arrival_time", &arriving)?,
            bus_type: row
                .to_value("bus_type")
                .map_err(|e| conversion("bus_type", e))?,
        });
    }

    Ok(overview)
}

/// Wraps a row-field failure so it surfaces instead of becoming an
/// empty result.
fn conversion(field: &str, e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: format!("Failed to parse {field}: {e}"),
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, DbError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|e| conversion(field, e))
}

#[cfg(test)]
mod tests {
    use bus_explorer_route_models::{BusTypeCategory, DepartureWindow};
    use switchy_database_connection::init_sqlite_rusqlite;

    use super::*;

    const DETAIL_COLUMNS: &str = "state, bus_name, route_name, bus_type, departing_time, \
                                  arrival_time, Duration, star_rating, fare_price, seat_availablity";

    #[test]
    fn unconstrained_filter_builds_the_base_predicate_only() {
        let (sql, params) =
            build_filter_query(Projection::Detail, &RouteFilter::default()).unwrap();

        assert_eq!(
            sql,
            format!(
                "SELECT {DETAIL_COLUMNS} FROM bus_routes \
                 WHERE star_rating >= $1 AND fare_price BETWEEN $2 AND $3"
            )
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn fully_constrained_filter_builds_clauses_in_fixed_order() {
        let filter = RouteFilter {
            state: Some("Karnataka".to_string()),
            route_name: None,
            price_min: 0.0,
            price_max: 5000.0,
            min_star_rating: 3.0,
            departure_window: Some(DepartureWindow::Morning),
            bus_type: BusTypeCategory::Sleeper,
        };

        let (sql, params) = build_filter_query(Projection::Detail, &filter).unwrap();

        assert_eq!(
            sql,
            format!(
                "SELECT {DETAIL_COLUMNS} FROM bus_routes \
                 WHERE star_rating >= $1 AND fare_price BETWEEN $2 AND $3 \
                 AND state = $4 \
                 AND departing_time BETWEEN $5 AND $6 \
                 AND bus_type LIKE $7"
            )
        );

        assert_eq!(params.len(), 7);
        assert!(matches!(&params[0], DatabaseValue::Real64(v) if (*v - 3.0).abs() < f64::EPSILON));
        assert!(matches!(&params[1], DatabaseValue::Real64(v) if v.abs() < f64::EPSILON));
        assert!(
            matches!(&params[2], DatabaseValue::Real64(v) if (*v - 5000.0).abs() < f64::EPSILON)
        );
        assert!(matches!(&params[3], DatabaseValue::String(s) if s == "Karnataka"));
        assert!(matches!(&params[4], DatabaseValue::String(s) if s == "06:00:00"));
        assert!(matches!(&params[5], DatabaseValue::String(s) if s == "12:00:00"));
        assert!(matches!(&params[6], DatabaseValue::String(s) if s == "%Sleeper%"));
    }

    #[test]
    fn ac_category_builds_positive_and_negative_patterns() {
        let filter = RouteFilter {
            bus_type: BusTypeCategory::Ac,
            ..RouteFilter::default()
        };

        let (sql, params) = build_filter_query(Projection::Detail, &filter).unwrap();

        assert!(sql.ends_with(
            "AND (bus_type LIKE $4 OR bus_type LIKE $5) \
             AND bus_type NOT LIKE $6 AND bus_type NOT LIKE $7"
        ));
        assert_eq!(params.len(), 7);
        assert!(matches!(&params[3], DatabaseValue::String(s) if s == "%AC%"));
        assert!(matches!(&params[4], DatabaseValue::String(s) if s == "%A/C%"));
        assert!(matches!(&params[5], DatabaseValue::String(s) if s == "%NON AC%"));
        assert!(matches!(&params[6], DatabaseValue::String(s) if s == "%NON A/C%"));
    }

    #[test]
    fn route_clause_follows_state_clause() {
        let filter = RouteFilter {
            state: Some("Kerala".to_string()),
            route_name: Some("Kochi to Trivandrum".to_string()),
            ..RouteFilter::default()
        };

        let (sql, params) = build_filter_query(Projection::Detail, &filter).unwrap();

        assert!(sql.ends_with("AND state = $4 AND route_name = $5"));
        assert!(matches!(&params[4], DatabaseValue::String(s) if s == "Kochi to Trivandrum"));
    }

    #[test]
    fn booking_links_projection_shares_the_predicate() {
        let filter = RouteFilter {
            state: Some("Karnataka".to_string()),
            ..RouteFilter::default()
        };

        let (detail_sql, detail_params) =
            build_filter_query(Projection::Detail, &filter).unwrap();
        let (links_sql, links_params) =
            build_filter_query(Projection::BookingLinks, &filter).unwrap();

        assert!(links_sql.starts_with("SELECT bus_name, route_link FROM bus_routes"));
        let detail_predicate = detail_sql.split_once(" WHERE ").unwrap().1;
        let links_predicate = links_sql.split_once(" WHERE ").unwrap().1;
        assert_eq!(detail_predicate, links_predicate);
        assert_eq!(detail_params.len(), links_params.len());
    }

    #[test]
    fn identical_filters_build_identical_queries() {
        let filter = RouteFilter {
            state: Some("Telangana".to_string()),
            departure_window: Some(DepartureWindow::Evening),
            bus_type: BusTypeCategory::Seater,
            ..RouteFilter::default()
        };

        let (first_sql, first_params) = build_filter_query(Projection::Detail, &filter).unwrap();
        let (second_sql, second_params) = build_filter_query(Projection::Detail, &filter).unwrap();

        assert_eq!(first_sql, second_sql);
        assert_eq!(format!("{first_params:?}"), format!("{second_params:?}"));
    }

    #[test]
    fn invalid_filter_builds_nothing() {
        let filter = RouteFilter {
            price_min: 100.0,
            price_max: 50.0,
            ..RouteFilter::default()
        };

        assert!(matches!(
            build_filter_query(Projection::Detail, &filter),
            Err(FilterError::PriceRange { .. })
        ));
    }

    // -----------------------------------------------------------------
    // End-to-end queries against an in-memory store
    // -----------------------------------------------------------------

    struct SeedRoute {
        state: &'static str,
        route_name: &'static str,
        bus_name: &'static str,
        bus_type: &'static str,
        departing_time: &'static str,
        arrival_time: &'static str,
        duration: &'static str,
        star_rating: f64,
        fare_price: f64,
        seat_availability: i64,
        route_link: Option<&'static str>,
    }

    const SEED_ROUTES: &[SeedRoute] = &[
        SeedRoute {
            state: "Karnataka",
            route_name: "Bangalore to Mysore",
            bus_name: "Airavat Club Class",
            bus_type: "AC Sleeper (2+1)",
            departing_time: "06:30:00",
            arrival_time: "09:45:00",
            duration: "3h 15m",
            star_rating: 4.5,
            fare_price: 800.0,
            seat_availability: 12,
            route_link: Some("https://bus.example/airavat"),
        },
        SeedRoute {
            state: "Karnataka",
            route_name: "Bangalore to Mysore",
            bus_name: "SRS Travels",
            bus_type: "NON AC Seater (2+2)",
            departing_time: "13:00:00",
            arrival_time: "16:30:00",
            duration: "3h 30m",
            star_rating: 3.2,
            fare_price: 450.0,
            seat_availability: 30,
            route_link: None,
        },
        SeedRoute {
            state: "Kerala",
            route_name: "Kochi to Trivandrum",
            bus_name: "Kerala Lines",
            bus_type: "A/C Semi Sleeper",
            departing_time: "18:15:00",
            arrival_time: "23:30:00",
            duration: "5h 15m",
            star_rating: 4.0,
            fare_price: 950.0,
            seat_availability: 8,
            route_link: Some("https://bus.example/kerala-lines"),
        },
        SeedRoute {
            state: "Kerala",
            route_name: "Kochi to Kozhikode",
            bus_name: "Green Line Travels",
            bus_type: "NON A/C Seater / Sleeper (2+1)",
            departing_time: "05:00:00",
            arrival_time: "10:00:00",
            duration: "5h",
            star_rating: 2.8,
            fare_price: 350.0,
            seat_availability: 22,
            route_link: Some("https://bus.example/green-line"),
        },
        SeedRoute {
            state: "Telangana",
            route_name: "Hyderabad to Warangal",
            bus_name: "Garuda Plus",
            bus_type: "AC Seater",
            departing_time: "11:59:00",
            arrival_time: "14:30:00",
            duration: "2h 31m",
            star_rating: 4.8,
            fare_price: 600.0,
            seat_availability: 5,
            route_link: None,
        },
    ];

    async fn seeded_db() -> Box<dyn Database> {
        let db = init_sqlite_rusqlite(None).expect("Failed to open in-memory SQLite database");

        db.exec_raw(
            "CREATE TABLE bus_routes (
                state            TEXT NOT NULL,
                route_name       TEXT NOT NULL,
                bus_name         TEXT NOT NULL,
                bus_type         TEXT NOT NULL,
                departing_time   TEXT NOT NULL,
                arrival_time     TEXT NOT NULL,
                Duration         TEXT NOT NULL,
                star_rating      REAL NOT NULL,
                fare_price       REAL NOT NULL,
                seat_availablity INTEGER NOT NULL,
                route_link       TEXT
            )",
        )
        .await
        .expect("Failed to create bus_routes table");

        for route in SEED_ROUTES {
            db.exec_raw_params(
                "INSERT INTO bus_routes (
                    state, route_name, bus_name, bus_type, departing_time,
                    arrival_time, Duration, star_rating, fare_price,
                    seat_availablity, route_link
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    DatabaseValue::String(route.state.to_string()),
                    DatabaseValue::String(route.route_name.to_string()),
                    DatabaseValue::String(route.bus_name.to_string()),
                    DatabaseValue::String(route.bus_type.to_string()),
                    DatabaseValue::String(route.departing_time.to_string()),
                    DatabaseValue::String(route.arrival_time.to_string()),
                    DatabaseValue::String(route.duration.to_string()),
                    DatabaseValue::Real64(route.star_rating),
                    DatabaseValue::Real64(route.fare_price),
                    DatabaseValue::Int64(route.seat_availability),
                    route
                        .route_link
                        .map_or(DatabaseValue::Null, |l| DatabaseValue::String(l.to_string())),
                ],
            )
            .await
            .expect("Failed to seed bus_routes row");
        }

        db
    }

    #[tokio::test]
    async fn detail_rows_respect_rating_and_price_bounds() {
        let db = seeded_db().await;
        let filter = RouteFilter {
            min_star_rating: 4.0,
            price_min: 500.0,
            price_max: 1000.0,
            ..RouteFilter::default()
        };

        let routes = query_routes(db.as_ref(), &filter).await.unwrap();

        assert_eq!(routes.len(), 3);
        for row in &routes {
            assert!(row.star_rating >= 4.0);
            assert!((500.0..=1000.0).contains(&row.fare_price));
        }
    }

    #[tokio::test]
    async fn ac_filter_excludes_non_ac_tags() {
        let db = seeded_db().await;
        let filter = RouteFilter {
            bus_type: BusTypeCategory::Ac,
            ..RouteFilter::default()
        };

        let routes = query_routes(db.as_ref(), &filter).await.unwrap();

        assert_eq!(routes.len(), 3);
        for row in &routes {
            assert!(
                BusTypeCategory::Ac.matches(&row.bus_type),
                "{} leaked through the AC filter",
                row.bus_type
            );
        }
    }

    #[tokio::test]
    async fn departure_window_narrows_to_morning_departures() {
        let db = seeded_db().await;
        let filter = RouteFilter {
            departure_window: Some(DepartureWindow::Morning),
            ..RouteFilter::default()
        };

        let routes = query_routes(db.as_ref(), &filter).await.unwrap();

        assert_eq!(routes.len(), 2);
        for row in &routes {
            assert!(DepartureWindow::Morning.contains(row.departing_time));
        }
    }

    #[tokio::test]
    async fn booking_links_drop_null_rows_and_stay_consistent() {
        let db = seeded_db().await;
        let filter = RouteFilter::default();

        let (routes, links) = query_projections(db.as_ref(), &filter).await.unwrap();

        assert_eq!(routes.len(), SEED_ROUTES.len());
        assert_eq!(links.len(), 3);
        for link in &links {
            assert!(!link.route_link.is_empty());
            assert!(
                routes.iter().any(|r| r.bus_name == link.bus_name),
                "{} missing from the detail table",
                link.bus_name
            );
        }
    }

    #[tokio::test]
    async fn no_matching_rows_yields_empty_tables_without_error() {
        let db = seeded_db().await;
        let filter = RouteFilter {
            min_star_rating: 5.0,
            price_max: 1.0,
            price_min: 0.0,
            ..RouteFilter::default()
        };

        let (routes, links) = query_projections(db.as_ref(), &filter).await.unwrap();

        assert!(routes.is_empty());
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn states_come_back_sorted_and_distinct() {
        let db = seeded_db().await;

        let states = list_states(db.as_ref()).await.unwrap();

        assert_eq!(states, ["Karnataka", "Kerala", "Telangana"]);
    }

    #[tokio::test]
    async fn route_names_cascade_from_the_selected_state() {
        let db = seeded_db().await;

        let all_routes = list_route_names(db.as_ref(), None).await.unwrap();
        let kerala_routes = list_route_names(db.as_ref(), Some("Kerala")).await.unwrap();

        assert_eq!(
            all_routes,
            [
                "Bangalore to Mysore",
                "Hyderabad to Warangal",
                "Kochi to Kozhikode",
                "Kochi to Trivandrum",
            ]
        );
        assert_eq!(kerala_routes, ["Kochi to Kozhikode", "Kochi to Trivandrum"]);
        for route in &kerala_routes {
            assert!(all_routes.contains(route));
        }
    }

    #[tokio::test]
    async fn overview_lists_every_offering() {
        let db = seeded_db().await;

        let overview = query_overview(db.as_ref()).await.unwrap();

        assert_eq!(overview.len(), SEED_ROUTES.len());
        assert!(overview.iter().any(|r| r.bus_name == "Garuda Plus"));
    }
}
