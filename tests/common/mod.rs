//! Shared test fixtures for the commodity monitor integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB connection
//! populated with small sample tables (cities, commodities, markets,
//! price_records) via NDJSON temp files, and `write_snapshot_dir()` which
//! writes the same rows as an on-disk snapshot.
//!
//! Sample data, with `TODAY` = 2026-10-19:
//!
//! | commodity     | observations                                               |
//! |---------------|------------------------------------------------------------|
//! | 1 Maize       | Oct 110 (Accra), Oct 110 (Kumasi), Sep 100, Aug 90, 2025-06 80 |
//! | 2 Rice        | Oct 200.50, Sep 200.00                                     |
//! | 3 Yam         | 2026-07 45.00                                              |
//! | 4 Tomatoes    | none                                                       |
//! | 5 Palm Oil    | Jan 100, Feb 150                                           |
#![allow(dead_code)]

use chrono::NaiveDate;
use commodity_monitor::Connection;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub const TODAY: (i32, u32, u32) = (2026, 10, 19);

pub fn today() -> NaiveDate {
    date(TODAY.0, TODAY.1, TODAY.2)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create an in-memory `Connection` with the sample data loaded.
pub fn setup_sample_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    for (table, rows) in sample_tables() {
        register_table(&conn, table, &rows);
    }
    conn
}

/// Write every sample table as `<table>.ndjson` into `dir`.
///
/// When `gzip` is set, `price_records` is written compressed as
/// `price_records.ndjson.gz`.
pub fn write_snapshot_dir(dir: &Path, gzip: bool) {
    for (table, rows) in sample_tables() {
        let body = ndjson(&rows);
        if gzip && table == "price_records" {
            let file = std::fs::File::create(dir.join(format!("{}.ndjson.gz", table))).unwrap();
            let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            encoder.write_all(body.as_bytes()).unwrap();
            encoder.finish().unwrap();
        } else {
            std::fs::write(dir.join(format!("{}.ndjson", table)), body).unwrap();
        }
    }
}

fn register_table(conn: &Connection, table: &str, rows: &[serde_json::Value]) {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(ndjson(rows).as_bytes()).unwrap();
    tmp.flush().unwrap();
    let inserted = conn.import_ndjson(table, tmp.path()).unwrap();
    assert_eq!(inserted, rows.len());
}

fn ndjson(rows: &[serde_json::Value]) -> String {
    rows.iter()
        .map(|row| format!("{}\n", row))
        .collect::<String>()
}

fn sample_tables() -> Vec<(&'static str, Vec<serde_json::Value>)> {
    vec![
        ("cities", cities()),
        ("commodities", commodities()),
        ("markets", markets()),
        ("price_records", price_records()),
    ]
}

fn cities() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({"id": 1, "name": "Accra", "region": "Greater Accra"}),
        serde_json::json!({"id": 2, "name": "Kumasi", "region": "Ashanti"}),
        serde_json::json!({"id": 3, "name": "Tamale", "region": "Northern"}),
    ]
}

fn commodities() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({"id": 1, "name": "Maize", "category": "Grains", "unit": "kg"}),
        serde_json::json!({"id": 2, "name": "Rice", "category": "Grains", "unit": "kg"}),
        serde_json::json!({"id": 3, "name": "Yam", "category": "Tubers", "unit": "tuber"}),
        serde_json::json!({"id": 4, "name": "Tomatoes", "category": "Vegetables", "unit": "crate"}),
        serde_json::json!({"id": 5, "name": "Palm Oil", "category": "Oils", "unit": "litre"}),
    ]
}

fn markets() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({"id": 1, "name": "Makola", "city_id": 1}),
        serde_json::json!({"id": 2, "name": "Kejetia", "city_id": 2}),
        serde_json::json!({"id": 3, "name": "Tamale Central", "city_id": 3}),
        serde_json::json!({"id": 4, "name": "Kaneshie", "city_id": 1}),
    ]
}

fn price_records() -> Vec<serde_json::Value> {
    let record = |id: i64, commodity: i64, market: i64, price: &str, day: &str| {
        serde_json::json!({
            "id": id,
            "commodity_id": commodity,
            "market_id": market,
            "price": price,
            "recorded_date": day,
            "source": "field agent"
        })
    };
    vec![
        // Maize
        record(1, 1, 1, "110.00", "2026-10-05"),
        record(2, 1, 2, "110.00", "2026-10-12"),
        record(3, 1, 1, "100.00", "2026-09-10"),
        record(4, 1, 4, "90.00", "2026-08-15"),
        record(5, 1, 3, "80.00", "2025-06-01"),
        // Rice
        record(6, 2, 1, "200.50", "2026-10-03"),
        record(7, 2, 1, "200.00", "2026-09-20"),
        // Yam
        record(8, 3, 3, "45.00", "2026-07-01"),
        // Palm Oil
        record(9, 5, 1, "100.00", "2026-01-10"),
        record(10, 5, 2, "150.00", "2026-02-10"),
    ]
}
