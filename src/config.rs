use std::path::PathBuf;

use rust_decimal::Decimal;

/// Lookback window used by the monthly trend when the caller has no preference.
pub const DEFAULT_TREND_MONTHS: u32 = 12;

/// Number of populated months averaged into a forecast.
pub const FORECAST_WINDOW_MONTHS: usize = 3;

/// Standard deviations strictly below this are rated LOW.
pub const VOLATILITY_LOW_CEILING: f64 = 5.0;

/// Standard deviations strictly above this are rated HIGH.
pub const VOLATILITY_HIGH_FLOOR: f64 = 20.0;

/// Month-over-month percent change beyond which a price is UP or DOWN.
pub const INFLATION_BAND_PCT: Decimal = Decimal::ONE;

/// Decimal places kept on monetary averages and percentages.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept on the intermediate price ratio of a percent change.
pub const RATIO_SCALE: u32 = 4;

/// Name of the joined view every observation query reads from.
pub const OBSERVATIONS_VIEW: &str = "price_observations";

/// Tables accepted by NDJSON imports, in the order a snapshot directory is loaded.
pub const IMPORT_TABLES: [&str; 4] = ["cities", "commodities", "markets", "price_records"];

/// DDL executed when a connection is opened. Idempotent.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cities (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    region VARCHAR
);

CREATE TABLE IF NOT EXISTS commodities (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    category VARCHAR,
    unit VARCHAR
);

CREATE TABLE IF NOT EXISTS markets (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    city_id BIGINT NOT NULL
);

CREATE TABLE IF NOT EXISTS price_records (
    id BIGINT,
    commodity_id BIGINT NOT NULL,
    market_id BIGINT NOT NULL,
    price DECIMAL(12, 2) NOT NULL,
    recorded_date DATE NOT NULL,
    source VARCHAR
);

CREATE OR REPLACE VIEW price_observations AS
SELECT
    pr.commodity_id,
    co.name AS commodity_name,
    pr.market_id,
    ci.name AS city_name,
    pr.price,
    pr.recorded_date
FROM price_records pr
JOIN commodities co ON pr.commodity_id = co.id
JOIN markets m ON pr.market_id = m.id
JOIN cities ci ON m.city_id = ci.id;
"#;

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("commodity-monitor").join("prices.duckdb")
    } else {
        PathBuf::from(".commodity-monitor").join("prices.duckdb")
    }
}
