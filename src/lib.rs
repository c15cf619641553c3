//! Commodity price analytics for Rust.
//!
//! Tracks commodity prices recorded at markets across cities and derives
//! five views from the raw observations: monthly trend, city comparison,
//! volatility rating, inflation direction and a moving-average forecast.
//! Observations are read through the [`PriceStore`] trait; the bundled
//! store keeps price-record snapshots in an in-process DuckDB database.
//!
//! # Quick start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use commodity_monitor::CommodityMonitor;
//!
//! let monitor = CommodityMonitor::builder()
//!     .snapshot_dir("data/snapshot")
//!     .build()
//!     .unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//!
//! // Average price per month over the last year
//! let trend = monitor.analytics().monthly_trend(1, 12, today).unwrap();
//!
//! // Next month's price, if three months of history exist
//! let forecast = monitor.analytics().moving_average_forecast(1, today).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod sql_builder;
pub mod stats;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncCommodityMonitor;
pub use connection::Connection;
pub use error::{MonitorError, Result};
pub use sql_builder::{SqlBuilder, SqlParam};
pub use store::{InMemoryPriceStore, PriceStore};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

// ---------------------------------------------------------------------------
// CommodityMonitorBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CommodityMonitor`] instance.
///
/// Use [`CommodityMonitor::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CommodityMonitorBuilder::build).
#[derive(Debug, Default)]
pub struct CommodityMonitorBuilder {
    database: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
}

impl CommodityMonitorBuilder {
    /// Persist data in a DuckDB file at `path`.
    ///
    /// If not set, the monitor runs on an in-memory database that is
    /// discarded when it is dropped.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Persist data in the platform data directory
    /// (see [`config::default_database_path`]).
    pub fn default_database(mut self) -> Self {
        self.database = Some(config::default_database_path());
        self
    }

    /// Import `<table>.ndjson[.gz]` snapshot files from `dir` on build.
    pub fn snapshot_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.snapshot_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Open the database, apply the schema, and import any snapshot.
    pub fn build(self) -> Result<CommodityMonitor> {
        let conn = Connection::open(self.database.as_deref())?;
        if let Some(dir) = &self.snapshot_dir {
            let rows = conn.import_snapshot_dir(dir)?;
            info!(rows, dir = %dir.display(), "loaded price snapshot");
        }
        Ok(CommodityMonitor { conn })
    }
}

// ---------------------------------------------------------------------------
// CommodityMonitor
// ---------------------------------------------------------------------------

/// The main entry point for commodity price analytics.
///
/// Wraps a DuckDB-backed [`Connection`] and exposes the query interfaces as
/// lightweight borrowing wrappers.
///
/// Created via [`CommodityMonitor::builder()`].
pub struct CommodityMonitor {
    conn: Connection,
}

impl CommodityMonitor {
    /// Create a new builder for configuring the monitor.
    pub fn builder() -> CommodityMonitorBuilder {
        CommodityMonitorBuilder::default()
    }

    /// Wrap an already opened connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the analytics interface (trend, city comparison, volatility,
    /// inflation, forecast).
    pub fn analytics(&self) -> queries::AnalyticsQuery<'_, Connection> {
        queries::AnalyticsQuery::new(&self.conn)
    }

    /// Access the raw observation history interface.
    pub fn observations(&self) -> queries::ObservationQuery<'_, Connection> {
        queries::ObservationQuery::new(&self.conn)
    }

    // -- Data loading and utility methods ----------------------------------

    /// Append rows from an NDJSON file (optionally gzip-compressed) to a table.
    ///
    /// Returns the number of rows inserted.
    pub fn import_ndjson<P: AsRef<Path>>(&self, table: &str, path: P) -> Result<usize> {
        self.conn.import_ndjson(table, path.as_ref())
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Provides escape-hatch access for queries not covered by the
    /// query interfaces. Each row is a `HashMap<String, serde_json::Value>`.
    pub fn sql(
        &self,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Consume the monitor and release the database.
    pub fn close(self) {
        drop(self);
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CommodityMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self
            .conn
            .location()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        let records = self.conn.row_count("price_records").unwrap_or(0);
        write!(
            f,
            "CommodityMonitor(database={}, price_records={})",
            location, records
        )
    }
}
