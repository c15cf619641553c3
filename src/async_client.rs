//! Async wrapper around [`CommodityMonitor`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every operation on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use commodity_monitor::AsyncCommodityMonitor;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let monitor = AsyncCommodityMonitor::builder()
//!         .snapshot_dir("data/snapshot")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//!     let ratings = monitor.volatility().await.unwrap();
//!     let inflation = monitor.inflation_trend(1, today).await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::error::{MonitorError, Result};
use crate::models::{
    CityComparisonPoint, InflationTrend, MonthlyTrendPoint, MovingAverageForecast,
    VolatilityRating,
};
use crate::CommodityMonitor;

// ---------------------------------------------------------------------------
// AsyncCommodityMonitorBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCommodityMonitor`] instance.
#[derive(Debug, Default)]
pub struct AsyncCommodityMonitorBuilder {
    database: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
}

impl AsyncCommodityMonitorBuilder {
    /// Persist data in a DuckDB file at `path`.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Import `<table>.ndjson[.gz]` snapshot files from `dir` on build.
    pub fn snapshot_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.snapshot_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Build the async monitor.
    ///
    /// Opening the database and importing snapshots run on the blocking
    /// thread pool so they won't block the async event loop.
    pub async fn build(self) -> Result<AsyncCommodityMonitor> {
        tokio::task::spawn_blocking(move || {
            let mut builder = CommodityMonitor::builder();
            if let Some(path) = self.database {
                builder = builder.database(path);
            }
            if let Some(dir) = self.snapshot_dir {
                builder = builder.snapshot_dir(dir);
            }
            let monitor = builder.build()?;
            Ok(AsyncCommodityMonitor {
                inner: Arc::new(Mutex::new(monitor)),
            })
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncCommodityMonitor
// ---------------------------------------------------------------------------

/// Async wrapper around [`CommodityMonitor`].
///
/// The DuckDB connection is not `Sync`, so the monitor sits behind a
/// [`Mutex`]; concurrent calls are serialized on it. Cloning is cheap and
/// shares the same database.
#[derive(Clone)]
pub struct AsyncCommodityMonitor {
    inner: Arc<Mutex<CommodityMonitor>>,
}

impl AsyncCommodityMonitor {
    /// Create a new builder for configuring the async monitor.
    pub fn builder() -> AsyncCommodityMonitorBuilder {
        AsyncCommodityMonitorBuilder::default()
    }

    /// Run a sync monitor operation on the blocking thread pool.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use commodity_monitor::AsyncCommodityMonitor;
    /// # async fn example() -> commodity_monitor::Result<()> {
    /// # let monitor = AsyncCommodityMonitor::builder().build().await?;
    /// let history = monitor.run(|m| m.observations().for_commodity(1)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CommodityMonitor) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let monitor = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = monitor
                .lock()
                .map_err(|_| MonitorError::InvalidArgument("monitor lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(join_error)?
    }

    pub async fn monthly_trend(
        &self,
        commodity_id: i64,
        months: u32,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyTrendPoint>> {
        self.run(move |m| m.analytics().monthly_trend(commodity_id, months, today))
            .await
    }

    pub async fn city_comparison(&self, commodity_id: i64) -> Result<Vec<CityComparisonPoint>> {
        self.run(move |m| m.analytics().city_comparison(commodity_id))
            .await
    }

    pub async fn volatility(&self) -> Result<Vec<VolatilityRating>> {
        self.run(|m| m.analytics().volatility()).await
    }

    pub async fn inflation_trend(
        &self,
        commodity_id: i64,
        today: NaiveDate,
    ) -> Result<Option<InflationTrend>> {
        self.run(move |m| m.analytics().inflation_trend(commodity_id, today))
            .await
    }

    pub async fn moving_average_forecast(
        &self,
        commodity_id: i64,
        today: NaiveDate,
    ) -> Result<Option<MovingAverageForecast>> {
        self.run(move |m| m.analytics().moving_average_forecast(commodity_id, today))
            .await
    }
}

fn join_error(e: tokio::task::JoinError) -> MonitorError {
    MonitorError::InvalidArgument(format!("Task join error: {e}"))
}
