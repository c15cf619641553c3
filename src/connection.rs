//! DuckDB connection wrapper: schema setup, snapshot imports, and query execution.
//!
//! The connection is the concrete [`PriceStore`] behind
//! [`CommodityMonitor`](crate::CommodityMonitor). Price records, markets,
//! cities and commodities live in plain tables; observations are read from a
//! joined view so every row already carries its commodity and city names.

use crate::config;
use crate::error::{MonitorError, Result};
use crate::models::{ObservationFilter, PriceObservation};
use crate::sql_builder::{SqlBuilder, SqlParam};
use crate::store::PriceStore;
use chrono::NaiveDate;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Columns of the observation view, in [`PriceObservation`] field order.
const OBSERVATION_COLUMNS: [&str; 6] = [
    "commodity_id",
    "commodity_name",
    "market_id",
    "city_name",
    "price",
    "recorded_date",
];

/// Days between 0001-01-01 and 1970-01-01, the DuckDB `DATE` epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Wraps a DuckDB connection holding the price-record schema.
pub struct Connection {
    conn: DuckDbConnection,
    location: Option<PathBuf>,
}

impl Connection {
    /// Open a database file, or an in-memory database when `path` is `None`.
    ///
    /// Parent directories are created as needed and the schema is applied
    /// idempotently, so reopening an existing file keeps its data.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let conn = match path {
            Some(p) => {
                if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                DuckDbConnection::open(p)?
            }
            None => DuckDbConnection::open_in_memory()?,
        };
        conn.execute_batch(config::SCHEMA)?;
        debug!(location = ?path, "price schema ready");
        Ok(Self {
            conn,
            location: path.map(Path::to_path_buf),
        })
    }

    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    /// Path of the backing database file, `None` when in memory.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Decimals come back as exact strings and dates as `YYYY-MM-DD`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run.
        let statement = rows_result.as_ref().ok_or_else(|| {
            MonitorError::InvalidArgument(format!("Statement produced no result set: {}", sql))
        })?;
        let column_names: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Append rows from a newline-delimited JSON file to one of the schema tables.
    ///
    /// Keys are matched to columns by name; missing optional columns are left
    /// `NULL`. Files ending in `.gz` are decompressed first. Returns the number
    /// of rows inserted.
    pub fn import_ndjson(&self, table: &str, path: &Path) -> Result<usize> {
        check_table(table)?;

        // Keep the decompressed copy alive until DuckDB has read it.
        let decompressed = if is_gzip(path) {
            Some(gunzip_to_temp(path)?)
        } else {
            None
        };
        let source = decompressed
            .as_ref()
            .map(|tmp| tmp.path())
            .unwrap_or(path);

        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO {} BY NAME \
                 SELECT * FROM read_json_auto('{}', format='newline_delimited')",
                table,
                sql_path(source)
            ),
            [],
        )?;
        info!(table, rows = inserted, path = %path.display(), "imported NDJSON");
        Ok(inserted)
    }

    /// Import every `<table>.ndjson` or `<table>.ndjson.gz` found in `dir`.
    ///
    /// Tables are loaded in dependency order (cities, commodities, markets,
    /// price records); absent files are skipped. Returns the total rows inserted.
    pub fn import_snapshot_dir(&self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(MonitorError::NotFound(format!(
                "Snapshot directory {}",
                dir.display()
            )));
        }

        let mut total = 0;
        for table in config::IMPORT_TABLES {
            let plain = dir.join(format!("{}.ndjson", table));
            let gzipped = dir.join(format!("{}.ndjson.gz", table));
            if plain.exists() {
                total += self.import_ndjson(table, &plain)?;
            } else if gzipped.exists() {
                total += self.import_ndjson(table, &gzipped)?;
            } else {
                debug!(table, dir = %dir.display(), "no snapshot file for table");
            }
        }
        Ok(total)
    }

    /// Number of rows currently stored in one of the schema tables.
    pub fn row_count(&self, table: &str) -> Result<i64> {
        check_table(table)?;
        let count = self.execute_scalar(&format!("SELECT COUNT(*) FROM {}", table), &[])?;
        Ok(count.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

impl PriceStore for Connection {
    fn query_observations(&self, filter: &ObservationFilter) -> Result<Vec<PriceObservation>> {
        let mut qb = SqlBuilder::new(config::OBSERVATIONS_VIEW);
        qb.select(&OBSERVATION_COLUMNS);

        if let Some(id) = filter.commodity_id {
            qb.where_eq("commodity_id", id);
        }
        if let Some(id) = filter.market_id {
            qb.where_eq("market_id", id);
        }
        if let Some(city) = &filter.city_name {
            qb.where_eq("city_name", city.as_str());
        }
        if let Some(from) = filter.date_from {
            qb.where_gte("recorded_date", from);
        }
        if let Some(to) = filter.date_to {
            qb.where_lte("recorded_date", to);
        }
        qb.order_by(&["recorded_date ASC", "market_id ASC"]);

        let (sql, params) = qb.build();
        let observations: Vec<PriceObservation> = self.execute_into(&sql, &params)?;
        debug!(rows = observations.len(), ?filter, "fetched price observations");
        Ok(observations)
    }

    fn commodity_exists(&self, commodity_id: i64) -> Result<bool> {
        let (sql, params) = SqlBuilder::new("commodities")
            .select(&["COUNT(*)"])
            .where_eq("id", commodity_id)
            .build();
        let count = self.execute_scalar(&sql, &params)?;
        Ok(count.and_then(|v| v.as_i64()).unwrap_or(0) > 0)
    }

    fn commodity_name(&self, commodity_id: i64) -> Result<String> {
        let (sql, params) = SqlBuilder::new("commodities")
            .select(&["name"])
            .where_eq("id", commodity_id)
            .limit(1)
            .build();
        match self.execute_scalar(&sql, &params)? {
            Some(serde_json::Value::String(name)) => Ok(name),
            _ => Err(MonitorError::NotFound(format!(
                "Commodity with id {}",
                commodity_id
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject table names outside the schema before they reach SQL text.
fn check_table(table: &str) -> Result<()> {
    if config::IMPORT_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(MonitorError::InvalidArgument(format!(
            "Unknown table '{}'; expected one of {}",
            table,
            config::IMPORT_TABLES.join(", ")
        )))
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

/// Decompress a gzip file into a temporary file DuckDB can scan.
fn gunzip_to_temp(path: &Path) -> Result<tempfile::NamedTempFile> {
    let mut decoder = GzDecoder::new(BufReader::new(fs::File::open(path)?));
    let mut tmp = tempfile::NamedTempFile::new()?;
    io::copy(&mut decoder, &mut tmp)?;
    tmp.flush()?;
    Ok(tmp)
}

/// Render a filesystem path as a single-quoted DuckDB string body.
fn sql_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace('\'', "''")
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // COUNT(*) and SUM over integers may come back as HUGEINT
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        // Prices stay exact: a string deserializes losslessly into `Decimal`.
        ValueRef::Decimal(d) => serde_json::Value::String(d.to_string()),
        ValueRef::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|d| serde_json::Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        _ => serde_json::Value::Null,
    }
}
