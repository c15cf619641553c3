//! SQL builder with typed, parameterized query construction.
//!
//! Every filter value is bound through DuckDB's `?` placeholders as a
//! [`SqlParam`], never interpolated into the SQL text. Builder methods return
//! `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use commodity_monitor::SqlBuilder;
//!
//! let (sql, params) = SqlBuilder::new("price_observations")
//!     .where_eq("commodity_id", 7_i64)
//!     .where_gte("recorded_date", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
//!     .order_by(&["recorded_date ASC"])
//!     .build();
//! assert_eq!(params.len(), 2);
//! assert!(sql.contains("recorded_date >= CAST(? AS DATE)"));
//! ```

use chrono::NaiveDate;
use duckdb::types::{ToSql, ToSqlOutput, Value};

// ---------------------------------------------------------------------------
// SqlParam
// ---------------------------------------------------------------------------

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    /// Bound as ISO-8601 text and cast to `DATE` in the generated SQL.
    Date(NaiveDate),
}

impl SqlParam {
    /// Placeholder expression for this parameter.
    fn placeholder(&self) -> &'static str {
        match self {
            SqlParam::Date(_) => "CAST(? AS DATE)",
            _ => "?",
        }
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            SqlParam::Int(v) => Value::BigInt(*v),
            SqlParam::Text(s) => Value::Text(s.clone()),
            SqlParam::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

// ---------------------------------------------------------------------------
// SqlBuilder
// ---------------------------------------------------------------------------

/// Builds parameterized `SELECT` statements against one table or view.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<SqlParam>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table or view.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.push_condition(column, "=", value.into())
    }

    /// Add a greater-than-or-equal condition: `{column} >= ?`.
    pub fn where_gte(&mut self, column: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.push_condition(column, ">=", value.into())
    }

    /// Add a less-than-or-equal condition: `{column} <= ?`.
    pub fn where_lte(&mut self, column: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.push_condition(column, "<=", value.into())
    }

    /// Add ORDER BY clauses (e.g. `"recorded_date ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    ///
    /// Returns a tuple of `(sql_string, params_list)` ready for execution.
    pub fn build(&self) -> (String, Vec<SqlParam>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }

    fn push_condition(&mut self, column: &str, op: &str, param: SqlParam) -> &mut Self {
        self.where_clauses
            .push(format!("{} {} {}", column, op, param.placeholder()));
        self.params.push(param);
        self
    }
}
