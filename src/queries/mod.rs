//! Query modules for the commodity monitor.
//!
//! Each module provides a query struct that borrows a
//! [`PriceStore`](crate::store::PriceStore) and exposes methods returning
//! `Result<T>` with typed models.

pub mod analytics;
pub mod observations;

pub use analytics::AnalyticsQuery;
pub use observations::ObservationQuery;
