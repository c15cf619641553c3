//! The read interface the analytics engine consumes.
//!
//! A [`PriceStore`] owns commodities and their price observations. The
//! engine only ever reads through it: it filters observations and resolves
//! commodity names, while all aggregation happens on the engine side.
//!
//! Two implementations ship with the crate: [`InMemoryPriceStore`] and the
//! DuckDB-backed [`Connection`](crate::connection::Connection).

pub mod memory;

pub use memory::InMemoryPriceStore;

use crate::error::Result;
use crate::models::{ObservationFilter, PriceObservation};

pub trait PriceStore {
    /// Observations matching `filter`, in no particular order.
    fn query_observations(&self, filter: &ObservationFilter) -> Result<Vec<PriceObservation>>;

    fn commodity_exists(&self, commodity_id: i64) -> Result<bool>;

    /// Display name of a commodity; `NotFound` if the identifier is unknown.
    fn commodity_name(&self, commodity_id: i64) -> Result<String>;
}
