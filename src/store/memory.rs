use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{MonitorError, Result};
use crate::models::{ObservationFilter, PriceObservation};
use crate::store::PriceStore;

/// A [`PriceStore`] held entirely in memory.
///
/// Useful for embedding the engine without a database and for tests.
/// Observations are returned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceStore {
    commodities: BTreeMap<i64, String>,
    observations: Vec<PriceObservation>,
}

impl InMemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or rename) a commodity. Commodities may exist without observations.
    pub fn add_commodity(&mut self, commodity_id: i64, name: impl Into<String>) -> &mut Self {
        self.commodities.insert(commodity_id, name.into());
        self
    }

    /// Record a price for a registered commodity.
    ///
    /// The commodity name is taken from the registry so observations can
    /// never disagree with it.
    pub fn record(
        &mut self,
        commodity_id: i64,
        market_id: i64,
        city_name: impl Into<String>,
        price: Decimal,
        recorded_date: NaiveDate,
    ) -> Result<&mut Self> {
        let commodity_name = self.commodity_name(commodity_id)?;
        self.observations.push(PriceObservation {
            commodity_id,
            commodity_name,
            market_id,
            city_name: city_name.into(),
            price,
            recorded_date,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl PriceStore for InMemoryPriceStore {
    fn query_observations(&self, filter: &ObservationFilter) -> Result<Vec<PriceObservation>> {
        Ok(self
            .observations
            .iter()
            .filter(|obs| filter.matches(obs))
            .cloned()
            .collect())
    }

    fn commodity_exists(&self, commodity_id: i64) -> Result<bool> {
        Ok(self.commodities.contains_key(&commodity_id))
    }

    fn commodity_name(&self, commodity_id: i64) -> Result<String> {
        self.commodities
            .get(&commodity_id)
            .cloned()
            .ok_or_else(|| MonitorError::NotFound(format!("Commodity with id {}", commodity_id)))
    }
}
