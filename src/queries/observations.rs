//! Read-only price history lookups against any [`PriceStore`].

use chrono::NaiveDate;

use crate::error::{MonitorError, Result};
use crate::models::{ObservationFilter, PriceObservation};
use crate::store::PriceStore;

/// Query interface for raw price observations, newest first.
pub struct ObservationQuery<'a, S: PriceStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PriceStore + ?Sized> ObservationQuery<'a, S> {
    /// Create a new `ObservationQuery` bound to the given store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every observation of a commodity. `NotFound` if the commodity is unknown.
    pub fn for_commodity(&self, commodity_id: i64) -> Result<Vec<PriceObservation>> {
        self.require_commodity(commodity_id)?;
        self.fetch(&ObservationFilter::commodity(commodity_id))
    }

    /// Every observation recorded at one market.
    pub fn for_market(&self, market_id: i64) -> Result<Vec<PriceObservation>> {
        self.fetch(&ObservationFilter::all().market(market_id))
    }

    /// Every observation recorded in one city.
    pub fn for_city(&self, city_name: &str) -> Result<Vec<PriceObservation>> {
        self.fetch(&ObservationFilter::all().city(city_name))
    }

    /// Observations of a commodity recorded between `from` and `to`, inclusive.
    pub fn between(
        &self,
        commodity_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        if from > to {
            return Err(MonitorError::InvalidArgument(format!(
                "date range starts after it ends: {} > {}",
                from, to
            )));
        }
        self.require_commodity(commodity_id)?;
        self.fetch(
            &ObservationFilter::commodity(commodity_id)
                .date_from(from)
                .date_to(to),
        )
    }

    /// The most recent observation of a commodity, if any.
    pub fn latest(&self, commodity_id: i64) -> Result<Option<PriceObservation>> {
        Ok(self.for_commodity(commodity_id)?.into_iter().next())
    }

    fn require_commodity(&self, commodity_id: i64) -> Result<()> {
        if self.store.commodity_exists(commodity_id)? {
            Ok(())
        } else {
            Err(MonitorError::NotFound(format!(
                "Commodity with id {}",
                commodity_id
            )))
        }
    }

    fn fetch(&self, filter: &ObservationFilter) -> Result<Vec<PriceObservation>> {
        let mut rows = self.store.query_observations(filter)?;
        rows.sort_by(|a, b| {
            b.recorded_date
                .cmp(&a.recorded_date)
                .then_with(|| a.market_id.cmp(&b.market_id))
        });
        Ok(rows)
    }
}
