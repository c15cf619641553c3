use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceObservation -- one recorded price (query result)
// ---------------------------------------------------------------------------

/// One recorded price for a commodity at a market on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PriceObservation {
    pub commodity_id: i64,
    pub commodity_name: String,
    pub market_id: i64,
    pub city_name: String,
    pub price: Decimal,
    pub recorded_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// ObservationFilter -- optional predicates pushed down to the store
// ---------------------------------------------------------------------------

/// Predicates for [`PriceStore::query_observations`](crate::store::PriceStore::query_observations).
///
/// Unset fields match everything. Both date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    pub commodity_id: Option<i64>,
    pub market_id: Option<i64>,
    pub city_name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ObservationFilter {
    /// A filter matching every observation.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter matching every observation of one commodity.
    pub fn commodity(commodity_id: i64) -> Self {
        Self {
            commodity_id: Some(commodity_id),
            ..Self::default()
        }
    }

    pub fn market(mut self, market_id: i64) -> Self {
        self.market_id = Some(market_id);
        self
    }

    pub fn city(mut self, city_name: impl Into<String>) -> Self {
        self.city_name = Some(city_name.into());
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Whether `obs` satisfies every set predicate.
    pub fn matches(&self, obs: &PriceObservation) -> bool {
        self.commodity_id.map_or(true, |id| obs.commodity_id == id)
            && self.market_id.map_or(true, |id| obs.market_id == id)
            && self
                .city_name
                .as_deref()
                .map_or(true, |city| obs.city_name == city)
            && self.date_from.map_or(true, |from| obs.recorded_date >= from)
            && self.date_to.map_or(true, |to| obs.recorded_date <= to)
    }
}
