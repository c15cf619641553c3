//! The analytics engine: five derived views over a commodity's price history.
//!
//! Every operation pulls one filtered snapshot of observations from the
//! [`PriceStore`] and aggregates it in process. Operations that depend on the
//! current date take it as an explicit `today` argument; nothing here reads a
//! clock.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{MonitorError, Result};
use crate::models::{
    CityComparisonPoint, InflationTrend, MonthBucket, MonthlyTrendPoint, MovingAverageForecast,
    ObservationFilter, PriceDirection, VolatilityLevel, VolatilityRating,
};
use crate::stats;
use crate::store::PriceStore;

// ---------------------------------------------------------------------------
// AnalyticsQuery
// ---------------------------------------------------------------------------

/// Query interface for derived price analytics, borrowing a [`PriceStore`].
pub struct AnalyticsQuery<'a, S: PriceStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PriceStore + ?Sized> AnalyticsQuery<'a, S> {
    /// Create a new `AnalyticsQuery` bound to the given store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Average price per calendar month over a trailing window.
    ///
    /// Considers observations recorded on or after `today` minus `months`
    /// calendar months. Months without observations are omitted, not
    /// zero-filled. Points are ordered by ascending month.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `months` is zero, `NotFound` if the commodity
    /// does not exist.
    pub fn monthly_trend(
        &self,
        commodity_id: i64,
        months: u32,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyTrendPoint>> {
        info!(commodity_id, months, %today, "calculating monthly price trend");
        if months == 0 {
            return Err(MonitorError::InvalidArgument(
                "trend window must span at least one month".to_string(),
            ));
        }
        let commodity_name = self.require_commodity(commodity_id)?;

        let since = today.checked_sub_months(Months::new(months)).ok_or_else(|| {
            MonitorError::InvalidArgument(format!(
                "{} months before {} is out of range",
                months, today
            ))
        })?;
        let observations = self
            .store
            .query_observations(&ObservationFilter::commodity(commodity_id).date_from(since))?;

        Ok(stats::monthly_means(&observations)
            .into_iter()
            .map(|(month, avg)| MonthlyTrendPoint {
                commodity_id,
                commodity_name: commodity_name.clone(),
                month,
                avg_price: stats::round_money(avg),
            })
            .collect())
    }

    /// All-time average price of a commodity in each city that recorded it.
    ///
    /// Ordered by descending average; equal averages fall back to city name.
    pub fn city_comparison(&self, commodity_id: i64) -> Result<Vec<CityComparisonPoint>> {
        info!(commodity_id, "comparing city prices");
        let commodity_name = self.require_commodity(commodity_id)?;

        let observations = self
            .store
            .query_observations(&ObservationFilter::commodity(commodity_id))?;

        let mut by_city: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
        for obs in observations {
            by_city.entry(obs.city_name).or_default().push(obs.price);
        }

        // BTreeMap iteration is name-ordered and the sort is stable, so ties keep that order.
        let mut averages: Vec<(String, Decimal)> = by_city
            .into_iter()
            .filter_map(|(city, prices)| stats::mean(&prices).map(|avg| (city, avg)))
            .collect();
        averages.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(averages
            .into_iter()
            .map(|(city_name, avg)| CityComparisonPoint {
                city_name,
                commodity_name: commodity_name.clone(),
                avg_price: stats::round_money(avg),
            })
            .collect())
    }

    /// Sample standard deviation and rating for every commodity with observations.
    ///
    /// A commodity with a single observation has a deviation of `0.0`.
    /// Ordered by descending deviation, then commodity name.
    pub fn volatility(&self) -> Result<Vec<VolatilityRating>> {
        info!("calculating price volatility for all commodities");
        let observations = self.store.query_observations(&ObservationFilter::all())?;

        let mut by_commodity: BTreeMap<i64, (String, Vec<f64>)> = BTreeMap::new();
        for obs in observations {
            by_commodity
                .entry(obs.commodity_id)
                .or_insert_with(|| (obs.commodity_name.clone(), Vec::new()))
                .1
                .push(stats::to_f64(obs.price));
        }

        let mut ratings: Vec<VolatilityRating> = by_commodity
            .into_iter()
            .map(|(commodity_id, (commodity_name, prices))| {
                let std_dev = stats::sample_std_dev(&prices);
                VolatilityRating {
                    commodity_id,
                    commodity_name,
                    std_dev_price: std_dev,
                    interpretation: VolatilityLevel::classify(std_dev),
                }
            })
            .collect();
        ratings.sort_by(|a, b| {
            b.std_dev_price
                .total_cmp(&a.std_dev_price)
                .then_with(|| a.commodity_name.cmp(&b.commodity_name))
                .then_with(|| a.commodity_id.cmp(&b.commodity_id))
        });
        Ok(ratings)
    }

    /// Compare this month's average price with last month's.
    ///
    /// Returns `Ok(None)` when either month has no observations.
    ///
    /// # Errors
    ///
    /// `NotFound` if the commodity does not exist, `DegenerateInput` if last
    /// month's average is zero.
    pub fn inflation_trend(
        &self,
        commodity_id: i64,
        today: NaiveDate,
    ) -> Result<Option<InflationTrend>> {
        info!(commodity_id, %today, "calculating inflation trend");
        let commodity_name = self.require_commodity(commodity_id)?;

        let current_month = MonthBucket::of(today);
        let last_month = current_month.previous();
        let observations = self.store.query_observations(
            &ObservationFilter::commodity(commodity_id)
                .date_from(last_month.first_day())
                .date_to(current_month.last_day()),
        )?;

        let means = stats::monthly_means(&observations);
        let (current, last) = match (means.get(&current_month), means.get(&last_month)) {
            (Some(current), Some(last)) => (*current, *last),
            _ => {
                debug!(
                    commodity_id,
                    current = %current_month,
                    last = %last_month,
                    "month bucket empty; no inflation trend"
                );
                return Ok(None);
            }
        };

        let percent_change = stats::percent_change(current, last)?;
        Ok(Some(InflationTrend {
            commodity_id,
            commodity_name,
            current_month_avg: stats::round_money(current),
            last_month_avg: stats::round_money(last),
            percent_change,
            direction: PriceDirection::classify(percent_change),
        }))
    }

    /// Forecast next month's price as the mean of the three most recent
    /// populated monthly averages.
    ///
    /// Returns `Ok(None)` when fewer than three months have observations.
    pub fn moving_average_forecast(
        &self,
        commodity_id: i64,
        today: NaiveDate,
    ) -> Result<Option<MovingAverageForecast>> {
        info!(commodity_id, %today, "calculating moving average forecast");
        let commodity_name = self.require_commodity(commodity_id)?;

        let observations = self
            .store
            .query_observations(&ObservationFilter::commodity(commodity_id))?;
        let recent: Vec<Decimal> = stats::monthly_means(&observations)
            .into_values()
            .rev()
            .take(config::FORECAST_WINDOW_MONTHS)
            .collect();

        if recent.len() < config::FORECAST_WINDOW_MONTHS {
            warn!(
                commodity_id,
                populated_months = recent.len(),
                "not enough monthly history for a moving average forecast"
            );
            return Ok(None);
        }

        let sum: Decimal = recent.iter().sum();
        Ok(Some(MovingAverageForecast {
            commodity_id,
            commodity_name,
            forecast_month: MonthBucket::of(today).next(),
            forecast_price: stats::round_money(
                sum / Decimal::from(config::FORECAST_WINDOW_MONTHS),
            ),
            based_on_months: config::FORECAST_WINDOW_MONTHS,
        }))
    }

    /// Resolve a commodity's name, failing with `NotFound` before any computation.
    fn require_commodity(&self, commodity_id: i64) -> Result<String> {
        if !self.store.commodity_exists(commodity_id)? {
            return Err(MonitorError::NotFound(format!(
                "Commodity with id {}",
                commodity_id
            )));
        }
        self.store.commodity_name(commodity_id)
    }
}
