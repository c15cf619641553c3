//! Aggregation and rounding helpers shared by the analytics queries.
//!
//! Monetary arithmetic stays in [`Decimal`] so averages are exact before
//! rounding. Dispersion is computed in `f64` via `statrs`, the same way a
//! SQL `STDDEV` aggregate reports it.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use statrs::statistics::Statistics;

use crate::config;
use crate::error::{MonitorError, Result};
use crate::models::{MonthBucket, PriceObservation};

/// Round half-up (ties away from zero) to exactly `dp` decimal places.
///
/// The result always carries `dp` fractional digits, so `110` becomes `110.00`.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Round a monetary value to [`config::MONEY_SCALE`] places.
pub fn round_money(value: Decimal) -> Decimal {
    round_half_up(value, config::MONEY_SCALE)
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Sample standard deviation (divides by `N - 1`).
///
/// Undefined for fewer than two values; that case is reported as `0.0`.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let std_dev = values.std_dev();
    if std_dev.is_finite() {
        std_dev
    } else {
        0.0
    }
}

/// Percent change from `last` to `current`.
///
/// The ratio `(current - last) / last` is rounded half-up to
/// [`config::RATIO_SCALE`] places, multiplied by 100 and rounded to
/// [`config::MONEY_SCALE`] places. A zero base is rejected.
pub fn percent_change(current: Decimal, last: Decimal) -> Result<Decimal> {
    if last.is_zero() {
        return Err(MonitorError::DegenerateInput(
            "percent change against a zero base price".to_string(),
        ));
    }
    let ratio = round_half_up((current - last) / last, config::RATIO_SCALE);
    Ok(round_money(ratio * Decimal::ONE_HUNDRED))
}

/// Unrounded mean price per populated month, in chronological order.
pub fn monthly_means(observations: &[PriceObservation]) -> BTreeMap<MonthBucket, Decimal> {
    let mut buckets: BTreeMap<MonthBucket, Vec<Decimal>> = BTreeMap::new();
    for obs in observations {
        buckets
            .entry(MonthBucket::of(obs.recorded_date))
            .or_default()
            .push(obs.price);
    }
    buckets
        .into_iter()
        .filter_map(|(month, prices)| mean(&prices).map(|avg| (month, avg)))
        .collect()
}

/// Lossy conversion used where a statistic is defined over floats.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
