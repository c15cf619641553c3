use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::MonthBucket;

// ---------------------------------------------------------------------------
// MonthlyTrendPoint -- average price of one populated month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthlyTrendPoint {
    pub commodity_id: i64,
    pub commodity_name: String,
    pub month: MonthBucket,
    pub avg_price: Decimal,
}

// ---------------------------------------------------------------------------
// CityComparisonPoint -- all-time average price in one city
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CityComparisonPoint {
    pub city_name: String,
    pub commodity_name: String,
    pub avg_price: Decimal,
}

// ---------------------------------------------------------------------------
// VolatilityRating -- price dispersion of one commodity
// ---------------------------------------------------------------------------

/// Dispersion class of a commodity's sample standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    /// `< 5` is LOW, `5..=20` is MEDIUM, `> 20` is HIGH.
    pub fn classify(std_dev: f64) -> Self {
        if std_dev < config::VOLATILITY_LOW_CEILING {
            VolatilityLevel::Low
        } else if std_dev <= config::VOLATILITY_HIGH_FLOOR {
            VolatilityLevel::Medium
        } else {
            VolatilityLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityLevel::Low => "LOW",
            VolatilityLevel::Medium => "MEDIUM",
            VolatilityLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VolatilityRating {
    pub commodity_id: i64,
    pub commodity_name: String,
    pub std_dev_price: f64,
    pub interpretation: VolatilityLevel,
}

// ---------------------------------------------------------------------------
// InflationTrend -- current month against the month before
// ---------------------------------------------------------------------------

/// Direction of a month-over-month percent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceDirection {
    Up,
    Down,
    Stable,
}

impl PriceDirection {
    /// `> 1` is UP, `< -1` is DOWN, anything in between is STABLE.
    pub fn classify(percent_change: Decimal) -> Self {
        if percent_change > config::INFLATION_BAND_PCT {
            PriceDirection::Up
        } else if percent_change < -config::INFLATION_BAND_PCT {
            PriceDirection::Down
        } else {
            PriceDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceDirection::Up => "UP",
            PriceDirection::Down => "DOWN",
            PriceDirection::Stable => "STABLE",
        }
    }
}

impl fmt::Display for PriceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InflationTrend {
    pub commodity_id: i64,
    pub commodity_name: String,
    pub current_month_avg: Decimal,
    pub last_month_avg: Decimal,
    pub percent_change: Decimal,
    pub direction: PriceDirection,
}

// ---------------------------------------------------------------------------
// MovingAverageForecast -- next month's predicted price
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MovingAverageForecast {
    pub commodity_id: i64,
    pub commodity_name: String,
    pub forecast_month: MonthBucket,
    pub forecast_price: Decimal,
    pub based_on_months: usize,
}
