//! Analytics engine tests against the in-memory price store.

mod common;

use common::{date, today};
use commodity_monitor::models::{MonthBucket, PriceDirection, VolatilityLevel};
use commodity_monitor::queries::AnalyticsQuery;
use commodity_monitor::{InMemoryPriceStore, MonitorError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A store with commodity 1 "Maize" and the given `(price, date)` rows,
/// all recorded in Accra at market 1.
fn maize_store(rows: &[(Decimal, (i32, u32, u32))]) -> InMemoryPriceStore {
    let mut store = InMemoryPriceStore::new();
    store.add_commodity(1, "Maize");
    for (price, (y, m, d)) in rows {
        store.record(1, 1, "Accra", *price, date(*y, *m, *d)).unwrap();
    }
    store
}

// ---------------------------------------------------------------------------
// monthly_trend
// ---------------------------------------------------------------------------

#[test]
fn monthly_trend_averages_each_month_in_order() {
    let store = maize_store(&[
        (dec!(120), (2026, 10, 2)),
        (dec!(100), (2026, 9, 10)),
        (dec!(110), (2026, 9, 20)),
        (dec!(100), (2026, 10, 1)),
    ]);
    let trend = AnalyticsQuery::new(&store)
        .monthly_trend(1, 12, today())
        .unwrap();

    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].month, MonthBucket::from_ym(2026, 9).unwrap());
    assert_eq!(trend[0].avg_price.to_string(), "105.00");
    assert_eq!(trend[1].month, MonthBucket::from_ym(2026, 10).unwrap());
    assert_eq!(trend[1].avg_price.to_string(), "110.00");
    assert!(trend.iter().all(|p| p.commodity_name == "Maize"));
}

#[test]
fn monthly_trend_omits_months_without_observations() {
    let store = maize_store(&[(dec!(50), (2026, 3, 1)), (dec!(70), (2026, 6, 1))]);
    let trend = AnalyticsQuery::new(&store)
        .monthly_trend(1, 12, today())
        .unwrap();
    let months: Vec<String> = trend.iter().map(|p| p.month.to_string()).collect();
    assert_eq!(months, vec!["2026-03", "2026-06"]);
}

#[test]
fn monthly_trend_window_starts_mid_month() {
    // 12 months before 2026-10-19 is 2025-10-19; the 18th falls outside.
    let store = maize_store(&[
        (dec!(10), (2025, 10, 18)),
        (dec!(30), (2025, 10, 19)),
        (dec!(40), (2025, 10, 31)),
    ]);
    let trend = AnalyticsQuery::new(&store)
        .monthly_trend(1, 12, today())
        .unwrap();
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0].month.to_string(), "2025-10");
    assert_eq!(trend[0].avg_price, dec!(35.00));
}

#[test]
fn monthly_trend_empty_when_nothing_recent() {
    let store = maize_store(&[(dec!(10), (2026, 8, 1))]);
    let trend = AnalyticsQuery::new(&store)
        .monthly_trend(1, 1, today())
        .unwrap();
    assert!(trend.is_empty());
}

#[test]
fn monthly_trend_rejects_zero_months() {
    let store = maize_store(&[]);
    let err = AnalyticsQuery::new(&store)
        .monthly_trend(1, 0, today())
        .unwrap_err();
    assert!(matches!(err, MonitorError::InvalidArgument(_)));
}

#[test]
fn monthly_trend_unknown_commodity_is_not_found() {
    let store = maize_store(&[]);
    let err = AnalyticsQuery::new(&store)
        .monthly_trend(99, 12, today())
        .unwrap_err();
    assert!(matches!(err, MonitorError::NotFound(_)));
}

#[test]
fn averages_round_half_up() {
    // mean = 100.005
    let store = maize_store(&[(dec!(100.00), (2026, 10, 1)), (dec!(100.01), (2026, 10, 2))]);
    let trend = AnalyticsQuery::new(&store)
        .monthly_trend(1, 12, today())
        .unwrap();
    assert_eq!(trend[0].avg_price.to_string(), "100.01");
}

// ---------------------------------------------------------------------------
// city_comparison
// ---------------------------------------------------------------------------

#[test]
fn city_comparison_orders_by_average_descending() {
    let mut store = InMemoryPriceStore::new();
    store.add_commodity(1, "Maize");
    store
        .record(1, 1, "Accra", dec!(100), date(2026, 1, 1))
        .unwrap()
        .record(1, 2, "Kumasi", dec!(130), date(2026, 1, 1))
        .unwrap()
        .record(1, 4, "Accra", dec!(120), date(2026, 2, 1))
        .unwrap();

    let cities = AnalyticsQuery::new(&store).city_comparison(1).unwrap();
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].city_name, "Kumasi");
    assert_eq!(cities[0].avg_price, dec!(130.00));
    assert_eq!(cities[1].city_name, "Accra");
    assert_eq!(cities[1].avg_price.to_string(), "110.00");
}

#[test]
fn city_comparison_breaks_ties_by_city_name() {
    let mut store = InMemoryPriceStore::new();
    store.add_commodity(1, "Maize");
    store
        .record(1, 2, "Beta", dec!(150), date(2026, 1, 1))
        .unwrap()
        .record(1, 1, "Alpha", dec!(100), date(2026, 1, 1))
        .unwrap()
        .record(1, 1, "Alpha", dec!(200), date(2026, 1, 2))
        .unwrap();

    let cities = AnalyticsQuery::new(&store).city_comparison(1).unwrap();
    let names: Vec<&str> = cities.iter().map(|c| c.city_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[test]
fn city_comparison_empty_without_observations() {
    let store = maize_store(&[]);
    assert!(AnalyticsQuery::new(&store)
        .city_comparison(1)
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// volatility
// ---------------------------------------------------------------------------

#[test]
fn volatility_of_constant_prices_is_low() {
    let store = maize_store(&[
        (dec!(10), (2026, 1, 1)),
        (dec!(10), (2026, 2, 1)),
        (dec!(10), (2026, 3, 1)),
    ]);
    let ratings = AnalyticsQuery::new(&store).volatility().unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].std_dev_price, 0.0);
    assert_eq!(ratings[0].interpretation, VolatilityLevel::Low);
}

#[test]
fn volatility_of_single_observation_is_zero() {
    let store = maize_store(&[(dec!(75), (2026, 1, 1))]);
    let ratings = AnalyticsQuery::new(&store).volatility().unwrap();
    assert_eq!(ratings[0].std_dev_price, 0.0);
    assert_eq!(ratings[0].interpretation, VolatilityLevel::Low);
}

#[test]
fn volatility_uses_sample_deviation_and_sorts_descending() {
    let mut store = InMemoryPriceStore::new();
    store
        .add_commodity(1, "Maize")
        .add_commodity(2, "Rice")
        .add_commodity(3, "Yam");
    // Maize: [2, 4, 4, 4, 5, 5, 7, 9] -> sample sd ~2.138
    for p in [2, 4, 4, 4, 5, 5, 7, 9] {
        store
            .record(1, 1, "Accra", Decimal::from(p), date(2026, 1, 1))
            .unwrap();
    }
    // Rice: [100, 150] -> sample sd ~35.36
    store
        .record(2, 1, "Accra", dec!(100), date(2026, 1, 1))
        .unwrap()
        .record(2, 1, "Accra", dec!(150), date(2026, 2, 1))
        .unwrap();

    let ratings = AnalyticsQuery::new(&store).volatility().unwrap();
    assert_eq!(ratings.len(), 2, "commodities without observations are omitted");
    assert_eq!(ratings[0].commodity_name, "Rice");
    assert!((ratings[0].std_dev_price - 35.355_339).abs() < 1e-4);
    assert_eq!(ratings[0].interpretation, VolatilityLevel::High);
    assert_eq!(ratings[1].commodity_name, "Maize");
    assert!((ratings[1].std_dev_price - 2.138_090).abs() < 1e-4);
    assert_eq!(ratings[1].interpretation, VolatilityLevel::Low);
}

#[test]
fn volatility_empty_store_is_empty() {
    let store = InMemoryPriceStore::new();
    assert!(AnalyticsQuery::new(&store).volatility().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// inflation_trend
// ---------------------------------------------------------------------------

#[test]
fn inflation_trend_up() {
    let store = maize_store(&[(dec!(100), (2026, 9, 15)), (dec!(110), (2026, 10, 2))]);
    let trend = AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap()
        .unwrap();
    assert_eq!(trend.current_month_avg.to_string(), "110.00");
    assert_eq!(trend.last_month_avg.to_string(), "100.00");
    assert_eq!(trend.percent_change.to_string(), "10.00");
    assert_eq!(trend.direction, PriceDirection::Up);
}

#[test]
fn inflation_trend_down() {
    let store = maize_store(&[(dec!(100), (2026, 9, 15)), (dec!(90), (2026, 10, 2))]);
    let trend = AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap()
        .unwrap();
    assert_eq!(trend.percent_change, dec!(-10.00));
    assert_eq!(trend.direction, PriceDirection::Down);
}

#[test]
fn inflation_trend_small_change_is_stable() {
    let store = maize_store(&[(dec!(100), (2026, 9, 15)), (dec!(100.5), (2026, 10, 2))]);
    let trend = AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap()
        .unwrap();
    assert_eq!(trend.percent_change.to_string(), "0.50");
    assert_eq!(trend.direction, PriceDirection::Stable);
}

#[test]
fn inflation_trend_rounds_ratio_before_scaling() {
    // ratio 0.00005 rounds to 0.0001, so the change reads 0.01%
    let store = maize_store(&[(dec!(200), (2026, 9, 15)), (dec!(200.01), (2026, 10, 2))]);
    let trend = AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap()
        .unwrap();
    assert_eq!(trend.percent_change.to_string(), "0.01");
    assert_eq!(trend.direction, PriceDirection::Stable);
}

#[test]
fn inflation_trend_absent_when_a_month_is_empty() {
    let store = maize_store(&[(dec!(100), (2026, 8, 15)), (dec!(110), (2026, 10, 2))]);
    assert!(AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap()
        .is_none());

    let store = maize_store(&[(dec!(100), (2026, 9, 15))]);
    assert!(AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap()
        .is_none());
}

#[test]
fn inflation_trend_rejects_zero_base() {
    let store = maize_store(&[(dec!(0), (2026, 9, 15)), (dec!(10), (2026, 10, 2))]);
    let err = AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap_err();
    assert!(matches!(err, MonitorError::DegenerateInput(_)));
}

#[test]
fn inflation_trend_unknown_commodity_is_not_found() {
    let store = InMemoryPriceStore::new();
    let err = AnalyticsQuery::new(&store)
        .inflation_trend(1, today())
        .unwrap_err();
    assert!(matches!(err, MonitorError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// moving_average_forecast
// ---------------------------------------------------------------------------

#[test]
fn forecast_averages_three_latest_months() {
    let store = maize_store(&[
        (dec!(500), (2025, 12, 1)),
        (dec!(100), (2026, 7, 1)),
        (dec!(110), (2026, 8, 1)),
        (dec!(120), (2026, 9, 1)),
    ]);
    let forecast = AnalyticsQuery::new(&store)
        .moving_average_forecast(1, today())
        .unwrap()
        .unwrap();
    assert_eq!(forecast.forecast_price.to_string(), "110.00");
    assert_eq!(forecast.forecast_month, MonthBucket::from_ym(2026, 11).unwrap());
    assert_eq!(forecast.based_on_months, 3);
}

#[test]
fn forecast_counts_populated_months_not_calendar_months() {
    let store = maize_store(&[
        (dec!(100), (2026, 1, 1)),
        (dec!(110), (2026, 5, 1)),
        (dec!(121), (2026, 10, 1)),
    ]);
    let forecast = AnalyticsQuery::new(&store)
        .moving_average_forecast(1, today())
        .unwrap()
        .unwrap();
    assert_eq!(forecast.forecast_price.to_string(), "110.33");
}

#[test]
fn forecast_needs_three_months() {
    let store = maize_store(&[(dec!(100), (2026, 8, 1)), (dec!(110), (2026, 9, 1))]);
    assert!(AnalyticsQuery::new(&store)
        .moving_average_forecast(1, today())
        .unwrap()
        .is_none());
}

#[test]
fn forecast_rolls_into_next_year() {
    let store = maize_store(&[
        (dec!(10), (2026, 10, 1)),
        (dec!(20), (2026, 11, 1)),
        (dec!(30), (2026, 12, 1)),
    ]);
    let forecast = AnalyticsQuery::new(&store)
        .moving_average_forecast(1, date(2026, 12, 31))
        .unwrap()
        .unwrap();
    assert_eq!(forecast.forecast_month.to_string(), "2027-01");
    assert_eq!(forecast.forecast_price, dec!(20.00));
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn repeated_calls_return_identical_results() {
    let store = maize_store(&[
        (dec!(100), (2026, 7, 1)),
        (dec!(110), (2026, 8, 1)),
        (dec!(120), (2026, 9, 1)),
        (dec!(125), (2026, 10, 1)),
    ]);
    let analytics = AnalyticsQuery::new(&store);
    assert_eq!(
        analytics.monthly_trend(1, 12, today()).unwrap(),
        analytics.monthly_trend(1, 12, today()).unwrap()
    );
    assert_eq!(
        analytics.volatility().unwrap(),
        analytics.volatility().unwrap()
    );
    assert_eq!(
        analytics.inflation_trend(1, today()).unwrap(),
        analytics.inflation_trend(1, today()).unwrap()
    );
    assert_eq!(
        analytics.moving_average_forecast(1, today()).unwrap(),
        analytics.moving_average_forecast(1, today()).unwrap()
    );
}
