//! Signal engine and performance evaluator integration tests.
//!
//! Tests cover:
//! - Graded scores under the default strategy (scores 3, 2, 1, 0)
//! - Cash residual and weight conservation
//! - Effective date resolution, no-data and short-history failures
//! - Upper band strictness
//! - Weight decomposition, conservation and monotonicity properties
//! - CAGR and drawdown over replayed returns

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use trendband::domain::error::TrendbandError;
use trendband::domain::metrics::{compute_cagr, compute_max_drawdown, PerformanceSummary};
use trendband::domain::price_table::PriceTable;
use trendband::domain::replay::replay;
use trendband::domain::signal::{compute_allocation, CASH};
use trendband::domain::strategy::{Asset, BandParams, ScoreMap, StrategyConfig};

mod allocation {
    use super::*;

    #[test]
    fn graded_scores_map_to_weights() {
        let (config, dates, table) = graded_fixture();
        let alloc = compute_allocation(&table, *dates.last().unwrap(), &config).unwrap();

        let scores: Vec<usize> = alloc.signals.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![3, 2, 1, 0, 0]);

        assert_relative_eq!(alloc.signals[0].weight, 0.20, epsilon = 1e-12);
        assert_relative_eq!(alloc.signals[1].weight, 0.15, epsilon = 1e-12);
        assert_relative_eq!(alloc.signals[2].weight, 0.10, epsilon = 1e-12);
        assert_eq!(alloc.signals[3].weight, 0.0);
        assert_eq!(alloc.signals[4].weight, 0.0);
        assert_relative_eq!(alloc.cash, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn exceeding_ticker_gets_full_weight_and_lagging_ticker_none() {
        let (config, dates, table) = graded_fixture();
        let alloc = compute_allocation(&table, *dates.last().unwrap(), &config).unwrap();

        assert_relative_eq!(alloc.weight_of("102110.KS").unwrap(), 0.20, epsilon = 1e-12);
        assert_eq!(alloc.weight_of("148070.KS"), Some(0.0));
    }

    #[test]
    fn weights_include_cash_entry() {
        let (config, dates, table) = graded_fixture();
        let alloc = compute_allocation(&table, *dates.last().unwrap(), &config).unwrap();

        let weights = alloc.weights();
        assert_eq!(weights.len(), config.assets.len() + 1);
        assert_eq!(weights.last().unwrap().0, CASH);
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn prior_return_uses_new_weights() {
        let (config, dates, table) = graded_fixture();
        let alloc = compute_allocation(&table, *dates.last().unwrap(), &config).unwrap();

        // Only the first ticker moved on the last day: 100 → 120 at 20%.
        assert_relative_eq!(alloc.prior_return, 0.04, epsilon = 1e-12);
    }

    #[test]
    fn all_flat_holds_only_cash() {
        let config = StrategyConfig::default();
        let dates = trading_days(date(2023, 1, 2), 220);
        let columns = vec![vec![100.0; 220]; 5];
        let table = make_table(&config.tickers(), &dates, &columns);

        let alloc = compute_allocation(&table, *dates.last().unwrap(), &config).unwrap();

        assert!(alloc.signals.iter().all(|s| s.weight == 0.0));
        assert_eq!(alloc.cash, 1.0);
        assert_eq!(alloc.prior_return, 0.0);
    }

    #[test]
    fn weekend_target_resolves_to_friday() {
        let (config, dates, table) = graded_fixture();
        let saturday = date(2024, 6, 15);

        let alloc = compute_allocation(&table, saturday, &config).unwrap();

        assert_eq!(alloc.target_date, saturday);
        assert_eq!(alloc.effective_date, *dates.last().unwrap());
        assert_eq!(alloc.effective_date, date(2024, 6, 14));
    }

    #[test]
    fn earlier_target_ignores_later_rows() {
        let (config, dates, table) = graded_fixture();
        // One row before the end there are only 199 rows.
        let err = compute_allocation(&table, dates[198], &config).unwrap_err();
        assert!(matches!(
            err,
            TrendbandError::InsufficientHistory {
                rows: 199,
                required: 200
            }
        ));
    }
}

mod failures {
    use super::*;

    #[test]
    fn single_row_is_insufficient_history() {
        let config = StrategyConfig::default();
        let dates = vec![date(2024, 6, 14)];
        let table = make_table(&config.tickers(), &dates, &vec![vec![100.0]; 5]);

        let err = compute_allocation(&table, date(2024, 6, 14), &config).unwrap_err();
        assert!(matches!(err, TrendbandError::InsufficientHistory { rows: 1, .. }));
    }

    #[test]
    fn weekend_target_before_history_is_no_data() {
        let config = StrategyConfig::default();
        let dates = trading_days(date(2024, 1, 8), 250);
        let table = make_table(&config.tickers(), &dates, &vec![vec![100.0; 250]; 5]);

        // Sunday before the first trading row.
        let err = compute_allocation(&table, date(2024, 1, 7), &config).unwrap_err();
        assert!(matches!(err, TrendbandError::NoData { .. }));
    }

    #[test]
    fn empty_table_is_no_data() {
        let config = StrategyConfig::default();
        let table = PriceTable::from_rows(config.tickers(), Vec::new());

        let err = compute_allocation(&table, date(2024, 6, 14), &config).unwrap_err();
        assert!(matches!(err, TrendbandError::NoData { .. }));
    }

    #[test]
    fn rows_with_gaps_are_dropped_before_counting() {
        let config = StrategyConfig::default();
        let tickers = config.tickers();
        let dates = trading_days(date(2023, 1, 2), 230);
        let rows = dates.iter().enumerate().map(|(i, &d)| {
            let mut row = vec![Some(100.0); 5];
            // Twelve rows miss one ticker each.
            if i % 20 == 0 {
                row[i % 5] = None;
            }
            (d, row)
        });
        let table = PriceTable::from_rows(tickers, rows);

        assert_eq!(table.len(), 230 - 12);
        let alloc = compute_allocation(&table, *dates.last().unwrap(), &config);
        assert!(alloc.is_ok());
    }
}

mod boundary {
    use super::*;

    fn single(width: f64, windows: Vec<usize>) -> StrategyConfig {
        StrategyConfig {
            assets: vec![Asset {
                ticker: "X".to_string(),
                base_weight: 1.0,
            }],
            bands: BandParams { width, windows },
            score_map: ScoreMap::new([(0, 0.0), (1, 1.0)]),
        }
    }

    #[test]
    fn price_on_upper_band_does_not_score() {
        // SMA(2) of [1, 3] = 2, upper = 2 * 1.5 = 3 = latest.
        let dates = trading_days(date(2024, 1, 1), 2);
        let table = make_table(&["X".to_string()], &dates, &[vec![1.0, 3.0]]);

        let alloc = compute_allocation(&table, dates[1], &single(0.5, vec![2])).unwrap();

        assert_eq!(alloc.signals[0].readings[0].band.upper, 3.0);
        assert_eq!(alloc.signals[0].score, 0);
        assert_eq!(alloc.cash, 1.0);
    }

    #[test]
    fn price_just_above_upper_band_scores() {
        let dates = trading_days(date(2024, 1, 1), 2);
        let table = make_table(&["X".to_string()], &dates, &[vec![1.0, 3.1]]);

        let alloc = compute_allocation(&table, dates[1], &single(0.5, vec![2])).unwrap();

        assert_eq!(alloc.signals[0].score, 1);
        assert_eq!(alloc.cash, 0.0);
    }
}

mod performance {
    use super::*;

    #[test]
    fn constant_daily_return_for_a_year() {
        let r = 0.0004;
        let returns = vec![r; 252];
        assert_relative_eq!(
            compute_cagr(&returns),
            (1.0_f64 + r).powi(252) - 1.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn empty_series_is_zero() {
        assert_eq!(compute_cagr(&[]), 0.0);
        assert_eq!(compute_max_drawdown(&[]), 0.0);
    }

    #[test]
    fn replay_of_rising_market_is_positive() {
        let config = StrategyConfig::default();
        let dates = trading_days(date(2022, 1, 3), 400);
        let columns: Vec<Vec<f64>> = (0..5)
            .map(|k| {
                (0..400)
                    .map(|i| 100.0 * (1.0 + 0.001 * (k + 1) as f64).powi(i))
                    .collect()
            })
            .collect();
        let table = make_table(&config.tickers(), &dates, &columns);

        let returns = replay(&table, &config, dates[0], *dates.last().unwrap()).unwrap();
        let summary = PerformanceSummary::from_daily(&returns);

        assert_eq!(summary.trading_days, 200);
        assert_eq!(returns[0].date, dates[200]);
        assert!(summary.cagr > 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
    }

    #[test]
    fn replay_captures_crash_in_drawdown() {
        let config = StrategyConfig::default();
        let dates = trading_days(date(2022, 1, 3), 260);
        let mut column: Vec<f64> = (0..250).map(|i| 100.0 * 1.002_f64.powi(i)).collect();
        let peak = column[249];
        column.extend((1..=10).map(|i| peak * (1.0 - 0.03 * i as f64)));
        let table = make_table(&config.tickers(), &dates, &vec![column; 5]);

        let returns = replay(&table, &config, dates[0], *dates.last().unwrap()).unwrap();
        let summary = PerformanceSummary::from_daily(&returns);

        assert!(summary.max_drawdown < 0.0);
        assert!(summary.max_drawdown > -1.0);
    }
}

fn property_config() -> StrategyConfig {
    StrategyConfig {
        assets: vec![
            Asset {
                ticker: "A".to_string(),
                base_weight: 0.3,
            },
            Asset {
                ticker: "B".to_string(),
                base_weight: 0.25,
            },
            Asset {
                ticker: "C".to_string(),
                base_weight: 0.45,
            },
        ],
        bands: BandParams {
            width: 0.03,
            windows: vec![2, 4, 8],
        },
        score_map: ScoreMap::new([(0, 0.0), (1, 0.5), (2, 0.75), (3, 1.0)]),
    }
}

fn price_columns() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (8usize..40).prop_flat_map(|rows| {
        prop::collection::vec(prop::collection::vec(1.0f64..500.0, rows), 3)
    })
}

fn table_for(columns: &[Vec<f64>]) -> (PriceTable, chrono::NaiveDate) {
    let dates = trading_days(date(2024, 1, 1), columns[0].len());
    let tickers: Vec<String> = ["A", "B", "C"].iter().map(|t| t.to_string()).collect();
    (make_table(&tickers, &dates, columns), *dates.last().unwrap())
}

proptest! {
    #[test]
    fn weights_decompose_into_scalar_times_base(columns in price_columns()) {
        let config = property_config();
        let (table, target) = table_for(&columns);
        let alloc = compute_allocation(&table, target, &config).unwrap();

        for (signal, asset) in alloc.signals.iter().zip(&config.assets) {
            let allowed = [0.0, 0.5, 0.75, 1.0].map(|s| s * asset.base_weight);
            prop_assert!(allowed.iter().any(|w| (w - signal.weight).abs() < 1e-12));
        }
    }

    #[test]
    fn weights_and_cash_sum_to_one(columns in price_columns()) {
        let config = property_config();
        let (table, target) = table_for(&columns);
        let alloc = compute_allocation(&table, target, &config).unwrap();

        let total: f64 = alloc.weights().iter().map(|(_, w)| w).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(alloc.cash >= -1e-12);
    }

    #[test]
    fn raising_latest_price_never_lowers_weight(
        columns in price_columns(),
        bump in 1.0f64..3.0,
    ) {
        let config = property_config();
        let (table, target) = table_for(&columns);
        let before = compute_allocation(&table, target, &config).unwrap();

        let mut raised = columns.clone();
        let last = raised[0].len() - 1;
        raised[0][last] *= bump;
        let (table, target) = table_for(&raised);
        let after = compute_allocation(&table, target, &config).unwrap();

        prop_assert!(after.signals[0].score >= before.signals[0].score);
        prop_assert!(after.signals[0].weight >= before.signals[0].weight);
        prop_assert_eq!(after.signals[1].weight, before.signals[1].weight);
        prop_assert_eq!(after.signals[2].weight, before.signals[2].weight);
    }

    #[test]
    fn cagr_of_single_day(r in -0.2f64..0.2) {
        let expected = (1.0 + r).powi(252) - 1.0;
        prop_assert!((compute_cagr(&[r]) - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }
}
