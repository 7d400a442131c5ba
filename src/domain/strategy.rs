//! Strategy configuration: asset basket, band parameters and score map.
//!
//! A `StrategyConfig` is built once, validated once, and then passed by
//! reference into the signal engine. Nothing mutates it afterwards.

use crate::domain::error::TrendbandError;
use crate::domain::signal::CASH;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Tolerance for the aggregate base weight check.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

pub const DEFAULT_TICKERS: [&str; 5] = [
    "102110.KS",
    "283580.KS",
    "453810.KS",
    "148070.KS",
    "385560.KS",
];
pub const DEFAULT_BAND_WIDTH: f64 = 0.03;
pub const DEFAULT_WINDOWS: [usize; 3] = [20, 120, 200];
pub const DEFAULT_SCALARS: [(usize, f64); 4] = [(0, 0.0), (1, 0.50), (2, 0.75), (3, 1.0)];

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub ticker: String,
    pub base_weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandParams {
    /// Band half-width as a fraction of the moving average.
    pub width: f64,
    pub windows: Vec<usize>,
}

impl BandParams {
    pub fn max_window(&self) -> usize {
        self.windows.iter().copied().max().unwrap_or(0)
    }
}

/// Score → exposure scalar lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMap {
    scalars: BTreeMap<usize, f64>,
}

impl ScoreMap {
    pub fn new<I: IntoIterator<Item = (usize, f64)>>(entries: I) -> Self {
        Self {
            scalars: entries.into_iter().collect(),
        }
    }

    pub fn scalar_for(&self, score: usize) -> Option<f64> {
        self.scalars.get(&score).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.scalars.iter().map(|(&s, &v)| (s, v))
    }
}

impl fmt::Display for ScoreMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .scalars
            .iter()
            .map(|(score, scalar)| format!("{}:{}", score, scalar))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub assets: Vec<Asset>,
    pub bands: BandParams,
    pub score_map: ScoreMap,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let weight = 1.0 / DEFAULT_TICKERS.len() as f64;
        StrategyConfig {
            assets: DEFAULT_TICKERS
                .iter()
                .map(|t| Asset {
                    ticker: t.to_string(),
                    base_weight: weight,
                })
                .collect(),
            bands: BandParams {
                width: DEFAULT_BAND_WIDTH,
                windows: DEFAULT_WINDOWS.to_vec(),
            },
            score_map: ScoreMap::new(DEFAULT_SCALARS),
        }
    }
}

impl StrategyConfig {
    pub fn tickers(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.ticker.clone()).collect()
    }

    pub fn max_score(&self) -> usize {
        self.bands.windows.len()
    }

    /// Rows needed up to the effective date: the longest window, and never
    /// fewer than two so a prior row exists.
    pub fn required_rows(&self) -> usize {
        self.bands.max_window().max(2)
    }

    /// Check every invariant the engine relies on. Run at load time.
    pub fn validate(&self) -> Result<(), TrendbandError> {
        if self.assets.is_empty() {
            return Err(invariant("at least one ticker is required"));
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if asset.ticker.eq_ignore_ascii_case(CASH) {
                return Err(invariant(format!(
                    "ticker {} clashes with the {} entry",
                    asset.ticker, CASH
                )));
            }
            if !seen.insert(asset.ticker.as_str()) {
                return Err(invariant(format!("duplicate ticker {}", asset.ticker)));
            }
            if !asset.base_weight.is_finite() || !(0.0..=1.0).contains(&asset.base_weight) {
                return Err(invariant(format!(
                    "base weight of {} must be within [0, 1], got {}",
                    asset.ticker, asset.base_weight
                )));
            }
        }

        let total: f64 = self.assets.iter().map(|a| a.base_weight).sum();
        if total > 1.0 + WEIGHT_TOLERANCE {
            return Err(invariant(format!(
                "base weights sum to {:.6}, must not exceed 1",
                total
            )));
        }

        if !self.bands.width.is_finite() || self.bands.width < 0.0 {
            return Err(invariant(format!(
                "band width must be a non-negative number, got {}",
                self.bands.width
            )));
        }
        if self.bands.windows.is_empty() {
            return Err(invariant("at least one moving-average window is required"));
        }
        if self.bands.windows.contains(&0) {
            return Err(invariant("moving-average windows must be at least 1"));
        }

        let mut previous = f64::NEG_INFINITY;
        for score in 0..=self.max_score() {
            let scalar = self.score_map.scalar_for(score).ok_or_else(|| {
                invariant(format!("score map has no scalar for score {}", score))
            })?;
            if !scalar.is_finite() || !(0.0..=1.0).contains(&scalar) {
                return Err(invariant(format!(
                    "scalar for score {} must be within [0, 1], got {}",
                    score, scalar
                )));
            }
            if scalar < previous {
                return Err(invariant(format!(
                    "score map must be non-decreasing, score {} maps to {} below {}",
                    score, scalar, previous
                )));
            }
            previous = scalar;
        }

        Ok(())
    }
}

fn invariant(reason: impl Into<String>) -> TrendbandError {
    TrendbandError::ConfigInvariant {
        reason: reason.into(),
    }
}
