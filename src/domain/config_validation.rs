//! Strategy configuration loading and validation.
//!
//! Reads the `[universe]`, `[bands]` and `[scalars]` sections through a
//! `ConfigPort`, falls back to the default strategy for anything absent,
//! and rejects the result unless every `StrategyConfig` invariant holds.

use crate::domain::error::TrendbandError;
use crate::domain::strategy::{Asset, BandParams, ScoreMap, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;

pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, TrendbandError> {
    let defaults = StrategyConfig::default();

    let tickers = match non_empty(config.get_string("universe", "tickers")) {
        Some(s) => parse_tickers(&s)?,
        None => defaults.tickers(),
    };

    let weights = match non_empty(config.get_string("universe", "weights")) {
        Some(s) => {
            let weights = parse_list(&s, "universe", "weights", |t| t.parse::<f64>().ok())?;
            if weights.len() != tickers.len() {
                return Err(invalid(
                    "universe",
                    "weights",
                    format!(
                        "expected {} weights (one per ticker), got {}",
                        tickers.len(),
                        weights.len()
                    ),
                ));
            }
            weights
        }
        None => vec![1.0 / tickers.len() as f64; tickers.len()],
    };

    let width = match non_empty(config.get_string("bands", "width")) {
        Some(s) => s
            .parse::<f64>()
            .map_err(|_| invalid("bands", "width", format!("not a number: {}", s)))?,
        None => defaults.bands.width,
    };

    let windows = match non_empty(config.get_string("bands", "windows")) {
        Some(s) => parse_list(&s, "bands", "windows", |t| t.parse::<usize>().ok())?,
        None => defaults.bands.windows.clone(),
    };

    let score_map = match non_empty(config.get_string("scalars", "map")) {
        Some(s) => parse_score_map(&s)?,
        None => defaults.score_map.clone(),
    };

    let strategy = StrategyConfig {
        assets: tickers
            .into_iter()
            .zip(weights)
            .map(|(ticker, base_weight)| Asset {
                ticker,
                base_weight,
            })
            .collect(),
        bands: BandParams { width, windows },
        score_map,
    };
    strategy.validate()?;
    Ok(strategy)
}

/// Comma-separated ticker list; uppercased, no blanks, no duplicates.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, TrendbandError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid("universe", "tickers", "empty token in ticker list"));
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(invalid(
                "universe",
                "tickers",
                format!("duplicate ticker: {}", ticker),
            ));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// `score:scalar` pairs, e.g. `0:0.0,1:0.5,2:0.75,3:1.0`.
pub fn parse_score_map(input: &str) -> Result<ScoreMap, TrendbandError> {
    let pairs = parse_list(input, "scalars", "map", |token| {
        let (score, scalar) = token.split_once(':')?;
        Some((
            score.trim().parse::<usize>().ok()?,
            scalar.trim().parse::<f64>().ok()?,
        ))
    })?;

    let mut seen = HashSet::new();
    for (score, _) in &pairs {
        if !seen.insert(*score) {
            return Err(invalid(
                "scalars",
                "map",
                format!("score {} listed twice", score),
            ));
        }
    }
    Ok(ScoreMap::new(pairs))
}

fn parse_list<T>(
    input: &str,
    section: &str,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, TrendbandError> {
    input
        .split(',')
        .map(str::trim)
        .map(|token| {
            parse(token).ok_or_else(|| invalid(section, key, format!("cannot parse '{}'", token)))
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TrendbandError {
    TrendbandError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
