//! Moving-average envelope bands.
//!
//! SMA(n) = (C[i-n+1] + ... + C[i]) / n
//! upper  = SMA(n) * (1 + N)
//! lower  = SMA(n) * (1 - N)

use std::fmt;

/// Arithmetic mean of `window`, or `None` when it is empty.
pub fn simple_moving_average(window: &[f64]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    Some(window.iter().sum::<f64>() / window.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    Above,
    Inside,
    Below,
}

impl fmt::Display for BandPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandPosition::Above => write!(f, "above"),
            BandPosition::Inside => write!(f, "inside"),
            BandPosition::Below => write!(f, "below"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub window: usize,
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Band {
    /// Band over the last `window` values of `history`. `None` if the
    /// history is shorter than the window.
    pub fn compute(history: &[f64], window: usize, width: f64) -> Option<Self> {
        if window == 0 || history.len() < window {
            return None;
        }
        let middle = simple_moving_average(&history[history.len() - window..])?;
        Some(Band {
            window,
            middle,
            upper: middle * (1.0 + width),
            lower: middle * (1.0 - width),
        })
    }

    /// Strictly above the upper band; touching it does not count.
    pub fn breaks_upper(&self, price: f64) -> bool {
        price > self.upper
    }

    pub fn position(&self, price: f64) -> BandPosition {
        if self.breaks_upper(price) {
            BandPosition::Above
        } else if price < self.lower {
            BandPosition::Below
        } else {
            BandPosition::Inside
        }
    }
}
