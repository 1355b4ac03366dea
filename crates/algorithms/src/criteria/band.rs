//! Breakpoint bands
//!
//! A criterion's raw value domain is partitioned into contiguous bands.
//! Band 0 covers `[raw_low, raw_high]`; every later band covers
//! `(raw_low, raw_high]`, so a value sitting exactly on a shared edge
//! belongs to the band that edge closes.

use serde::{Deserialize, Serialize};

/// A raw-value interval mapped to one normalized score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointBand {
    /// Lower edge (inclusive only for the first band)
    pub raw_low: f64,
    /// Upper edge (inclusive)
    pub raw_high: f64,
    /// Score in [0, 100]
    pub score: f64,
}

impl BreakpointBand {
    pub fn new(raw_low: f64, raw_high: f64, score: f64) -> Self {
        Self {
            raw_low,
            raw_high,
            score,
        }
    }
}

/// Find the score for `value` in a validated, ascending band list.
///
/// Values below the first band take the first band's score and values above
/// the last band take the last band's score.
pub(crate) fn lookup(bands: &[BreakpointBand], value: f64) -> f64 {
    // First band whose inclusive upper edge reaches the value.
    let idx = bands.partition_point(|b| b.raw_high < value);
    let idx = idx.min(bands.len() - 1);
    bands[idx].score
}

/// Build contiguous bands over a discrete code space.
///
/// Each code `c_i` gets the band `(c_{i-1}, c_i]`; the first code gets
/// `[c_0 - 1, c_0]`. `codes` must be sorted ascending without duplicates.
pub fn categorical_bands(codes: &[(f64, f64)]) -> Vec<BreakpointBand> {
    let mut bands = Vec::with_capacity(codes.len());
    let mut low = codes.first().map(|(c, _)| c - 1.0).unwrap_or(0.0);
    for &(code, score) in codes {
        bands.push(BreakpointBand::new(low, code, score));
        low = code;
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope_bands() -> Vec<BreakpointBand> {
        vec![
            BreakpointBand::new(0.0, 10.0, 100.0),
            BreakpointBand::new(10.0, 30.0, 50.0),
            BreakpointBand::new(30.0, 90.0, 10.0),
        ]
    }

    #[test]
    fn test_lookup_inside_bands() {
        let bands = slope_bands();
        assert_eq!(lookup(&bands, 5.0), 100.0);
        assert_eq!(lookup(&bands, 20.0), 50.0);
        assert_eq!(lookup(&bands, 45.0), 10.0);
    }

    #[test]
    fn test_lookup_edges_are_inclusive_upper() {
        let bands = slope_bands();
        assert_eq!(lookup(&bands, 0.0), 100.0);
        assert_eq!(lookup(&bands, 10.0), 100.0);
        assert_eq!(lookup(&bands, 10.000001), 50.0);
        assert_eq!(lookup(&bands, 30.0), 50.0);
        assert_eq!(lookup(&bands, 90.0), 10.0);
    }

    #[test]
    fn test_lookup_clamps_outside() {
        let bands = slope_bands();
        assert_eq!(lookup(&bands, -3.0), 100.0);
        assert_eq!(lookup(&bands, 1e9), 10.0);
    }

    #[test]
    fn test_categorical_bands_are_contiguous() {
        let bands = categorical_bands(&[(10.0, 60.0), (20.0, 80.0), (40.0, 100.0)]);
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0], BreakpointBand::new(9.0, 10.0, 60.0));
        assert_eq!(bands[2], BreakpointBand::new(20.0, 40.0, 100.0));
        assert_eq!(lookup(&bands, 20.0), 80.0);
        assert_eq!(lookup(&bands, 40.0), 100.0);
    }
}
