//! Aggregate statistics over the watched list.

use serde::Serialize;

use crate::watched::WatchedEntry;

/// Derived statistics. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistSummary {
    pub count: usize,
    pub mean_catalog_rating: f64,
    pub mean_user_rating: f64,
    pub mean_runtime_minutes: f64,
}

impl WatchlistSummary {
    /// Display precision: one decimal for ratings, whole minutes for runtime.
    pub fn rounded(&self) -> Self {
        Self {
            count: self.count,
            mean_catalog_rating: round_to(self.mean_catalog_rating, 1),
            mean_user_rating: round_to(self.mean_user_rating, 1),
            mean_runtime_minutes: self.mean_runtime_minutes.round(),
        }
    }
}

/// Summarize `entries`. Means over an empty list are 0.
pub fn summarize(entries: &[WatchedEntry]) -> WatchlistSummary {
    WatchlistSummary {
        count: entries.len(),
        mean_catalog_rating: mean(entries.iter().map(|e| f64::from(e.catalog_rating))),
        mean_user_rating: mean(entries.iter().map(|e| f64::from(e.user_rating))),
        mean_runtime_minutes: mean(entries.iter().map(|e| f64::from(e.runtime_minutes))),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary, WatchlistSummary::default());
        assert!(!summary.mean_user_rating.is_nan());
    }

    #[test]
    fn test_means() {
        let mut a = fixtures::watched_entry("tt1", 8);
        a.catalog_rating = 8.5;
        a.runtime_minutes = 120;
        let mut b = fixtures::watched_entry("tt2", 5);
        b.catalog_rating = 7.0;
        b.runtime_minutes = 95;

        let summary = summarize(&[a, b]);

        assert_eq!(summary.count, 2);
        assert!((summary.mean_catalog_rating - 7.75).abs() < 1e-6);
        assert!((summary.mean_user_rating - 6.5).abs() < 1e-9);
        assert!((summary.mean_runtime_minutes - 107.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_values_count_as_zero() {
        let mut entry = fixtures::watched_entry("tt1", 6);
        entry.catalog_rating = 0.0;
        entry.runtime_minutes = 0;

        let summary = summarize(&[entry]);
        assert_eq!(summary.mean_catalog_rating, 0.0);
        assert_eq!(summary.mean_runtime_minutes, 0.0);
        assert_eq!(summary.mean_user_rating, 6.0);
    }

    #[test]
    fn test_rounded() {
        let summary = WatchlistSummary {
            count: 3,
            mean_catalog_rating: 7.466_666,
            mean_user_rating: 8.333_333,
            mean_runtime_minutes: 112.666_666,
        };

        let rounded = summary.rounded();
        assert_eq!(rounded.count, 3);
        assert!((rounded.mean_catalog_rating - 7.5).abs() < 1e-9);
        assert!((rounded.mean_user_rating - 8.3).abs() < 1e-9);
        assert_eq!(rounded.mean_runtime_minutes, 113.0);
    }
}
