use crate::model::{PercentileSet, PercentileValue};

/// Percentile ranks reported for the combined latency distribution.
pub const LATENCY_PERCENTILES: [f64; 9] = [50.0, 75.0, 90.0, 95.0, 97.0, 98.0, 99.0, 99.5, 99.9];

/// Value at `percentile` (0..=100) of an ascending slice.
///
/// Linear interpolation between the closest ranks, with rank = p/100 * (n - 1).
/// Returns `None` for an empty slice.
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }
    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Compute the fixed latency percentiles over `durations`, or `None` when there are none.
pub fn compute_percentiles(durations: &[f64]) -> Option<PercentileSet> {
    if durations.is_empty() {
        return None;
    }
    let mut sorted = durations.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let values = LATENCY_PERCENTILES
        .iter()
        .filter_map(|&p| {
            percentile_of_sorted(&sorted, p).map(|value_ms| PercentileValue {
                percentile: p,
                value_ms,
            })
        })
        .collect();

    Some(PercentileSet {
        sample_count: sorted.len(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_hundred() -> Vec<f64> {
        (1..=100).map(|x| x as f64).collect()
    }

    #[test]
    fn median_interpolates_between_middle_ranks() {
        let set = compute_percentiles(&one_to_hundred()).unwrap();
        assert!((set.get(50.0).unwrap() - 50.5).abs() < 1e-9);
    }

    #[test]
    fn tail_percentile_interpolates_near_max() {
        let set = compute_percentiles(&one_to_hundred()).unwrap();
        assert!((set.get(99.9).unwrap() - 99.901).abs() < 1e-9);
        assert!((set.get(99.0).unwrap() - 99.01).abs() < 1e-9);
        assert!((set.get(75.0).unwrap() - 75.25).abs() < 1e-9);
    }

    #[test]
    fn reports_every_fixed_rank_in_order() {
        let set = compute_percentiles(&one_to_hundred()).unwrap();
        let ranks: Vec<f64> = set.values.iter().map(|v| v.percentile).collect();
        assert_eq!(ranks, LATENCY_PERCENTILES.to_vec());
        assert_eq!(set.sample_count, 100);
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut shuffled = one_to_hundred();
        shuffled.reverse();
        shuffled.swap(3, 71);
        assert_eq!(
            compute_percentiles(&shuffled),
            compute_percentiles(&one_to_hundred())
        );
    }

    #[test]
    fn single_sample_is_every_percentile() {
        let set = compute_percentiles(&[42.0]).unwrap();
        assert!(set.values.iter().all(|v| v.value_ms == 42.0));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(compute_percentiles(&[]).is_none());
        assert!(percentile_of_sorted(&[], 50.0).is_none());
    }
}
