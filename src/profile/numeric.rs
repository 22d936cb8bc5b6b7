use crate::types::NumericStats;

/// Compute min, max, mean and median of a numeric column.
///
/// Returns `None` for an empty slice. The input is not modified; the median
/// sorts a private copy. The mean is a plain left-to-right sum divided by the
/// count, so results match naive floating-point summation exactly. NaN and
/// infinities flow through unchanged.
pub fn numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }

    let min = values.iter().copied().reduce(nan_min)?;
    let max = values.iter().copied().reduce(nan_max)?;
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Some(NumericStats {
        min,
        max,
        mean,
        median: median(values)?,
    })
}

/// Middle value of the sorted set; the average of the two middle values
/// when the count is even. Duplicates are kept.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if b < a {
        b
    } else {
        a
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if b > a {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_even() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn test_median_odd() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_median_unsorted_with_duplicates() {
        assert_eq!(median(&[5.0, 1.0, 5.0, 2.0, 5.0]), Some(5.0));
        assert_eq!(median(&[3.0, 1.0, 1.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_min_max_mean() {
        let stats = numeric_stats(&[10.0, -5.0, 0.0, 20.0]).unwrap();
        assert_eq!(stats.min, -5.0);
        assert_eq!(stats.max, 20.0);
        assert_eq!(stats.mean, 6.25);
        assert_eq!(stats.median, 5.0);
    }

    #[test]
    fn test_single_value() {
        let stats = numeric_stats(&[7.5]).unwrap();
        assert_eq!(stats.min, 7.5);
        assert_eq!(stats.max, 7.5);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.median, 7.5);
    }

    #[test]
    fn test_empty() {
        assert!(numeric_stats(&[]).is_none());
        assert!(median(&[]).is_none());
    }

    #[test]
    fn test_input_not_reordered() {
        let values = vec![3.0, 1.0, 2.0];
        let _ = numeric_stats(&values);
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_infinity_propagates() {
        let stats = numeric_stats(&[1.0, f64::INFINITY]).unwrap();
        assert_eq!(stats.max, f64::INFINITY);
        assert_eq!(stats.mean, f64::INFINITY);
        assert_eq!(stats.min, 1.0);
    }

    #[test]
    fn test_nan_propagates() {
        let stats = numeric_stats(&[1.0, f64::NAN, 3.0]).unwrap();
        assert!(stats.min.is_nan());
        assert!(stats.max.is_nan());
        assert!(stats.mean.is_nan());
    }
}
