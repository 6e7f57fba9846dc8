//! Column scalers: min-max normalization and z-score standardization.
//!
//! Both fit on the present values of a column and map every present cell;
//! missing cells stay missing. A zero range or zero standard deviation maps
//! every present cell to 0.0 and reports a [`PrepWarning`].

use crate::prepare::types::{DerivedColumn, PrepWarning, ScaleMethod};
use crate::prepare::utility::{mean, min_max, present, stddev};

/// Output of a scaler: the derived cells, their fitted parameters, and a
/// warning if the fit was degenerate.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaled {
    pub values: Vec<Option<f64>>,
    pub fit: DerivedColumn,
    pub warning: Option<PrepWarning>,
}

/// Rescales `values` to `[0, 1]` using their observed minimum and maximum.
///
/// # Errors
///
/// Returns [`PrepWarning::NoNumericValues`] if no value is present.
pub fn normalize_minmax(
    source: &str,
    target: &str,
    values: &[Option<f64>],
) -> Result<Scaled, PrepWarning> {
    let (min, max) = min_max(&present(values)).ok_or_else(|| PrepWarning::NoNumericValues {
        column: source.to_string(),
    })?;
    let range = max - min;

    let (values, warning) = if range == 0.0 {
        let warning = PrepWarning::DegenerateRange {
            column: source.to_string(),
            value: min,
        };
        (map_present(values, |_| 0.0), Some(warning))
    } else if range.is_finite() {
        (map_present(values, |v| (v - min) / range), None)
    } else {
        // Extremes far enough apart that `max - min` overflows; halving keeps every term finite.
        let half_range = max / 2.0 - min / 2.0;
        (
            map_present(values, |v| (v / 2.0 - min / 2.0) / half_range),
            None,
        )
    };

    Ok(Scaled {
        values,
        fit: DerivedColumn {
            name: target.to_string(),
            source: source.to_string(),
            method: ScaleMethod::MinMax,
            center: min,
            scale: range,
        },
        warning,
    })
}

/// Standardizes `values` to mean 0 and population standard deviation 1.
///
/// # Errors
///
/// Returns [`PrepWarning::NoNumericValues`] if no value is present.
pub fn standardize_zscore(
    source: &str,
    target: &str,
    values: &[Option<f64>],
) -> Result<Scaled, PrepWarning> {
    let observed = present(values);
    if observed.is_empty() {
        return Err(PrepWarning::NoNumericValues {
            column: source.to_string(),
        });
    }

    let avg = mean(&observed);
    let sd = stddev(&observed, avg);

    // Rounding in the mean leaves a tiny non-zero stddev for constant input.
    let constant = min_max(&observed).is_some_and(|(lo, hi)| lo == hi)
        || sd <= observed.len() as f64 * f64::EPSILON * avg.abs();

    let (values, warning) = if constant {
        let warning = PrepWarning::ZeroVariance {
            column: source.to_string(),
            mean: avg,
        };
        (map_present(values, |_| 0.0), Some(warning))
    } else {
        (map_present(values, |v| (v - avg) / sd), None)
    };

    Ok(Scaled {
        values,
        fit: DerivedColumn {
            name: target.to_string(),
            source: source.to_string(),
            method: ScaleMethod::ZScore,
            center: avg,
            scale: sd,
        },
        warning,
    })
}

fn map_present(values: &[Option<f64>], f: impl Fn(f64) -> f64) -> Vec<Option<f64>> {
    values.iter().map(|v| v.map(&f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_minmax_endpoints() {
        let scaled =
            normalize_minmax("p", "p_minmax", &[Some(2.0), Some(4.0), None, Some(10.0)]).unwrap();

        assert_eq!(scaled.values, vec![Some(0.0), Some(0.25), None, Some(1.0)]);
        assert_eq!(scaled.fit.center, 2.0);
        assert_eq!(scaled.fit.scale, 8.0);
        assert!(scaled.warning.is_none());
    }

    #[test]
    fn test_minmax_constant_column_falls_back_to_zero() {
        let scaled = normalize_minmax("p", "p_minmax", &[Some(5.0), Some(5.0), None]).unwrap();

        assert_eq!(scaled.values, vec![Some(0.0), Some(0.0), None]);
        assert_eq!(
            scaled.warning,
            Some(PrepWarning::DegenerateRange {
                column: "p".to_string(),
                value: 5.0
            })
        );
    }

    #[test]
    fn test_minmax_all_missing() {
        let result = normalize_minmax("p", "p_minmax", &[None, None]);
        assert_eq!(
            result,
            Err(PrepWarning::NoNumericValues {
                column: "p".to_string()
            })
        );
    }

    #[test]
    fn test_zscore_known_values() {
        // mean 5, population stddev 2
        let input: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .map(Some)
            .collect();
        let scaled = standardize_zscore("t", "t_zscore", &input).unwrap();

        assert_eq!(scaled.values[0], Some(-1.5));
        assert_eq!(scaled.values[7], Some(2.0));
        assert_eq!(scaled.fit.center, 5.0);
        assert_eq!(scaled.fit.scale, 2.0);
    }

    #[test]
    fn test_zscore_single_value_is_zero_variance() {
        let scaled = standardize_zscore("t", "t_zscore", &[None, Some(21.5)]).unwrap();

        assert_eq!(scaled.values, vec![None, Some(0.0)]);
        assert!(matches!(
            scaled.warning,
            Some(PrepWarning::ZeroVariance { .. })
        ));
    }

    #[test]
    fn test_zscore_constant_with_inexact_mean() {
        // The mean of three 0.1s is 0.10000000000000002, not 0.1.
        let scaled = standardize_zscore("t", "t_zscore", &[Some(0.1), Some(0.1), Some(0.1)]).unwrap();

        assert_eq!(scaled.values, vec![Some(0.0), Some(0.0), Some(0.0)]);
        assert!(matches!(
            scaled.warning,
            Some(PrepWarning::ZeroVariance { .. })
        ));
    }

    #[test]
    fn test_minmax_extreme_range_stays_finite() {
        let scaled = normalize_minmax("p", "p_minmax", &[Some(-1e308), Some(0.0), Some(1e308)]).unwrap();

        assert_eq!(scaled.values, vec![Some(0.0), Some(0.5), Some(1.0)]);
        assert!(scaled.warning.is_none());
    }

    proptest! {
        #[test]
        fn prop_zscore_constant_column_is_zero(value in -1e6..1e6f64, n in 1usize..32) {
            let input = vec![Some(value); n];
            let scaled = standardize_zscore("t", "t_zscore", &input).unwrap();

            prop_assert!(scaled.values.iter().all(|v| *v == Some(0.0)));
            let is_zero_variance = matches!(scaled.warning, Some(PrepWarning::ZeroVariance { .. }));
            prop_assert!(is_zero_variance);
        }

        #[test]
        fn prop_minmax_in_unit_interval(values in prop::collection::vec(-1e6..1e6f64, 2..64)) {
            let input: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
            let scaled = normalize_minmax("p", "p_minmax", &input).unwrap();
            let out = present(&scaled.values);

            for v in &out {
                prop_assert!((0.0..=1.0).contains(v));
            }

            if scaled.warning.is_none() {
                let (lo, hi) = min_max(&values).unwrap();
                let lo_idx = values.iter().position(|&v| v == lo).unwrap();
                let hi_idx = values.iter().position(|&v| v == hi).unwrap();
                prop_assert_eq!(out[lo_idx], 0.0);
                prop_assert_eq!(out[hi_idx], 1.0);
            }
        }

        #[test]
        fn prop_zscore_has_zero_mean_unit_stddev(values in prop::collection::vec(-1e4..1e4f64, 2..64)) {
            let input: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
            let scaled = standardize_zscore("t", "t_zscore", &input).unwrap();
            prop_assume!(scaled.warning.is_none());

            let out = present(&scaled.values);
            let m = mean(&out);
            prop_assert!(m.abs() < EPS);
            prop_assert!((stddev(&out, m) - 1.0).abs() < 1e-6);
        }
    }
}
