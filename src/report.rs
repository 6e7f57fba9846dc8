//! Chart-ready series for the demand dashboard.
//!
//! Everything here reads an explicit [`Dataset`] or [`Prepared`] value and
//! returns plain data; rendering is left to whoever consumes the report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::PrepConfig;
use crate::dataset::{Dataset, Preview};
use crate::error::InputError;
use crate::prepare::types::{DerivedColumn, GroupMean, PrepWarning, Prepared};
use crate::prepare::utility::{mean, min_max, present};
use crate::prepare::{DAY_OF_WEEK, NUM_BOARDINGS};

/// Korean weekday labels, Monday first.
pub const WEEKDAY_ORDER: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

/// Mean of a value column for one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub label: String,
    /// `None` when no row carries this label.
    pub mean: Option<f64>,
    pub count: usize,
}

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// A source column's distribution next to its scaled counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionComparison {
    pub source: String,
    pub derived: String,
    pub original: Histogram,
    pub scaled: Histogram,
}

/// Everything the dashboard draws, for one input file.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub row_count: usize,
    pub preview: Preview,
    pub derived: Vec<DerivedColumn>,
    pub weekday_boardings: Option<Vec<CategoryMean>>,
    pub district_boardings: Option<Vec<GroupMean>>,
    pub distributions: Vec<DistributionComparison>,
    pub warnings: Vec<PrepWarning>,
}

impl DashboardReport {
    pub fn build(
        source: &str,
        prepared: &Prepared,
        config: &PrepConfig,
    ) -> Result<Self, InputError> {
        let dataset = &prepared.dataset;

        let mut distributions = Vec::new();
        for fit in &prepared.derived {
            let (Some(original), Some(scaled)) =
                (dataset.numeric(&fit.source)?, dataset.numeric(&fit.name)?)
            else {
                continue;
            };
            let (Some(original), Some(scaled)) = (
                histogram(&present(&original), config.histogram_bins),
                histogram(&present(&scaled), config.histogram_bins),
            ) else {
                continue;
            };

            distributions.push(DistributionComparison {
                source: fit.source.clone(),
                derived: fit.name.clone(),
                original,
                scaled,
            });
        }

        Ok(Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            row_count: dataset.row_count(),
            preview: dataset.head(config.preview_rows),
            derived: prepared.derived.clone(),
            weekday_boardings: weekday_means(dataset)?,
            district_boardings: prepared.district_summary.clone(),
            distributions,
            warnings: prepared.warnings.clone(),
        })
    }
}

/// Mean `num_boardings` per weekday, in [`WEEKDAY_ORDER`].
///
/// Labels outside the weekday domain are ignored. Returns `Ok(None)` when
/// either column is absent.
pub fn weekday_means(dataset: &Dataset) -> Result<Option<Vec<CategoryMean>>, InputError> {
    let (Some(days), Some(values)) = (dataset.column(DAY_OF_WEEK), dataset.numeric(NUM_BOARDINGS)?)
    else {
        return Ok(None);
    };

    let mut series: [Vec<f64>; 7] = Default::default();
    for (row, value) in values.iter().enumerate() {
        let (Some(day), Some(value)) = (days.text(row), value) else {
            continue;
        };
        if let Some(idx) = WEEKDAY_ORDER.iter().position(|d| *d == day.trim()) {
            series[idx].push(*value);
        }
    }

    let means = WEEKDAY_ORDER
        .iter()
        .zip(series.iter())
        .map(|(label, values)| CategoryMean {
            label: label.to_string(),
            mean: (!values.is_empty()).then(|| mean(values)),
            count: values.len(),
        })
        .collect();

    Ok(Some(means))
}

/// Upper bound on the number of histogram bins.
pub const MAX_BINS: usize = 10_000;

/// Bins `values` into an equal-width histogram.
///
/// With `bins = None` the bin width is the smaller of the Sturges and
/// Freedman-Diaconis widths (Sturges alone when the interquartile range is
/// zero, or when the Freedman-Diaconis width would need more than
/// [`MAX_BINS`] bins). A constant input gets one bin of width 1 centred on
/// the value. Returns `None` for empty input.
pub fn histogram(values: &[f64], bins: Option<usize>) -> Option<Histogram> {
    let (mut lo, mut hi) = min_max(values)?;
    let range = hi - lo;

    let bins = bins
        .unwrap_or_else(|| auto_bin_count(values, range))
        .clamp(1, MAX_BINS);

    if range == 0.0 {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / (hi - lo)) * bins as f64) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    Some(Histogram { edges, counts })
}

fn auto_bin_count(values: &[f64], range: f64) -> usize {
    if range == 0.0 {
        return 1;
    }

    let n = values.len() as f64;
    let sturges_bins = (n.log2() + 1.0).ceil();
    let sturges = range / (n.log2() + 1.0);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);

    if fd > 0.0 && fd < sturges {
        let fd_bins = (range / fd).ceil();
        if fd_bins <= MAX_BINS as f64 {
            return fd_bins as usize;
        }
    }
    sturges_bins as usize
}

/// Linear-interpolated percentile of sorted, non-empty input.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q / 100.0;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    sorted[below] + (sorted[above] - sorted[below]) * (pos - below as f64)
}
