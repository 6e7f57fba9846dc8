//! Data preparation for the taxi-demand dataset.
//!
//! Adds scaled copies of the weather and demand columns next to the
//! originals and computes the mean demand per district. The input dataset is
//! never modified; [`prepare`] returns a new one.

pub mod aggregate;
pub mod scale;
pub mod types;
pub mod utility;

use tracing::{debug, warn};

use crate::dataset::{Column, Dataset};
use crate::error::InputError;
use crate::prepare::aggregate::aggregate_mean_by_group;
use crate::prepare::scale::{normalize_minmax, standardize_zscore};
use crate::prepare::types::{Prepared, ScaleMethod};

pub const PRECIPITATION: &str = "precipitation";
pub const TEMPERATURE: &str = "temperature";
pub const NUM_BOARDINGS: &str = "num_boardings";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const DISTRICT: &str = "district";

/// Derived columns: (source, target, method). Applied in this order.
static TRANSFORMS: &[(&str, &str, ScaleMethod)] = &[
    (PRECIPITATION, "precipitation_minmax", ScaleMethod::MinMax),
    (TEMPERATURE, "temperature_zscore", ScaleMethod::ZScore),
    (NUM_BOARDINGS, "num_boardings_zscore", ScaleMethod::ZScore),
];

/// Runs every transform whose source column is present, then the district
/// aggregation.
///
/// Absent source columns are skipped without error. Degenerate columns
/// produce warnings in [`Prepared::warnings`]. Running this again on its own
/// output yields the same derived columns.
///
/// # Errors
///
/// Returns [`InputError::NonNumeric`] if a source column holds a value that
/// is not a number. No partial result is returned.
pub fn prepare(input: &Dataset) -> Result<Prepared, InputError> {
    let mut dataset = input.clone();
    let mut derived = Vec::new();
    let mut warnings = Vec::new();

    for &(source, target, method) in TRANSFORMS {
        let Some(values) = input.numeric(source)? else {
            debug!(column = source, "Source column absent, skipping");
            continue;
        };

        let result = match method {
            ScaleMethod::MinMax => normalize_minmax(source, target, &values),
            ScaleMethod::ZScore => standardize_zscore(source, target, &values),
        };

        match result {
            Ok(scaled) => {
                if let Some(w) = scaled.warning {
                    warn!(column = source, warning = %w, "Degenerate column");
                    warnings.push(w);
                }
                debug!(
                    column = target,
                    center = scaled.fit.center,
                    scale = scaled.fit.scale,
                    "Derived column"
                );
                dataset.set_column(Column::float(target, scaled.values))?;
                derived.push(scaled.fit);
            }
            Err(w) => {
                warn!(column = source, warning = %w, "Column not derived");
                warnings.push(w);
            }
        }
    }

    let district_summary = aggregate_mean_by_group(input, DISTRICT, NUM_BOARDINGS)?;
    if district_summary.is_none() {
        debug!("District or boardings column absent, no summary");
    }

    Ok(Prepared {
        dataset,
        derived,
        district_summary,
        warnings,
    })
}
