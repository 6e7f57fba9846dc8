//! Group-by mean over a categorical key column.

use crate::dataset::Dataset;
use crate::error::InputError;
use crate::prepare::types::GroupMean;
use crate::prepare::utility::mean;
use std::collections::HashMap;

/// Groups rows by `group_column` and averages `value_column` within each group.
///
/// Rows where either cell is missing are skipped. The result is ordered by
/// ascending mean, ties broken by group name. Returns `Ok(None)` when either
/// column is absent.
///
/// # Errors
///
/// Returns [`InputError::NonNumeric`] if `value_column` holds a non-numeric cell.
pub fn aggregate_mean_by_group(
    dataset: &Dataset,
    group_column: &str,
    value_column: &str,
) -> Result<Option<Vec<GroupMean>>, InputError> {
    let (Some(groups), Some(values)) = (dataset.column(group_column), dataset.numeric(value_column)?)
    else {
        return Ok(None);
    };

    let mut series: HashMap<String, Vec<f64>> = HashMap::new();

    for (row, value) in values.iter().enumerate() {
        let (Some(key), Some(value)) = (groups.text(row), value) else {
            continue;
        };
        series.entry(key.into_owned()).or_default().push(*value);
    }

    let mut summary: Vec<GroupMean> = series
        .into_iter()
        .map(|(group, values)| GroupMean {
            mean: mean(&values),
            count: values.len(),
            group,
        })
        .collect();

    summary.sort_by(|a, b| {
        a.mean
            .total_cmp(&b.mean)
            .then_with(|| a.group.cmp(&b.group))
    });

    Ok(Some(summary))
}
