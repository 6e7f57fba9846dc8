//! Data types produced by the preparation stage.

use serde::Serialize;
use std::fmt;

use crate::dataset::Dataset;

/// How a derived column was computed from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMethod {
    /// `(v - min) / (max - min)`
    MinMax,
    /// `(v - mean) / stddev`, population standard deviation
    ZScore,
}

/// A recoverable condition found while preparing a dataset.
///
/// Warnings never stop preparation; they are returned alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrepWarning {
    /// Every present value was equal, so min-max scaling had no range.
    /// The derived values were set to 0.0.
    DegenerateRange { column: String, value: f64 },
    /// The standard deviation was zero. The derived values were set to 0.0.
    ZeroVariance { column: String, mean: f64 },
    /// The column exists but has no present values; no derived column was written.
    NoNumericValues { column: String },
}

impl fmt::Display for PrepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepWarning::DegenerateRange { column, value } => write!(
                f,
                "{column}: every value is {value}, min-max output set to 0"
            ),
            PrepWarning::ZeroVariance { column, mean } => write!(
                f,
                "{column}: zero standard deviation around {mean}, z-scores set to 0"
            ),
            PrepWarning::NoNumericValues { column } => {
                write!(f, "{column}: no numeric values, column not derived")
            }
        }
    }
}

/// Fitted parameters of one derived column.
///
/// For min-max, `center` is the minimum and `scale` the range; for z-scores,
/// `center` is the mean and `scale` the standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedColumn {
    pub name: String,
    pub source: String,
    pub method: ScaleMethod,
    pub center: f64,
    pub scale: f64,
}

/// Mean of a value column within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: f64,
    pub count: usize,
}

/// Result of one preparation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    /// Input columns, unchanged, followed by the derived columns.
    pub dataset: Dataset,
    pub derived: Vec<DerivedColumn>,
    /// Mean `num_boardings` per `district`, ascending. `None` when either
    /// column is absent.
    pub district_summary: Option<Vec<GroupMean>>,
    pub warnings: Vec<PrepWarning>,
}
