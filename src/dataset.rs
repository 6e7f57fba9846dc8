//! In-memory tabular dataset.
//!
//! Columns keep their order from the input file. Source columns hold the raw
//! text of each cell; derived columns hold floats. Either kind uses `None`
//! for a missing cell.

use std::borrow::Cow;

use serde::Serialize;

use crate::error::InputError;

/// Cell contents treated as missing, after trimming surrounding whitespace.
pub const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Returns `true` if a raw cell should be treated as missing.
pub fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw.trim())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cells {
    Text(Vec<Option<String>>),
    Float(Vec<Option<f64>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Cells,
}

impl Column {
    /// Builds a source column from raw cells, mapping missing markers to `None`.
    pub fn from_raw<S: AsRef<str>>(name: &str, raw: &[S]) -> Self {
        let cells = raw
            .iter()
            .map(|r| {
                let r = r.as_ref();
                if is_missing(r) {
                    None
                } else {
                    Some(r.to_string())
                }
            })
            .collect();

        Self {
            name: name.trim().to_string(),
            cells: Cells::Text(cells),
        }
    }

    pub fn float(name: &str, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.trim().to_string(),
            cells: Cells::Float(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn len(&self) -> usize {
        match &self.cells {
            Cells::Text(v) => v.len(),
            Cells::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cell at `row` as text, or `None` if it is missing.
    pub fn text(&self, row: usize) -> Option<Cow<'_, str>> {
        match &self.cells {
            Cells::Text(v) => v.get(row)?.as_deref().map(Cow::Borrowed),
            Cells::Float(v) => v.get(row)?.map(|f| Cow::Owned(f.to_string())),
        }
    }

    /// Interprets every cell as a number.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NonNumeric`] for the first present cell that does
    /// not parse as a finite `f64`.
    pub fn numeric(&self) -> Result<Vec<Option<f64>>, InputError> {
        match &self.cells {
            Cells::Float(v) => Ok(v.clone()),
            Cells::Text(v) => v
                .iter()
                .enumerate()
                .map(|(row, cell)| match cell {
                    None => Ok(None),
                    Some(raw) => match raw.trim().parse::<f64>() {
                        Ok(f) if f.is_finite() => Ok(Some(f)),
                        _ => Err(InputError::NonNumeric {
                            column: self.name.clone(),
                            row,
                            value: raw.clone(),
                        }),
                    },
                })
                .collect(),
        }
    }
}

/// An ordered set of equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

/// A few rendered rows, for previews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Assembles a dataset, checking names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, InputError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut dataset = Dataset {
            columns: Vec::with_capacity(columns.len()),
            rows,
        };

        for column in columns {
            if dataset.has_column(column.name()) {
                return Err(InputError::DuplicateColumn(column.name));
            }
            dataset.check_len(&column)?;
            dataset.columns.push(column);
        }

        Ok(dataset)
    }

    /// Builds a dataset from a header row and row-major raw records.
    /// Header names are trimmed; missing markers become `None`.
    pub fn from_records<H, R, S>(headers: &[H], records: &[R]) -> Result<Self, InputError>
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut columns = Vec::with_capacity(headers.len());

        for (idx, header) in headers.iter().enumerate() {
            let mut raw = Vec::with_capacity(records.len());
            for record in records {
                let record = record.as_ref();
                if record.len() != headers.len() {
                    return Err(InputError::LengthMismatch {
                        column: header.as_ref().trim().to_string(),
                        expected: headers.len(),
                        actual: record.len(),
                    });
                }
                raw.push(record[idx].as_ref());
            }
            columns.push(Column::from_raw(header.as_ref(), &raw));
        }

        let mut dataset = Self::new(columns)?;
        dataset.rows = records.len();
        Ok(dataset)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Numeric view of a column, or `Ok(None)` if the column is absent.
    pub fn numeric(&self, name: &str) -> Result<Option<Vec<Option<f64>>>, InputError> {
        self.column(name).map(Column::numeric).transpose()
    }

    /// Inserts a column, replacing any existing column with the same name in place.
    pub fn set_column(&mut self, column: Column) -> Result<(), InputError> {
        if self.columns.is_empty() {
            self.rows = column.len();
        }
        self.check_len(&column)?;

        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Renders row `row` as strings, missing cells as empty strings.
    pub fn render_row(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.text(row).map(Cow::into_owned).unwrap_or_default())
            .collect()
    }

    /// The first `n` rows, rendered.
    pub fn head(&self, n: usize) -> Preview {
        Preview {
            columns: self.columns.iter().map(|c| c.name.clone()).collect(),
            rows: (0..n.min(self.rows)).map(|r| self.render_row(r)).collect(),
        }
    }

    fn check_len(&self, column: &Column) -> Result<(), InputError> {
        if column.len() != self.rows {
            return Err(InputError::LengthMismatch {
                column: column.name.clone(),
                expected: self.rows,
                actual: column.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_records(
            &[" district ", "num_boardings"],
            &[vec!["강남구", "12"], vec!["종로구", ""], vec!["NA", "7.5"]],
        )
        .unwrap()
    }

    #[test]
    fn test_headers_are_trimmed() {
        let ds = sample();
        assert_eq!(ds.column_names(), vec!["district", "num_boardings"]);
        assert!(ds.has_column("district"));
    }

    #[test]
    fn test_missing_markers() {
        let ds = sample();
        let district = ds.column("district").unwrap();
        assert_eq!(district.text(0).as_deref(), Some("강남구"));
        assert_eq!(district.text(2), None);

        let boardings = ds.numeric("num_boardings").unwrap().unwrap();
        assert_eq!(boardings, vec![Some(12.0), None, Some(7.5)]);
    }

    #[test]
    fn test_numeric_absent_column_is_none() {
        let ds = sample();
        assert!(ds.numeric("temperature").unwrap().is_none());
    }

    #[test]
    fn test_numeric_rejects_text() {
        let ds = sample();
        let err = ds.column("district").unwrap().numeric().unwrap_err();
        match err {
            InputError::NonNumeric { column, row, value } => {
                assert_eq!(column, "district");
                assert_eq!(row, 0);
                assert_eq!(value, "강남구");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_after_trim_is_rejected() {
        let result = Dataset::from_records(&["a", " a"], &[vec!["1", "2"]]);
        assert!(matches!(result, Err(InputError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn test_ragged_record_is_rejected() {
        let result = Dataset::from_records(&["a", "b"], &[vec!["1"]]);
        assert!(matches!(result, Err(InputError::LengthMismatch { .. })));
    }

    #[test]
    fn test_set_column_replaces_in_place() {
        let mut ds = sample();
        ds.set_column(Column::float("scaled", vec![Some(1.0), None, Some(0.0)]))
            .unwrap();
        ds.set_column(Column::float("scaled", vec![Some(2.0), None, Some(0.0)]))
            .unwrap();

        assert_eq!(ds.column_names(), vec!["district", "num_boardings", "scaled"]);
        assert_eq!(ds.column("scaled").unwrap().text(0).as_deref(), Some("2"));
    }

    #[test]
    fn test_set_column_wrong_length() {
        let mut ds = sample();
        let result = ds.set_column(Column::float("scaled", vec![Some(1.0)]));
        assert!(matches!(
            result,
            Err(InputError::LengthMismatch {
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_head_limits_rows() {
        let ds = sample();
        let preview = ds.head(2);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1], vec!["종로구".to_string(), String::new()]);
        assert_eq!(ds.head(10).rows.len(), 3);
    }
}
