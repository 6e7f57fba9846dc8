//! CSV parser for taxi-demand exports.
//!
//! The public exports are usually CP949 (the Korean Windows code page), so
//! the bytes are decoded first and the CSV is parsed from the decoded text.

use encoding_rs::Encoding;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::InputError;

/// Encoding used when the caller does not name one.
pub const DEFAULT_ENCODING: &str = "cp949";

/// Looks up an encoding by its WHATWG label (`euc-kr`, `utf-8`, ...).
///
/// Windows code-page names the WHATWG list lacks (`cp949`, `ms949`, `uhc`)
/// are accepted as aliases of `windows-949`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, InputError> {
    let normalized = label.trim().to_ascii_lowercase();
    let lookup = match normalized.as_str() {
        "cp949" | "ms949" | "uhc" => "windows-949",
        other => other,
    };

    Encoding::for_label(lookup.as_bytes())
        .ok_or_else(|| InputError::UnknownEncoding(label.to_string()))
}

/// Decodes `bytes` and parses them as a CSV with a header row.
///
/// A byte-order mark overrides `encoding`.
///
/// # Errors
///
/// Returns an error if the bytes are not valid in the chosen encoding, if the
/// input has no header row, if rows have differing field counts, or if two
/// headers are equal after trimming.
pub fn parse_dataset(bytes: &[u8], encoding: &'static Encoding) -> Result<Dataset, InputError> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(InputError::Decode {
            encoding: used.name(),
        });
    }
    debug!(encoding = used.name(), bytes = bytes.len(), "Decoded input");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(InputError::Empty);
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        records.push(result?);
    }

    let headers: Vec<&str> = headers.iter().collect();
    let records: Vec<Vec<&str>> = records.iter().map(|r| r.iter().collect()).collect();

    let dataset = Dataset::from_records(&headers, &records)?;
    debug!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "Parsed dataset"
    );

    Ok(dataset)
}
