use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::Deserialize;

use crate::error::InputError;
use crate::parser::{DEFAULT_ENCODING, encoding_for_label};

/// Environment variable that overrides the configured input encoding.
pub const ENCODING_ENV: &str = "TAXI_PREP_ENCODING";

/// Preparation settings.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "encoding": "cp949",
///   "preview_rows": 5,
///   "histogram_bins": 20
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Character encoding label of the input CSV.
    pub encoding: String,
    /// Rows included in previews and the report.
    pub preview_rows: usize,
    /// Fixed histogram bin count. `None` picks one from the data.
    pub histogram_bins: Option<usize>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            preview_rows: 5,
            histogram_bins: None,
        }
    }
}

impl PrepConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: PrepConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file '{path}'"))?;
        Ok(config)
    }

    /// Reads [`ENCODING_ENV`] and builds the config with [`PrepConfig::layered`].
    pub fn resolve(path: Option<&str>, cli_encoding: Option<String>) -> Result<Self> {
        Self::layered(path, std::env::var(ENCODING_ENV).ok(), cli_encoding)
    }

    /// Builds the config from its layers. The encoding is taken from, in
    /// order: `cli_encoding`, `env_encoding`, the file at `path`, the default.
    pub fn layered(
        path: Option<&str>,
        env_encoding: Option<String>,
        cli_encoding: Option<String>,
    ) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };

        if let Some(encoding) = cli_encoding.or(env_encoding) {
            config.encoding = encoding;
        }

        Ok(config)
    }

    pub fn encoding(&self) -> Result<&'static Encoding, InputError> {
        encoding_for_label(&self.encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_defaults() {
        let config = PrepConfig::default();
        assert_eq!(config.encoding, "cp949");
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.encoding().unwrap(), encoding_rs::EUC_KR);
    }

    #[test]
    fn test_load_partial_file() {
        let path = temp_path("taxi_demand_prep_config_partial.json");
        fs::write(&path, r#"{ "histogram_bins": 12 }"#).unwrap();

        let config = PrepConfig::load(&path).unwrap();
        assert_eq!(config.histogram_bins, Some(12));
        assert_eq!(config.encoding, "cp949");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = PrepConfig::load("/nonexistent/taxi_demand_prep.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_layered_encoding_precedence() {
        let path = temp_path("taxi_demand_prep_config_layered.json");
        fs::write(&path, r#"{ "encoding": "euc-kr", "preview_rows": 3 }"#).unwrap();
        let some = |s: &str| Some(s.to_string());

        let config = PrepConfig::layered(None, None, None).unwrap();
        assert_eq!(config, PrepConfig::default());

        let config = PrepConfig::layered(Some(&path), None, None).unwrap();
        assert_eq!(config.encoding, "euc-kr");
        assert_eq!(config.preview_rows, 3);

        let config = PrepConfig::layered(Some(&path), some("utf-8"), None).unwrap();
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.preview_rows, 3);

        let config = PrepConfig::layered(Some(&path), some("utf-8"), some("ms949")).unwrap();
        assert_eq!(config.encoding, "ms949");

        let config = PrepConfig::layered(None, None, some("utf-8")).unwrap();
        assert_eq!(config.encoding, "utf-8");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_layered_missing_file_is_error() {
        let result = PrepConfig::layered(Some("/nonexistent/taxi_demand_prep.json"), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_without_file() {
        let config = PrepConfig::resolve(None, None).unwrap();
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.histogram_bins, None);
        match env::var(ENCODING_ENV) {
            Ok(encoding) => assert_eq!(config.encoding, encoding),
            Err(_) => assert_eq!(config, PrepConfig::default()),
        }

        let config = PrepConfig::resolve(None, Some("utf-8".to_string())).unwrap();
        assert_eq!(config.encoding, "utf-8");
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_path("taxi_demand_prep_config_invalid.json");
        fs::write(&path, "{ encoding: ").unwrap();

        assert!(PrepConfig::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }
}
