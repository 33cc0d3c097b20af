use crate::constants;
use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration, loaded from an optional TOML file.
///
/// Every section and field has a default, so an empty file (or no file at
/// all) reproduces the stock behavior.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub input: InputConfig,
    pub categories: CategoryOptions,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub id_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            id_column: constants::ID_COLUMN.to_string(),
        }
    }
}

/// How the packed categories column is decoded
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryOptions {
    pub column: String,
    pub token_delimiter: String,
    pub name_separator: String,
    pub schema_check: SchemaCheck,
}

impl Default for CategoryOptions {
    fn default() -> Self {
        Self {
            column: constants::CATEGORIES_COLUMN.to_string(),
            token_delimiter: constants::TOKEN_DELIMITER.to_string(),
            name_separator: constants::NAME_SEPARATOR.to_string(),
            schema_check: SchemaCheck::default(),
        }
    }
}

/// Validation applied to rows after the first when decoding categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaCheck {
    /// Every row must carry the same category names, in the same order
    #[default]
    Strict,
    /// Only the token count must match; names are taken from the first row
    Positional,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub table_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table_name: constants::DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rotated JSON log. File logging is off when unset.
    pub directory: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            filter: constants::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Where to write the Prometheus text exposition after a run
    pub textfile: Option<PathBuf>,
}

impl EtlConfig {
    /// Load configuration from `path`, or from `ETL_CONFIG`, or fall back to
    /// defaults. Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("ETL_CONFIG").ok().map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EtlConfig = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = non_empty_env("ETL_TABLE_NAME") {
            self.output.table_name = v;
        }
        if let Some(v) = non_empty_env("ETL_LOG_DIR") {
            self.logging.directory = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty_env("ETL_METRICS_TEXTFILE") {
            self.metrics.textfile = Some(PathBuf::from(v));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("input.id_column", &self.input.id_column),
            ("categories.column", &self.categories.column),
            ("categories.token_delimiter", &self.categories.token_delimiter),
            ("categories.name_separator", &self.categories.name_separator),
            ("output.table_name", &self.output.table_name),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(EtlError::Config(format!("'{key}' must not be empty")));
            }
        }
        if self.input.id_column == self.categories.column {
            return Err(EtlError::Config(
                "'input.id_column' and 'categories.column' must differ".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = EtlConfig::from_toml_str("").unwrap();
        assert_eq!(config.input.id_column, "id");
        assert_eq!(config.categories.column, "categories");
        assert_eq!(config.categories.token_delimiter, ";");
        assert_eq!(config.categories.name_separator, "-");
        assert_eq!(config.categories.schema_check, SchemaCheck::Strict);
        assert_eq!(config.output.table_name, "DisasterResponse");
        assert!(config.logging.directory.is_none());
        assert!(config.metrics.textfile.is_none());
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        let config = EtlConfig::from_toml_str(
            r#"
            [categories]
            schema_check = "positional"

            [output]
            table_name = "Messages"
            "#,
        )
        .unwrap();
        assert_eq!(config.categories.schema_check, SchemaCheck::Positional);
        assert_eq!(config.categories.token_delimiter, ";");
        assert_eq!(config.output.table_name, "Messages");
    }

    #[test]
    fn test_unknown_schema_check_is_rejected() {
        let err = EtlConfig::from_toml_str("[categories]\nschema_check = \"loose\"\n").unwrap_err();
        assert!(matches!(err, EtlError::Toml(_)));
    }

    #[test]
    fn test_validate_rejects_empty_delimiter() {
        let mut config = EtlConfig::default();
        config.categories.token_delimiter.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("categories.token_delimiter"));
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EtlConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }
}
