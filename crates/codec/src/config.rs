//! Codec configuration via `wirestate.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock behavior. On first use a host can drop a commented default file next
//! to its other settings with [`CodecConfig::write_default_if_missing`].

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wirestate_core::{Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "wirestate.toml";

/// Codec configuration loaded from `wirestate.toml`.
///
/// # Example
///
/// ```toml
/// date_format = "%Y-%m-%dT%H:%M:%S%.f%:z"
/// naive_date_format = "%Y-%m-%dT%H:%M:%S%.f"
/// suppress_typed_nulls = true
/// accept_rfc3339 = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// chrono format for `native` and `utc` dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// chrono format for `naive` dates
    #[serde(default = "default_naive_date_format")]
    pub naive_date_format: String,
    /// Skip assigning a raw `null` to a property declared non-nullable
    #[serde(default = "default_true")]
    pub suppress_typed_nulls: bool,
    /// Fall back to RFC 3339 when a date does not match the configured format
    #[serde(default = "default_true")]
    pub accept_rfc3339: bool,
}

fn default_date_format() -> String {
    "%Y-%m-%dT%H:%M:%S%.f%:z".to_string()
}

fn default_naive_date_format() -> String {
    "%Y-%m-%dT%H:%M:%S%.f".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            naive_date_format: default_naive_date_format(),
            suppress_typed_nulls: true,
            accept_rfc3339: true,
        }
    }
}

impl CodecConfig {
    /// Check that both date formats are valid chrono format strings.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid format.
    pub fn validate(&self) -> Result<()> {
        for (key, format) in [
            ("date_format", &self.date_format),
            ("naive_date_format", &self.naive_date_format),
        ] {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(Error::config(format!(
                    "Invalid {} '{}' in {}",
                    key, format, CONFIG_FILE_NAME
                )));
            }
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# wirestate codec configuration
#
# Format for offset-carrying and UTC dates (chrono strftime syntax).
# The default is ISO 8601 with optional fractional seconds.
date_format = "%Y-%m-%dT%H:%M:%S%.f%:z"

# Format for zone-less ("naive") dates.
naive_date_format = "%Y-%m-%dT%H:%M:%S%.f"

# Skip assigning a raw null to a property whose declared type is not
# nullable. Undeclared properties always receive the value.
suppress_typed_nulls = true

# Accept RFC 3339 dates when a payload does not match the formats above.
accept_rfc3339 = true
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, or a date format is
    /// invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CodecConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: CodecConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
