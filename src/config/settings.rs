//! Application settings loaded from `config.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine. The path
//! can be overridden with the `CONFIG_PATH` environment variable.

use crate::errors::{Error, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Top-level structure of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Branding and formatting of generated reports
    pub reports: ReportSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Report branding and locale settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Product name printed in report titles
    pub brand: String,
    /// File name prefix of the users CSV export
    pub csv_prefix: String,
    /// File name prefix of per-user PDF reports
    pub pdf_prefix: String,
    /// Offset from UTC, in hours, used when printing dates
    pub utc_offset_hours: i32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            brand: "MindMoney".to_string(),
            csv_prefix: "mindmoney-usuarios".to_string(),
            pdf_prefix: "cliente".to_string(),
            utc_offset_hours: -3,
        }
    }
}

impl ReportSettings {
    /// Offset used to turn stored UTC instants into calendar dates.
    #[must_use]
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid or the
/// UTC offset is out of range.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Parses and validates settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if !(-23..=23).contains(&config.reports.utc_offset_hours) {
        return Err(Error::Config {
            message: format!(
                "reports.utc_offset_hours must be between -23 and 23, got {}",
                config.reports.utc_offset_hours
            ),
        });
    }

    Ok(config)
}

/// Loads settings from `CONFIG_PATH` (default `./config.toml`), falling back to
/// defaults when the file does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {}", path);
        Ok(config)
    } else {
        info!("No configuration file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            bind_addr = "0.0.0.0:8080"

            [reports]
            brand = "Acme"
            csv_prefix = "acme-users"
            pdf_prefix = "client"
            utc_offset_hours = 1
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.reports.brand, "Acme");
        assert_eq!(config.reports.csv_prefix, "acme-users");
        assert_eq!(config.reports.pdf_prefix, "client");
        assert_eq!(config.reports.display_offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = parse_config("[reports]\nbrand = \"Acme\"\n").unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.reports.brand, "Acme");
        assert_eq!(config.reports.pdf_prefix, "cliente");
        assert_eq!(config.reports.utc_offset_hours, -3);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.reports.csv_prefix, "mindmoney-usuarios");
        assert_eq!(config.reports.display_offset().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let result = parse_config("[reports]\nutc_offset_hours = 40\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(matches!(
            parse_config("[reports\nbrand ="),
            Err(Error::Config { .. })
        ));
    }
}
