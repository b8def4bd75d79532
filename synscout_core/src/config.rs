/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration (source page, fetch backend,
    output and log locations) from TOML with sane defaults.

  Security / Safety Notes:
    Reads a single operator-owned file; no secrets expected.

  Dependencies:
    toml + serde for parsing, dirs for XDG locations.

  Operational Scope:
    Resolved once at startup; CLI flags override values here.

  Revision History:
    2024-11-04 COD  Established configuration loader.
    2025-11-12 COD  Source/fetcher/output sections for scraping.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Every field defaulted; explicit paths must exist
    - Validation before any network activity
============================================================*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::{Result, SynscoutError};

pub const DEFAULT_SOURCE_URL: &str = "https://www.java.com/en/download/manual.jsp";
pub const DEFAULT_ARCHIVE_FILE: &str = "Java.json";
const APP_DIR: &str = "syn-scout";

/// Page loading strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// Headless Chromium; renders scripts before capture.
    #[default]
    Browser,
    /// Single HTTPS GET without rendering.
    Http,
}

/// Root configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynscoutConfig {
    pub source: SourceConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    pub product: String,
    /// Seconds before a page load is abandoned.
    pub page_load_timeout: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            product: "Java".to_string(),
            page_load_timeout: 60,
            user_agent: concat!("Syn-Scout/", env!("CARGO_PKG_VERSION"), " (linux)").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetcherConfig {
    pub backend: FetchBackend,
    pub chrome_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: DEFAULT_ARCHIVE_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub directory: Option<PathBuf>,
}

impl SynscoutConfig {
    /// Load from an explicit path, the default location, or built-in defaults.
    ///
    /// An explicit path that does not exist is an error; a missing
    /// default file is not.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(explicit) => (Some(explicit.to_path_buf()), true),
            None => (default_config_path(), false),
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            if required {
                return Err(SynscoutError::Config(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|err| {
            SynscoutError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|err| SynscoutError::Config(format!("{}: {err}", path.display())))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|err| SynscoutError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate_source_url(&self.source.url)?;
        if self.source.page_load_timeout == 0 {
            return Err(SynscoutError::Config(
                "source.page_load_timeout must be positive".into(),
            ));
        }
        if self.output.file_name.trim().is_empty() {
            return Err(SynscoutError::Config("output.file_name is empty".into()));
        }
        Ok(())
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.source.page_load_timeout)
    }

    /// Directory receiving the archive document.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Full archive path, honouring a CLI directory override.
    pub fn archive_path(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_dir())
            .join(&self.output.file_name)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .directory
            .clone()
            .or_else(|| {
                dirs::state_dir()
                    .or_else(dirs::data_local_dir)
                    .map(|dir| dir.join(APP_DIR).join("logs"))
            })
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}

/// Source pages are only ever fetched over http(s).
pub fn validate_source_url(url: &str) -> Result<()> {
    let url = url.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(SynscoutError::Config(format!(
            "source.url must be an http(s) URL, got `{url}`"
        )))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SynscoutConfig::from_toml_str("").unwrap();
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.source.product, "Java");
        assert_eq!(config.page_load_timeout(), Duration::from_secs(60));
        assert_eq!(config.fetcher.backend, FetchBackend::Browser);
        assert_eq!(config.output.file_name, "Java.json");
    }

    #[test]
    fn sections_override_defaults() {
        let raw = r#"
            [source]
            url = "https://example.test/java"
            page_load_timeout = 15

            [fetcher]
            backend = "http"

            [output]
            directory = "/srv/releases"
        "#;
        let config = SynscoutConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.source.url, "https://example.test/java");
        assert_eq!(config.source.product, "Java");
        assert_eq!(config.page_load_timeout(), Duration::from_secs(15));
        assert_eq!(config.fetcher.backend, FetchBackend::Http);
        assert_eq!(
            config.archive_path(None),
            PathBuf::from("/srv/releases/Java.json")
        );
        assert_eq!(
            config.archive_path(Some(Path::new("out"))),
            PathBuf::from("out/Java.json")
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(SynscoutConfig::from_toml_str("[source]\nurl = \"ftp://x\"").is_err());
        assert!(SynscoutConfig::from_toml_str("[source]\npage_load_timeout = 0").is_err());
        assert!(SynscoutConfig::from_toml_str("[source]\nretries = 3").is_err());
    }

    #[test]
    fn source_url_override_must_be_http() {
        assert!(validate_source_url("https://www.java.com/en/download/manual.jsp").is_ok());
        assert!(validate_source_url(" http://mirror.test/java ").is_ok());
        assert!(matches!(
            validate_source_url("ftp://mirror.test/java"),
            Err(SynscoutError::Config(_))
        ));
        assert!(validate_source_url("file:///tmp/manual.html").is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = SynscoutConfig::load_from_optional_path(Some(&missing)).unwrap_err();
        assert!(matches!(err, SynscoutError::Config(_)));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\ndirectory = \"/tmp/scout-logs\"\n").unwrap();
        let config = SynscoutConfig::load_from_optional_path(Some(&path)).unwrap();
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/scout-logs"));
    }
}
