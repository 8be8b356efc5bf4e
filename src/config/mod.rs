//! Configuration management for campusreg
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::api::ClientConfig;
use crate::models::{MAX_SEMESTER, MIN_SEMESTER};

/// Semesters that conventionally require library clearance
const DEFAULT_LIBRARY_SEMESTERS: &[u8] = &[5, 7];

const LOG_FORMATS: &[&str] = &["text", "json"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,

    /// Portal conventions
    #[serde(default)]
    pub portal: PortalConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

/// Portal conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Semesters whose sessions require library clearance by default
    pub library_semesters: Vec<u8>,

    /// Defaults for notices created with a session
    #[serde(default)]
    pub notice: NoticeConfig,
}

/// Defaults for notices created with a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeConfig {
    pub kind: String,
    pub priority: String,
    pub target_audience: String,
    pub signed_by: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            library_semesters: DEFAULT_LIBRARY_SEMESTERS.to_vec(),
            notice: NoticeConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Whether sessions for `semester` require library clearance by default
    pub fn library_required_for(&self, semester: u8) -> bool {
        self.library_semesters.contains(&semester)
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive for the configured level; verbose forces debug
    pub fn filter_directive(&self, verbose: bool) -> String {
        if verbose {
            String::from("campusreg=debug,info")
        } else {
            format!("campusreg={},warn", self.level.trim().to_lowercase())
        }
    }
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            kind: String::from("academic"),
            priority: String::from("high"),
            target_audience: String::from("students"),
            signed_by: String::from("Registrar"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("CAMPUSREG_API_URL").unwrap_or_else(|_| defaults.api.base_url.clone());

        let request_timeout_secs = std::env::var("CAMPUSREG_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.api.request_timeout_secs);

        let user_agent =
            std::env::var("CAMPUSREG_USER_AGENT").unwrap_or_else(|_| defaults.api.user_agent.clone());

        let library_semesters = match std::env::var("CAMPUSREG_LIBRARY_SEMESTERS") {
            Ok(raw) => parse_semester_list(&raw)
                .with_context(|| format!("Invalid CAMPUSREG_LIBRARY_SEMESTERS: {raw}"))?,
            Err(_) => defaults.portal.library_semesters.clone(),
        };

        let signed_by = std::env::var("CAMPUSREG_NOTICE_SIGNED_BY")
            .unwrap_or_else(|_| defaults.portal.notice.signed_by.clone());

        let log_level =
            std::env::var("CAMPUSREG_LOG_LEVEL").unwrap_or_else(|_| defaults.logging.level.clone());
        let log_format = std::env::var("CAMPUSREG_LOG_FORMAT")
            .unwrap_or_else(|_| defaults.logging.format.clone());

        Ok(Self {
            api: ApiConfig {
                base_url,
                request_timeout_secs,
                user_agent,
            },
            portal: PortalConfig {
                library_semesters,
                notice: NoticeConfig {
                    signed_by,
                    ..defaults.portal.notice
                },
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if let Some(bad) = self
            .portal
            .library_semesters
            .iter()
            .find(|s| !(MIN_SEMESTER..=MAX_SEMESTER).contains(*s))
        {
            anyhow::bail!("library_semesters contains out-of-range semester {bad}");
        }

        if self.portal.notice.signed_by.trim().is_empty() {
            anyhow::bail!("notice.signed_by must not be empty");
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "logging.format must be one of {}, got {}",
                LOG_FORMATS.join(", "),
                self.logging.format
            );
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Whether sessions for `semester` require library clearance by default
    pub fn library_required_for(&self, semester: u8) -> bool {
        self.portal.library_required_for(semester)
    }

    /// HTTP client settings derived from this config
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api.base_url.clone())
            .with_timeout(self.request_timeout())
            .with_user_agent(self.api.user_agent.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: String::from("http://localhost:5000/api"),
                request_timeout_secs: 15,
                user_agent: format!("campusreg/{}", env!("CARGO_PKG_VERSION")),
            },
            portal: PortalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn parse_semester_list(raw: &str) -> Result<Vec<u8>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("not a semester number: {s}"))
        })
        .collect()
}
