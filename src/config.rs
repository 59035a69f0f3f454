use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

const DEFAULT_CONFIG_PATH: &str = "stress_lens.toml";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8787";

/// Main configuration structure loaded from stress_lens.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub oracle: OracleConfig,
    pub report: ReportConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Settings for the remote classification service
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OracleConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    /// Transport timeout for a single HTTP exchange with the oracle
    pub timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.2,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Page geometry for exported reports, in PDF points (1/72 inch)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub line_height: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        // A4 portrait
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 56.0,
            title_size: 18.0,
            heading_size: 13.0,
            body_size: 11.0,
            line_height: 15.0,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub api_key: Option<String>,
    pub log_level: String,
    pub http_bind: SocketAddr,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            log_level: crate::logging::DEFAULT_LOG_FILTER.to_string(),
            http_bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses STRESS_LENS_CONFIG environment variable or defaults to "stress_lens.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("STRESS_LENS_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = std::env::var("STRESS_LENS_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply env-first overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.oracle.model = model;
            tracing::debug!("GEMINI_MODEL env override applied");
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            self.oracle.base_url = base_url;
            tracing::debug!("GEMINI_BASE_URL env override applied");
        }
        if let Some(timeout_ms) = lookup("GEMINI_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.oracle.timeout_ms = timeout_ms;
        }

        self.runtime.api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("GOOGLE_API_KEY"))
            .filter(|key| !key.trim().is_empty());

        if let Some(level) = lookup("STRESS_LENS_LOG") {
            self.runtime.log_level = level;
        }

        let bind = lookup("STRESS_LENS_HTTP_BIND").unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());
        match bind.parse::<SocketAddr>() {
            Ok(addr) => self.runtime.http_bind = addr,
            Err(_) => tracing::warn!(
                "STRESS_LENS_HTTP_BIND '{}' is not a socket address, keeping {}",
                bind,
                self.runtime.http_bind
            ),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.oracle.model.trim().is_empty() {
            anyhow::bail!("oracle.model must not be empty");
        }
        if !self.oracle.base_url.starts_with("http://") && !self.oracle.base_url.starts_with("https://")
        {
            anyhow::bail!("oracle.base_url must start with http:// or https://");
        }
        let r = &self.report;
        for (name, value) in [
            ("page_width", r.page_width),
            ("page_height", r.page_height),
            ("title_size", r.title_size),
            ("heading_size", r.heading_size),
            ("body_size", r.body_size),
            ("line_height", r.line_height),
        ] {
            if value.is_nan() || value <= 0.0 {
                anyhow::bail!("report.{} must be > 0", name);
            }
        }
        if r.margin < 0.0 || r.margin * 2.0 >= r.page_width.min(r.page_height) {
            anyhow::bail!("report.margin leaves no printable area");
        }
        // Header, one heading with one body line, and the footer must fit on a page.
        let needed = r.title_size * 2.0 + r.heading_size * 2.0 + r.line_height * 3.0;
        if r.page_height - 2.0 * r.margin < needed {
            anyhow::bail!("report.page_height is too small for the configured font sizes");
        }
        Ok(())
    }
}
