// =============================================================================
// Adviser Configuration: JSON file with per-field defaults and atomic save
// =============================================================================
//
// Every field carries `#[serde(default)]` so a partial or older file still
// loads. Environment variables override the file; CLI flags override both.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::market_data::coingecko::DEFAULT_BASE_URL;
use crate::pipeline::PipelineConfig;

pub const DEFAULT_CONFIG_PATH: &str = "adviser_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_days() -> u32 {
    30
}

fn default_chart_dir() -> String {
    "charts".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3001".to_string()
}

// =============================================================================
// AdviserConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviserConfig {
    // --- Market data ---------------------------------------------------------

    /// CoinGecko API root, without a trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Upper bound on a single market-data request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Lookback used when the caller does not give one.
    #[serde(default = "default_days")]
    pub default_days: u32,

    // --- Output --------------------------------------------------------------

    #[serde(default = "default_chart_dir")]
    pub chart_dir: String,

    /// Add the MACD panel to rendered charts.
    #[serde(default = "default_true")]
    pub show_macd: bool,

    // --- Service -------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Indicators ----------------------------------------------------------

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for AdviserConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_days: default_days(),
            chart_dir: default_chart_dir(),
            show_macd: true,
            bind_addr: default_bind_addr(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AdviserConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults with
    /// a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            policy = %config.pipeline.policy,
            default_days = config.default_days,
            "adviser config loaded"
        );

        Ok(config)
    }

    /// Persist to `path` via a `.tmp` sibling and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "adviser config saved (atomic)");
        Ok(())
    }

    /// Apply `ADVISER_API_BASE_URL` and `ADVISER_BIND_ADDR` when set.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("ADVISER_API_BASE_URL").ok(),
            std::env::var("ADVISER_BIND_ADDR").ok(),
        );
    }

    fn apply_overrides(&mut self, api_base_url: Option<String>, bind_addr: Option<String>) {
        if let Some(url) = api_base_url.filter(|s| !s.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(addr) = bind_addr.filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalPolicy;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AdviserConfig::default();
        assert_eq!(cfg.api_base_url, "https://api.coingecko.com/api/v3");
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.default_days, 30);
        assert!(cfg.show_macd);
        assert_eq!(cfg.pipeline, PipelineConfig::default());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AdviserConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AdviserConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "default_days": 90, "pipeline": { "policy": "simple", "long_window": 50 } }"#;
        let cfg: AdviserConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.default_days, 90);
        assert_eq!(cfg.pipeline.policy, SignalPolicy::Simple);
        assert_eq!(cfg.pipeline.long_window, 50);
        assert_eq!(cfg.pipeline.short_window, 5);
        assert_eq!(cfg.chart_dir, "charts");
    }

    #[test]
    fn quote_currency_is_not_configurable() {
        // Every printed price is labelled USD, so older files naming another
        // currency must not change what gets fetched.
        let cfg: AdviserConfig = serde_json::from_str(r#"{ "vs_currency": "eur" }"#).unwrap();
        assert_eq!(cfg, AdviserConfig::default());
        let json = serde_json::to_value(&cfg).unwrap();
        assert!(json.get("vs_currency").is_none());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("adviser-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("adviser_config.json");

        let mut cfg = AdviserConfig::default();
        cfg.default_days = 45;
        cfg.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = AdviserConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(AdviserConfig::load("/nonexistent/adviser_config.json").is_err());
    }

    #[test]
    fn overrides_ignore_blank_values() {
        let mut cfg = AdviserConfig::default();
        cfg.apply_overrides(Some("  ".into()), Some("0.0.0.0:8080".into()));
        assert_eq!(cfg.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn timeout_is_at_least_one_second() {
        let cfg = AdviserConfig {
            request_timeout_secs: 0,
            ..AdviserConfig::default()
        };
        assert_eq!(cfg.request_timeout(), std::time::Duration::from_secs(1));
    }
}
