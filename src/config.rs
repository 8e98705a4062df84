use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the harvester and analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API keys, rotated on quota failures. Order matters.
    pub api_keys: Vec<String>,

    /// Scan aggressiveness, mapped to target fetch counts.
    pub scan_mode: ScanMode,

    /// Filter thresholds
    pub filters: FilterConfig,

    /// Network settings
    pub network: NetworkConfig,

    /// Storage for history files
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Only consider videos published within this many days.
    pub days_back: i64,

    /// Minimum view count.
    pub min_views: u64,

    /// Maximum channel subscriber count; 0 disables the subscriber filter.
    pub max_subscribers: u64,

    /// Minimum video duration in seconds.
    pub min_duration_seconds: u64,

    /// Maximum video duration in seconds; omit for no upper bound.
    pub max_duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds.
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for search-log and download-history files.
    pub data_dir: PathBuf,
}

/// How hard to hit the search quota. Targets differ between the video
/// research flow and the keyword flow: keyword statistics need a larger
/// sample to clear the frequency gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Light,
    Standard,
    Aggressive,
    Max,
}

impl ScanMode {
    /// Target item count for the video research flow.
    pub fn research_target(&self) -> usize {
        match self {
            ScanMode::Light => 50,
            ScanMode::Standard => 150,
            ScanMode::Aggressive => 500,
            ScanMode::Max => 2000,
        }
    }

    /// Target item count for the keyword analysis flow.
    pub fn keyword_target(&self) -> usize {
        match self {
            ScanMode::Light => 200,
            ScanMode::Standard => 500,
            ScanMode::Aggressive => 1000,
            ScanMode::Max => 1500,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "light" => Ok(ScanMode::Light),
            "standard" => Ok(ScanMode::Standard),
            "aggressive" => Ok(ScanMode::Aggressive),
            "max" => Ok(ScanMode::Max),
            other => Err(anyhow!("unknown scan mode: {}", other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanMode::Light => "light",
            ScanMode::Standard => "standard",
            ScanMode::Aggressive => "aggressive",
            ScanMode::Max => "max",
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, falling back
    /// to environment variables over the defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "yt-intel.toml",
            "config/yt-intel.toml",
            "~/.config/yt-intel/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("loaded configuration from {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Build configuration from environment variables on top of defaults.
    /// `YT_INTEL_API_KEYS` takes keys separated by commas or newlines.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(keys) = std::env::var("YT_INTEL_API_KEYS") {
            config.api_keys = keys
                .split(|c| c == ',' || c == '\n')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
        if let Ok(mode) = std::env::var("YT_INTEL_SCAN_MODE") {
            config.scan_mode = ScanMode::from_name(&mode)?;
        }
        if let Ok(views) = std::env::var("YT_INTEL_MIN_VIEWS") {
            config.filters.min_views = views.parse().unwrap_or(config.filters.min_views);
        }
        if let Ok(subs) = std::env::var("YT_INTEL_MAX_SUBS") {
            config.filters.max_subscribers = subs.parse().unwrap_or(0);
        }
        if let Ok(days) = std::env::var("YT_INTEL_DAYS_BACK") {
            config.filters.days_back = days.parse().unwrap_or(config.filters.days_back);
        }
        if let Ok(dir) = std::env::var("YT_INTEL_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("configuration saved to {}", path);
        Ok(())
    }

    /// Validate configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if self.api_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(anyhow!("at least one API key is required"));
        }
        if self.filters.days_back <= 0 {
            return Err(anyhow!("days_back must be positive"));
        }
        if let Some(max) = self.filters.max_duration_seconds {
            if max < self.filters.min_duration_seconds {
                return Err(anyhow!(
                    "max_duration_seconds must not be below min_duration_seconds"
                ));
            }
        }
        if self.network.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            scan_mode: ScanMode::Standard,
            filters: FilterConfig {
                days_back: 30,
                min_views: 1000,
                max_subscribers: 0,
                min_duration_seconds: 58 * 60,
                max_duration_seconds: None,
            },
            network: NetworkConfig {
                request_timeout_seconds: 30,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan_mode, ScanMode::Standard);
        assert_eq!(config.filters.min_views, 1000);
        assert_eq!(config.filters.max_subscribers, 0);
        assert!(config.filters.max_duration_seconds.is_none());
    }

    #[test]
    fn test_scan_mode_targets() {
        assert_eq!(ScanMode::Light.research_target(), 50);
        assert_eq!(ScanMode::Max.research_target(), 2000);
        assert_eq!(ScanMode::Light.keyword_target(), 200);
        assert_eq!(ScanMode::Max.keyword_target(), 1500);
    }

    #[test]
    fn test_scan_mode_parsing() {
        assert_eq!(ScanMode::from_name("AGGRESSIVE").unwrap(), ScanMode::Aggressive);
        assert!(ScanMode::from_name("turbo").is_err());
    }

    #[test]
    fn test_validation_requires_keys() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api_keys = vec!["key".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_inverted_duration_range() {
        let mut config = Config::default();
        config.api_keys = vec!["key".to_string()];
        config.filters.min_duration_seconds = 600;
        config.filters.max_duration_seconds = Some(60);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let mut config = Config::default();
        config.api_keys = vec!["a".to_string(), "b".to_string()];
        config.scan_mode = ScanMode::Max;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api_keys.len(), 2);
        assert_eq!(parsed.scan_mode, ScanMode::Max);
    }
}
