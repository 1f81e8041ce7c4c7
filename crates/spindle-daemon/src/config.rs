//! Configuration file management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Defaults applied to newly created campaigns.
    #[serde(default)]
    pub campaign_defaults: CampaignDefaults,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

/// Campaign defaults used when a create request omits a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDefaults {
    /// Regular spins per cooldown window.
    #[serde(default = "default_spin_limit")]
    pub spin_limit: u32,
    /// Cooldown window in hours.
    #[serde(default = "default_cooldown_hours")]
    pub spin_cooldown_hours: u32,
    /// Referrals per bonus spin. 0 disables referral bonuses.
    #[serde(default = "default_referrals_per_spin")]
    pub referrals_required_for_spin: u32,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_spin_limit() -> u32 {
    spindle_types::DEFAULT_SPIN_LIMIT
}

fn default_cooldown_hours() -> u32 {
    spindle_types::DEFAULT_COOLDOWN_HOURS
}

fn default_referrals_per_spin() -> u32 {
    spindle_types::DEFAULT_REFERRALS_PER_SPIN
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: String::new() }
    }
}

impl Default for CampaignDefaults {
    fn default() -> Self {
        Self {
            spin_limit: default_spin_limit(),
            spin_cooldown_hours: default_cooldown_hours(),
            referrals_required_for_spin: default_referrals_per_spin(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: DaemonConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("SPINDLE_DATA_DIR") {
            return PathBuf::from(dir).join("config.toml");
        }
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("SPINDLE_DATA_DIR") {
            return PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".spindle"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/spindle"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.campaign_defaults.spin_limit, 1);
        assert_eq!(config.campaign_defaults.spin_cooldown_hours, 24);
        assert_eq!(config.campaign_defaults.referrals_required_for_spin, 3);
        assert_eq!(config.advanced.log_level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = DaemonConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let _parsed: DaemonConfig = toml::from_str(&toml_str).expect("parse");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: DaemonConfig =
            toml::from_str("[campaign_defaults]\nspin_limit = 2\n").expect("parse");
        assert_eq!(parsed.campaign_defaults.spin_limit, 2);
        assert_eq!(parsed.campaign_defaults.spin_cooldown_hours, 24);
    }
}
