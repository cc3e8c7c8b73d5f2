use crate::error::Result;
use crate::io;
use crate::types::FacilityKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// WeatherConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the gateway weather service. When unset, the static
    /// offline provider is used.
    #[serde(default)]
    pub base_url: Option<String>,
}

// ---------------------------------------------------------------------------
// GodownConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GodownConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Minutes before a pending action can no longer be confirmed.
    #[serde(default = "default_pending_ttl_minutes")]
    pub pending_ttl_minutes: i64,
    /// Capacity assumed when a new facility doesn't state one, in quintals.
    #[serde(default = "default_capacity_quintals")]
    pub default_capacity_quintals: f64,
    #[serde(default)]
    pub default_facility_kind: FacilityKind,
    /// Most-recent lots shown in read context.
    #[serde(default = "default_max_context_lots")]
    pub max_context_lots: usize,
    /// Most-recent unresolved alerts shown in read context.
    #[serde(default = "default_max_context_alerts")]
    pub max_context_alerts: usize,
    #[serde(default)]
    pub weather: WeatherConfig,
}

fn default_version() -> u32 {
    1
}

fn default_pending_ttl_minutes() -> i64 {
    5
}

fn default_capacity_quintals() -> f64 {
    500.0
}

fn default_max_context_lots() -> usize {
    20
}

fn default_max_context_alerts() -> usize {
    15
}

impl Default for GodownConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            pending_ttl_minutes: default_pending_ttl_minutes(),
            default_capacity_quintals: default_capacity_quintals(),
            default_facility_kind: FacilityKind::default(),
            max_context_lots: default_max_context_lots(),
            max_context_alerts: default_max_context_alerts(),
            weather: WeatherConfig::default(),
        }
    }
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(".godown").join("config.yaml")
}

impl GodownConfig {
    pub fn pending_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.pending_ttl_minutes)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(config_path(root))?;
        let config: GodownConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    /// Load the config if present, else fall back to defaults.
    pub fn load_or_default(root: &Path) -> Self {
        Self::load(root).unwrap_or_default()
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&config_path(root), data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
