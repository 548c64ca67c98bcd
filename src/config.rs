//! Configuration management for bima-sahayak.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults so the service runs (with mock audio and no policy store)
//! straight out of the box.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElevenLabsConfig {
    /// API key; when absent, `ELEVENLABS_API_KEY` is consulted, then mock
    /// audio is used.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.elevenlabs.io/v1/text-to-speech".into(),
            model_id: "eleven_monolingual_v1".into(),
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyStoreConfig {
    /// Base URL of the hosted database (PostgREST-style endpoint).
    pub url: String,
    pub anon_key: String,
}

impl Default for PolicyStoreConfig {
    fn default() -> Self {
        Self {
            url: "https://zucviqweznzmzzzuhxfg.supabase.co".into(),
            anon_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Hard cap on voice capture length in seconds.
    pub max_duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration: 10.0,
            sample_rate: 16000,
            channels: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Ceiling on waiting for playback to make progress, in seconds.
    pub start_timeout: f64,
    /// Absolute ceiling on one playback attempt, in seconds.
    pub max_duration: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_timeout: 5.0,
            max_duration: 10.0,
        }
    }
}

/// Undocumented business constants behind the plan recommendation. Kept as
/// configuration rather than derived: there is no known formula.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanTuning {
    pub senior_premium_ceiling: u32,
    pub family_premium_ceiling: u32,
    pub individual_premium_ceiling: u32,
    pub value_discount: u32,
    pub value_premium_floor: u32,
    pub premium_uplift: u32,
    pub premium_ceiling: u32,
    pub value_coverage_delta: i64,
    pub premium_coverage_delta: i64,
}

impl Default for PlanTuning {
    fn default() -> Self {
        Self {
            senior_premium_ceiling: 12000,
            family_premium_ceiling: 15000,
            individual_premium_ceiling: 8000,
            value_discount: 3000,
            value_premium_floor: 5000,
            premium_uplift: 5000,
            premium_ceiling: 50000,
            value_coverage_delta: -2,
            premium_coverage_delta: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub elevenlabs: ElevenLabsConfig,
    pub policy_store: PolicyStoreConfig,
    pub recording: RecordingConfig,
    pub playback: PlaybackConfig,
    pub plans: PlanTuning,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/bima-sahayak/config.yaml
    /// 3. /etc/bima-sahayak/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/bima-sahayak/config.yaml")),
                Some(PathBuf::from("/etc/bima-sahayak/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults_elsewhere() {
        let config: Config = serde_yml::from_str("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.plans.senior_premium_ceiling, 12000);
        assert_eq!(config.elevenlabs.model_id, "eleven_monolingual_v1");
    }

    #[test]
    fn plan_tuning_defaults_match_business_literals() {
        let tuning = PlanTuning::default();
        assert_eq!(tuning.family_premium_ceiling, 15000);
        assert_eq!(tuning.individual_premium_ceiling, 8000);
        assert_eq!(tuning.value_coverage_delta, -2);
        assert_eq!(tuning.premium_coverage_delta, 5);
    }
}
