use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::{FusionWeights, LevelPolicy, ScoringConfig};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// MySQL database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between snapshot refresh cycles
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Number of most similar users feeding the user-based signal
    #[serde(default = "default_neighbor_count")]
    pub neighbor_count: usize,

    /// Recommendations returned when the caller does not ask for a count
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_user_weight")]
    pub user_weight: f64,

    #[serde(default = "default_item_weight")]
    pub item_weight: f64,

    #[serde(default = "default_behavior_weight")]
    pub behavior_weight: f64,

    /// Multiplier applied to the session level ordinal
    #[serde(default = "default_level_amplification")]
    pub level_amplification: u32,

    /// How many times the level token is repeated in a session's text
    #[serde(default = "default_level_repeat")]
    pub level_repeat: usize,
}

fn default_database_url() -> String {
    "mysql://fit@localhost:3306/fit".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_refresh_interval_secs() -> u64 {
    600
}

fn default_neighbor_count() -> usize {
    ScoringConfig::default().neighbor_count
}

fn default_top_n() -> usize {
    ScoringConfig::default().top_n
}

fn default_user_weight() -> f64 {
    FusionWeights::default().user
}

fn default_item_weight() -> f64 {
    FusionWeights::default().item
}

fn default_behavior_weight() -> f64 {
    FusionWeights::default().behavior
}

fn default_level_amplification() -> u32 {
    LevelPolicy::default().amplification
}

fn default_level_repeat() -> usize {
    LevelPolicy::default().repeat
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the scorer or refresher cannot work with
    pub fn validate(&self) -> AppResult<()> {
        let weights = [
            ("user_weight", self.user_weight),
            ("item_weight", self.item_weight),
            ("behavior_weight", self.behavior_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.neighbor_count == 0 {
            return Err(AppError::Config("neighbor_count must be at least 1".to_string()));
        }
        if self.top_n == 0 {
            return Err(AppError::Config("top_n must be at least 1".to_string()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(AppError::Config(
                "refresh_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            neighbor_count: self.neighbor_count,
            top_n: self.top_n,
            weights: FusionWeights {
                user: self.user_weight,
                item: self.item_weight,
                behavior: self.behavior_weight,
            },
        }
    }

    pub fn level_policy(&self) -> LevelPolicy {
        LevelPolicy {
            amplification: self.level_amplification,
            repeat: self.level_repeat,
            ..LevelPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        envy::from_iter::<_, Config>(Vec::<(String, String)>::new()).unwrap()
    }

    #[test]
    fn test_defaults_match_reference_policy() {
        let config = defaults();
        assert_eq!(config.refresh_interval(), Duration::from_secs(600));

        let scoring = config.scoring();
        assert_eq!(scoring.neighbor_count, 5);
        assert_eq!(scoring.top_n, 5);
        assert_eq!(scoring.weights.user, 0.5);
        assert_eq!(scoring.weights.item, 0.1);
        assert_eq!(scoring.weights.behavior, 0.4);

        let level = config.level_policy();
        assert_eq!(level.amplification, 2);
        assert_eq!(level.repeat, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("ITEM_WEIGHT".to_string(), "0.3".to_string()),
            ("BEHAVIOR_WEIGHT".to_string(), "0.2".to_string()),
            ("NEIGHBOR_COUNT".to_string(), "10".to_string()),
        ];
        let config = envy::from_iter::<_, Config>(vars).unwrap();
        let scoring = config.scoring();
        assert_eq!(scoring.weights.item, 0.3);
        assert_eq!(scoring.weights.behavior, 0.2);
        assert_eq!(scoring.neighbor_count, 10);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = defaults();
        config.item_weight = -0.1;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_neighbor_count_rejected() {
        let mut config = defaults();
        config.neighbor_count = 0;
        assert!(config.validate().is_err());
    }
}
