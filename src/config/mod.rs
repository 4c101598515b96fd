//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `LOSTFOUND_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_IMAGE_WEIGHT, DEFAULT_MATCH_THRESHOLD, DEFAULT_REWARD_COINS,
    DEFAULT_TEXT_WEIGHT, DimConfig,
};
use crate::matching::MatchThreshold;
use crate::scoring::ScoringWeights;

/// File name of the store snapshot inside `storage_path`.
pub const SNAPSHOT_FILENAME: &str = "lostfound.json";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding the store snapshot. Default: `./.data`.
    pub storage_path: PathBuf,

    /// Directory uploaded report images are read from. Default: `./uploads`.
    pub upload_dir: PathBuf,

    /// Directory with CLIP `model.safetensors` + `tokenizer.json`. Unset means stub embedder.
    pub model_path: Option<PathBuf>,

    /// Embedding dimension shared by text and image vectors. Default: `512`.
    pub embedding_dim: usize,

    /// Threshold applied when a new report is matched. Default: `0.70`.
    pub match_threshold: f32,

    /// Weight of image similarity in the combined score. Default: `0.6`.
    pub image_weight: f32,

    /// Weight of text similarity in the combined score. Default: `0.4`.
    pub text_weight: f32,

    /// Coins credited to the finder on a confirmed return. Default: `100`.
    pub reward_coins: u64,

    /// Skip staging a match when one already exists for the same pair. Default: `true`.
    pub dedupe_matches: bool,

    /// Username ensured to exist as an administrator at startup. Unset means none.
    pub admin_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            upload_dir: PathBuf::from("./uploads"),
            model_path: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            image_weight: DEFAULT_IMAGE_WEIGHT,
            text_weight: DEFAULT_TEXT_WEIGHT,
            reward_coins: DEFAULT_REWARD_COINS,
            dedupe_matches: true,
            admin_username: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "LOSTFOUND_PORT";
    const ENV_BIND_ADDR: &'static str = "LOSTFOUND_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "LOSTFOUND_STORAGE_PATH";
    const ENV_UPLOAD_DIR: &'static str = "LOSTFOUND_UPLOAD_DIR";
    const ENV_MODEL_PATH: &'static str = "LOSTFOUND_MODEL_PATH";
    const ENV_EMBEDDING_DIM: &'static str = "LOSTFOUND_EMBEDDING_DIM";
    const ENV_MATCH_THRESHOLD: &'static str = "LOSTFOUND_MATCH_THRESHOLD";
    const ENV_IMAGE_WEIGHT: &'static str = "LOSTFOUND_IMAGE_WEIGHT";
    const ENV_TEXT_WEIGHT: &'static str = "LOSTFOUND_TEXT_WEIGHT";
    const ENV_REWARD_COINS: &'static str = "LOSTFOUND_REWARD_COINS";
    const ENV_DEDUPE_MATCHES: &'static str = "LOSTFOUND_DEDUPE_MATCHES";
    const ENV_ADMIN_USERNAME: &'static str = "LOSTFOUND_ADMIN_USERNAME";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            storage_path: Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path),
            upload_dir: Self::parse_path_from_env(Self::ENV_UPLOAD_DIR, defaults.upload_dir),
            model_path: Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH),
            embedding_dim: Self::parse_number_from_env(
                Self::ENV_EMBEDDING_DIM,
                defaults.embedding_dim,
            )?,
            match_threshold: Self::parse_number_from_env(
                Self::ENV_MATCH_THRESHOLD,
                defaults.match_threshold,
            )?,
            image_weight: Self::parse_number_from_env(
                Self::ENV_IMAGE_WEIGHT,
                defaults.image_weight,
            )?,
            text_weight: Self::parse_number_from_env(Self::ENV_TEXT_WEIGHT, defaults.text_weight)?,
            reward_coins: Self::parse_number_from_env(
                Self::ENV_REWARD_COINS,
                defaults.reward_coins,
            )?,
            dedupe_matches: Self::parse_bool_from_env(
                Self::ENV_DEDUPE_MATCHES,
                defaults.dedupe_matches,
            )?,
            admin_username: Self::parse_optional_string_from_env(Self::ENV_ADMIN_USERNAME),
        })
    }

    /// Validates numeric invariants and path kinds (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        DimConfig::new(self.embedding_dim).validate()?;
        self.match_threshold()?;
        self.scoring_weights()?;

        for dir in [&self.storage_path, &self.upload_dir] {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Location of the JSON store snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.storage_path.join(SNAPSHOT_FILENAME)
    }

    /// Report-path threshold as a validated [`MatchThreshold`].
    pub fn match_threshold(&self) -> Result<MatchThreshold, ConfigError> {
        MatchThreshold::new(self.match_threshold).ok_or(ConfigError::ThresholdOutOfRange {
            value: self.match_threshold,
        })
    }

    /// Image/text weights as validated [`ScoringWeights`].
    pub fn scoring_weights(&self) -> Result<ScoringWeights, ConfigError> {
        ScoringWeights::new(self.image_weight, self.text_weight).map_err(|e| {
            ConfigError::InvalidWeights {
                image: self.image_weight,
                text: self.text_weight,
                reason: e.reason(),
            }
        })
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    // Malformed numbers are errors, not fallbacks to the default.
    fn parse_number_from_env<T: std::str::FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: var_name,
                    value,
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
