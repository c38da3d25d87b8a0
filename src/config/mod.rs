//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RISKGATE_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::detector::DEFAULT_DETECTOR_TIMEOUT_MS;
use crate::engine::{DEFAULT_SKIN_RATIO_TRIGGER, DEFAULT_TEXT_ESCALATION_FLOOR, EngineConfig};
use crate::reviewer::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_COOLDOWN_SECS};
use crate::reviewer::limiter::{DEFAULT_RATE_LIMIT_PER_MINUTE, MAX_RATE_LIMIT_PER_MINUTE};
use crate::reviewer::openai::{DEFAULT_REVIEWER_MODEL, DEFAULT_REVIEWER_URL};
use crate::reviewer::{BackendConfig, DEFAULT_REVIEWER_TIMEOUT_MS, GatewayConfig};

/// Default policy file used when `RISKGATE_POLICY_PATH` is not set.
pub const DEFAULT_POLICY_PATH: &str = "./configs/rules.yaml";

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RISKGATE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Policy YAML. Default: `./configs/rules.yaml`.
    pub policy_path: PathBuf,

    /// Detector sidecar endpoint. No default; the binary requires it.
    pub detector_url: Option<String>,

    /// Detector request timeout. Default: `5000`.
    pub detector_timeout_ms: u64,

    /// OpenAI-compatible base URL for the semantic reviewer.
    pub reviewer_url: String,

    /// Reviewer API key (`RISKGATE_REVIEWER_API_KEY`, then `DASHSCOPE_API_KEY`).
    /// Without one the gateway runs disabled.
    pub reviewer_api_key: Option<String>,

    /// Reviewer model name. Default: `qwen-vl-plus`.
    pub reviewer_model: String,

    /// Opt-out switch for the reviewer. Default: `true`.
    pub reviewer_enabled: bool,

    /// Per-call reviewer timeout. Default: `8000`.
    pub reviewer_timeout_ms: u64,

    /// Verdict cache TTL. Default: `300`.
    pub cache_ttl_secs: u64,

    /// Window in which a cached verdict is served without a new call. Default: `15`.
    pub cache_cooldown_secs: u64,

    /// Max verdict cache entries. Default: `10_000`.
    pub cache_capacity: u64,

    /// Remote reviewer calls allowed per 60 s. Default: `20`.
    pub rate_limit_per_minute: usize,

    /// Skin ratio above which the visual review runs. Default: `0.18`.
    pub skin_ratio_trigger: f32,

    /// Minimum rule score for text escalation. Default: `0`.
    pub text_escalation_floor: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy_path: PathBuf::from(DEFAULT_POLICY_PATH),
            detector_url: None,
            detector_timeout_ms: DEFAULT_DETECTOR_TIMEOUT_MS,
            reviewer_url: DEFAULT_REVIEWER_URL.to_string(),
            reviewer_api_key: None,
            reviewer_model: DEFAULT_REVIEWER_MODEL.to_string(),
            reviewer_enabled: true,
            reviewer_timeout_ms: DEFAULT_REVIEWER_TIMEOUT_MS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_cooldown_secs: DEFAULT_COOLDOWN_SECS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            skin_ratio_trigger: DEFAULT_SKIN_RATIO_TRIGGER,
            text_escalation_floor: DEFAULT_TEXT_ESCALATION_FLOOR,
        }
    }
}

impl Config {
    const ENV_POLICY_PATH: &'static str = "RISKGATE_POLICY_PATH";
    const ENV_DETECTOR_URL: &'static str = "RISKGATE_DETECTOR_URL";
    const ENV_DETECTOR_TIMEOUT_MS: &'static str = "RISKGATE_DETECTOR_TIMEOUT_MS";
    const ENV_REVIEWER_URL: &'static str = "RISKGATE_REVIEWER_URL";
    const ENV_REVIEWER_API_KEY: &'static str = "RISKGATE_REVIEWER_API_KEY";
    const ENV_DASHSCOPE_API_KEY: &'static str = "DASHSCOPE_API_KEY";
    const ENV_REVIEWER_MODEL: &'static str = "RISKGATE_REVIEWER_MODEL";
    const ENV_REVIEWER_ENABLED: &'static str = "RISKGATE_REVIEWER_ENABLED";
    const ENV_REVIEWER_TIMEOUT_MS: &'static str = "RISKGATE_REVIEWER_TIMEOUT_MS";
    const ENV_CACHE_TTL_SECS: &'static str = "RISKGATE_CACHE_TTL_SECS";
    const ENV_CACHE_COOLDOWN_SECS: &'static str = "RISKGATE_CACHE_COOLDOWN_SECS";
    const ENV_CACHE_CAPACITY: &'static str = "RISKGATE_CACHE_CAPACITY";
    const ENV_RATE_LIMIT_PER_MINUTE: &'static str = "RISKGATE_RATE_LIMIT_PER_MINUTE";
    const ENV_SKIN_RATIO_TRIGGER: &'static str = "RISKGATE_SKIN_RATIO_TRIGGER";
    const ENV_TEXT_ESCALATION_FLOOR: &'static str = "RISKGATE_TEXT_ESCALATION_FLOOR";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let reviewer_api_key = Self::parse_optional_string_from_env(Self::ENV_REVIEWER_API_KEY)
            .or_else(|| Self::parse_optional_string_from_env(Self::ENV_DASHSCOPE_API_KEY));

        Ok(Self {
            policy_path: Self::parse_path_from_env(Self::ENV_POLICY_PATH, defaults.policy_path),
            detector_url: Self::parse_optional_string_from_env(Self::ENV_DETECTOR_URL),
            detector_timeout_ms: Self::parse_from_env(
                Self::ENV_DETECTOR_TIMEOUT_MS,
                defaults.detector_timeout_ms,
            )?,
            reviewer_url: Self::parse_string_from_env(Self::ENV_REVIEWER_URL, defaults.reviewer_url),
            reviewer_api_key,
            reviewer_model: Self::parse_string_from_env(
                Self::ENV_REVIEWER_MODEL,
                defaults.reviewer_model,
            ),
            reviewer_enabled: Self::parse_bool_from_env(
                Self::ENV_REVIEWER_ENABLED,
                defaults.reviewer_enabled,
            )?,
            reviewer_timeout_ms: Self::parse_from_env(
                Self::ENV_REVIEWER_TIMEOUT_MS,
                defaults.reviewer_timeout_ms,
            )?,
            cache_ttl_secs: Self::parse_from_env(Self::ENV_CACHE_TTL_SECS, defaults.cache_ttl_secs)?,
            cache_cooldown_secs: Self::parse_from_env(
                Self::ENV_CACHE_COOLDOWN_SECS,
                defaults.cache_cooldown_secs,
            )?,
            cache_capacity: Self::parse_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?,
            rate_limit_per_minute: Self::parse_from_env(
                Self::ENV_RATE_LIMIT_PER_MINUTE,
                defaults.rate_limit_per_minute,
            )?,
            skin_ratio_trigger: Self::parse_from_env(
                Self::ENV_SKIN_RATIO_TRIGGER,
                defaults.skin_ratio_trigger,
            )?,
            text_escalation_floor: Self::parse_from_env(
                Self::ENV_TEXT_ESCALATION_FLOOR,
                defaults.text_escalation_floor,
            )?,
        })
    }

    /// Checks cross-field invariants (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CACHE_TTL_SECS,
                reason: "must be positive".to_string(),
            });
        }

        if self.cache_cooldown_secs > self.cache_ttl_secs {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CACHE_COOLDOWN_SECS,
                reason: format!(
                    "cooldown {}s exceeds TTL {}s",
                    self.cache_cooldown_secs, self.cache_ttl_secs
                ),
            });
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CACHE_CAPACITY,
                reason: "must be positive".to_string(),
            });
        }

        if self.rate_limit_per_minute == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RATE_LIMIT_PER_MINUTE,
                reason: "must be positive".to_string(),
            });
        }

        if self.rate_limit_per_minute > MAX_RATE_LIMIT_PER_MINUTE {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RATE_LIMIT_PER_MINUTE,
                reason: format!("must not exceed {MAX_RATE_LIMIT_PER_MINUTE}"),
            });
        }

        if self.reviewer_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_REVIEWER_TIMEOUT_MS,
                reason: "must be positive".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.skin_ratio_trigger) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SKIN_RATIO_TRIGGER,
                reason: format!("{} not in [0, 1]", self.skin_ratio_trigger),
            });
        }

        if self.reviewer_url.trim().is_empty() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_REVIEWER_URL,
                reason: "must not be empty".to_string(),
            });
        }

        if self.policy_path.exists() && !self.policy_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.policy_path.clone(),
            });
        }

        Ok(())
    }

    /// Detector endpoint, or [`ConfigError::MissingEnvVar`] when unset.
    pub fn require_detector_url(&self) -> Result<&str, ConfigError> {
        self.detector_url
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_DETECTOR_URL,
            })
    }

    pub fn detector_timeout(&self) -> Duration {
        Duration::from_millis(self.detector_timeout_ms)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            enabled: self.reviewer_enabled,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cooldown: Duration::from_secs(self.cache_cooldown_secs),
            cache_capacity: self.cache_capacity,
            rate_limit_per_minute: self.rate_limit_per_minute,
            call_timeout: Duration::from_millis(self.reviewer_timeout_ms),
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.reviewer_url.clone(),
            api_key: self.reviewer_api_key.clone(),
            model: self.reviewer_model.clone(),
            ..Default::default()
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .skin_ratio_trigger(self.skin_ratio_trigger)
            .text_escalation_floor(self.text_escalation_floor)
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected a boolean".to_string(),
                }),
            },
            None => Ok(default),
        }
    }
}
