//! Application configuration.
//!
//! Built once at process start from environment variables and passed by
//! reference to each component.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::resolver::DEFAULT_PUBCHEM_BASE_URL;

/// Default timeout for outbound calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Interaction store settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub dataset_path: PathBuf,
}

/// PubChem resolver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PubChemConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Generative text API settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Animation request settings (client side).
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

/// Video generation service settings (server side).
#[derive(Debug, Clone, PartialEq)]
pub struct VideoServiceConfig {
    pub port: u16,
    pub work_dir: PathBuf,
    pub manim_bin: String,
    /// A render running longer than this is killed
    pub render_timeout: Duration,
    /// Directory for the local object store
    pub store_dir: PathBuf,
    /// Public URL prefix for files in `store_dir`
    pub public_url: String,
    /// Remote object store endpoint; local storage is used when unset
    pub object_store_url: Option<String>,
    pub object_store_token: Option<String>,
    /// How long a request waits for a render before answering "pending"
    pub respond_within: Duration,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub profile_path: PathBuf,
    pub pubchem: PubChemConfig,
    pub gemini: GeminiConfig,
    pub animation: AnimationConfig,
    pub video: VideoServiceConfig,
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let string = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let path = |key: &str, default: &str| PathBuf::from(string(key, default));
        let secs = |key: &str, default: u64| -> ConfigResult<Duration> {
            Ok(Duration::from_secs(parse_or(&get, key, default)?))
        };

        let port: u16 = parse_or(&get, "DDI_VIDEO_PORT", 3000)?;

        Ok(Self {
            store: StoreConfig {
                database_path: path("DDI_DATABASE_PATH", "ddi.sqlite3"),
                dataset_path: path("DDI_DATASET_PATH", "dataset/twosides_aggregated.csv"),
            },
            profile_path: path("DDI_PROFILE_PATH", "profile.json"),
            pubchem: PubChemConfig {
                base_url: string("PUBCHEM_BASE_URL", DEFAULT_PUBCHEM_BASE_URL),
                timeout: secs("PUBCHEM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            },
            gemini: GeminiConfig {
                api_key: get("GEMINI_API_KEY"),
                model: string("GEMINI_MODEL", "gemini-2.0-flash"),
                base_url: string(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com/v1beta",
                ),
                timeout: secs("GEMINI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            },
            animation: AnimationConfig {
                endpoint: string(
                    "DDI_VIDEO_ENDPOINT",
                    &format!("http://localhost:{}/generate-video", port),
                ),
                timeout: secs("DDI_VIDEO_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            },
            video: VideoServiceConfig {
                port,
                work_dir: path("DDI_VIDEO_WORK_DIR", "render"),
                manim_bin: string("MANIM_BIN", "manim"),
                render_timeout: secs("DDI_RENDER_TIMEOUT_SECS", 300)?,
                store_dir: path("DDI_VIDEO_STORE_DIR", "videos"),
                public_url: string(
                    "DDI_VIDEO_PUBLIC_URL",
                    &format!("http://localhost:{}/videos", port),
                ),
                object_store_url: get("DDI_OBJECT_STORE_URL"),
                object_store_token: get("DDI_OBJECT_STORE_TOKEN"),
                respond_within: secs("DDI_VIDEO_RESPOND_WITHIN_SECS", 10)?,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> ConfigResult<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
