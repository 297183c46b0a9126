use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_CONFIDENCE_SCALE: f64 = 3.0;
pub const SETTINGS_FILE: &str = "detector.toml";

const API_URL_ENV_KEYS: [&str; 3] = ["NEXT_PUBLIC_API_URL", "DETECTOR_API_URL", "APP__API_URL"];
const CONFIDENCE_SCALE_ENV_KEY: &str = "APP__CONFIDENCE_SCALE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_url: String,
    /// Divisor applied to raw classifier scores before rendering a percentage.
    pub confidence_scale: f64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            confidence_scale: DEFAULT_CONFIDENCE_SCALE,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid api url '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("api url '{0}' must not carry a query or fragment")]
    UnexpectedUrlComponents(String),
    #[error("confidence scale must be a positive number, got '{0}'")]
    InvalidConfidenceScale(String),
    #[error("failed to read settings file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse settings file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ClientSettings {
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, SettingsError> {
        self.api_url = normalize_api_url(api_url)?;
        Ok(self)
    }

    pub fn validated(mut self) -> Result<Self, SettingsError> {
        self.api_url = normalize_api_url(&self.api_url)?;
        if !self.confidence_scale.is_finite() || self.confidence_scale <= 0.0 {
            return Err(SettingsError::InvalidConfidenceScale(
                self.confidence_scale.to_string(),
            ));
        }
        Ok(self)
    }
}

pub fn load_settings() -> Result<ClientSettings, SettingsError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional settings file, then environment overrides.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<ClientSettings>(&raw).map_err(|source| {
            SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => ClientSettings::default(),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    for key in API_URL_ENV_KEYS {
        if let Some(v) = env(key) {
            settings.api_url = v;
        }
    }

    if let Some(v) = env(CONFIDENCE_SCALE_ENV_KEY) {
        settings.confidence_scale = v
            .trim()
            .parse::<f64>()
            .map_err(|_| SettingsError::InvalidConfidenceScale(v.clone()))?;
    }

    settings.validated()
}

fn normalize_api_url(raw_api_url: &str) -> Result<String, SettingsError> {
    let raw_api_url = raw_api_url.trim();

    if raw_api_url.is_empty() {
        return Ok(DEFAULT_API_URL.to_string());
    }

    let parsed = Url::parse(raw_api_url).map_err(|source| SettingsError::InvalidApiUrl {
        url: raw_api_url.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::UnsupportedScheme(raw_api_url.to_string()));
    }
    // Endpoint paths are appended to the base, so nothing may follow the path.
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(SettingsError::UnexpectedUrlComponents(raw_api_url.to_string()));
    }

    Ok(raw_api_url.trim_end_matches('/').to_string())
}
