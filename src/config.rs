use crate::error::AppError;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://eco-capture.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_URL_VAR: &str = "ECO_CAPTURE_API_URL";
const TIMEOUT_VAR: &str = "ECO_CAPTURE_TIMEOUT_SECS";

/// Where the classification service lives and how long we wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL without trailing slash; `/predict` and `/update` are appended.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            base_url: normalize_base_url(&base_url.into())?,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            config.base_url = normalize_base_url(&url)?;
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::config(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_VAR, raw))
            })?;
            if secs == 0 {
                return Err(AppError::config(format!("{} must be greater than zero", TIMEOUT_VAR)));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| AppError::config(format!("Invalid service URL {:?}: {}", raw, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(format!("Service URL must be http(s), got {:?}", raw)));
    }
    Ok(trimmed.to_string())
}
