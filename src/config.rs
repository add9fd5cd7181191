//! # Configuration Module
//!
//! This module defines the service configuration, loaded from environment
//! variables (optionally seeded from a `.env` file by the binary).
//! Credentials are handed to the OCR client explicitly; nothing here writes
//! files or mutates the process environment.

use std::time::Duration;

use crate::errors::ScanError;

// Constants for service configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB limit for uploaded photos

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Allowed CORS origins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfig {
    /// Any origin (`*`)
    Any,
    /// Only the listed origins
    Origins(Vec<String>),
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig::Any
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit for uploads in bytes
    pub max_upload_bytes: usize,
    pub cors: CorsConfig,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            cors: CorsConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

/// How the OCR client authenticates against the Vision API
#[derive(Clone, PartialEq, Eq)]
pub enum VisionCredentials {
    /// Sent as the `key` query parameter
    ApiKey(String),
    /// Sent as an `Authorization: Bearer` header
    AccessToken(String),
}

impl std::fmt::Debug for VisionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisionCredentials::ApiKey(_) => write!(f, "ApiKey(<redacted>)"),
            VisionCredentials::AccessToken(_) => write!(f, "AccessToken(<redacted>)"),
        }
    }
}

/// OCR client settings
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub endpoint: String,
    pub credentials: VisionCredentials,
    pub timeout: Duration,
}

impl VisionConfig {
    pub fn new(credentials: VisionCredentials) -> Self {
        Self {
            endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Shopping backend settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// When false, `/analyze/` answers with the extracted payload instead of relaying
    pub forwarding: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            forwarding: true,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ScanError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server = ServerConfig {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", var("PORT"), DEFAULT_PORT)?,
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", var("MAX_UPLOAD_BYTES"), MAX_UPLOAD_BYTES)?,
            cors: parse_cors(var("CORS_ALLOWED_ORIGINS").as_deref()),
            log_format: parse_log_format(var("LOG_FORMAT").as_deref())?,
        };

        let credentials = match (var("GOOGLE_VISION_API_KEY"), var("GOOGLE_VISION_ACCESS_TOKEN")) {
            (Some(key), _) => VisionCredentials::ApiKey(key),
            (None, Some(token)) => VisionCredentials::AccessToken(token),
            (None, None) => {
                return Err(ScanError::Config(
                    "GOOGLE_VISION_API_KEY or GOOGLE_VISION_ACCESS_TOKEN must be set".to_string(),
                ))
            }
        };

        let vision = VisionConfig {
            endpoint: var("GOOGLE_VISION_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_VISION_ENDPOINT.to_string()),
            credentials,
            timeout: Duration::from_secs(parse_or(
                "VISION_TIMEOUT_SECS",
                var("VISION_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
        };

        let backend = BackendConfig {
            base_url: var("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            timeout: Duration::from_secs(parse_or(
                "BACKEND_TIMEOUT_SECS",
                var("BACKEND_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            forwarding: parse_bool("BACKEND_FORWARDING", var("BACKEND_FORWARDING"), true)?,
        };

        Ok(Self {
            server,
            vision,
            backend,
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ScanError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|e| ScanError::Config(format!("{key}='{raw}' is invalid: {e}"))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, ScanError> {
    let Some(raw) = value else {
        return Ok(default);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ScanError::Config(format!("{key}='{raw}' is not a boolean"))),
    }
}

fn parse_cors(value: Option<&str>) -> CorsConfig {
    let Some(raw) = value else {
        return CorsConfig::Any;
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        CorsConfig::Any
    } else {
        CorsConfig::Origins(origins)
    }
}

fn parse_log_format(value: Option<&str>) -> Result<LogFormat, ScanError> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None | Some("text") => Ok(LogFormat::Text),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(ScanError::Config(format!(
            "LOG_FORMAT='{other}' must be 'text' or 'json'"
        ))),
    }
}
