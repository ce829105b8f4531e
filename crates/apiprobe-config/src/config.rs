//! Harness configuration types.
//!
//! This module provides the [`HarnessConfig`] struct, the variable names it is
//! read from, and the explicit validation step.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::ConfigError;

/// Base URL of the API under test.
pub const API_URL: &str = "API_URL";
/// Version segment inserted between the base URL and endpoint paths.
pub const API_VERSION: &str = "API_VERSION";
/// HMAC secret used to sign test identity tokens.
pub const JWT_SECRET: &str = "JWT_SECRET";
/// Lifetime of signed tokens (`1h`, `30m`, `3600`).
pub const JWT_EXPIRATION: &str = "JWT_EXPIRATION";
/// Email of the configured test account.
pub const TEST_USER_EMAIL: &str = "TEST_USER_EMAIL";
/// Password of the configured test account.
pub const TEST_USER_PASSWORD: &str = "TEST_USER_PASSWORD";
/// Log filter directive.
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Log output format (`pretty` or `json`).
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Every variable the loader understands.
pub const KNOWN_VARS: [&str; 8] = [
    API_URL,
    API_VERSION,
    JWT_SECRET,
    JWT_EXPIRATION,
    TEST_USER_EMAIL,
    TEST_USER_PASSWORD,
    LOG_LEVEL,
    LOG_FORMAT,
];

/// Variables that [`HarnessConfig::validate`] requires to be provided.
pub const REQUIRED_VARS: [&str; 1] = [JWT_SECRET];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::invalid_value(
                LOG_FORMAT,
                "expected 'json' or 'pretty'",
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Complete harness configuration.
///
/// Built once by [`ConfigLoader`](crate::ConfigLoader) and then passed by
/// reference to every component that needs it.
///
/// # Example
///
/// ```
/// use apiprobe_config::HarnessConfig;
///
/// let config = HarnessConfig::default();
/// assert_eq!(config.api_url, "http://localhost:3000");
/// assert_eq!(config.api_version, "v1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Base URL of the API under test.
    pub api_url: String,
    /// API version segment used by the API client.
    pub api_version: String,
    /// Token signing secret.
    pub jwt_secret: String,
    /// Lifetime of signed tokens.
    pub jwt_expiration: Duration,
    /// Email of the configured test account.
    pub test_user_email: String,
    /// Password of the configured test account.
    pub test_user_password: String,
    /// Log filter directive (e.g. `info`, `apiprobe=debug`).
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Variables that were explicitly supplied rather than defaulted.
    provided: BTreeSet<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            api_version: "v1".to_string(),
            jwt_secret: "default_jwt_secret".to_string(),
            jwt_expiration: Duration::from_secs(60 * 60),
            test_user_email: "test@example.com".to_string(),
            test_user_password: "password123".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            provided: BTreeSet::new(),
        }
    }
}

impl HarnessConfig {
    /// Returns true if `var` was supplied by a file or the environment.
    #[must_use]
    pub fn is_provided(&self, var: &str) -> bool {
        self.provided.contains(var)
    }

    /// Validate that every required variable was provided.
    ///
    /// Loading never fails on a missing secret; callers that need a real
    /// secret invoke this before first use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVariables` naming every required variable
    /// that was not provided or is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use apiprobe_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().load().unwrap();
    /// assert!(config.validate().is_err());
    ///
    /// let config = ConfigLoader::new()
    ///     .with_var("JWT_SECRET", "s3cret")
    ///     .load()
    ///     .unwrap();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|var| !self.is_provided(var) || self.value_of(var).is_empty())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::missing_variables(missing))
        }
    }

    /// Apply a single variable, recording it as provided.
    ///
    /// Empty values are treated as unset. Unknown names are ignored.
    pub(crate) fn apply_var(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if value.is_empty() {
            return Ok(());
        }

        match key {
            API_URL => self.api_url = value.trim_end_matches('/').to_string(),
            API_VERSION => self.api_version = value.trim_matches('/').to_string(),
            JWT_SECRET => self.jwt_secret = value.to_string(),
            JWT_EXPIRATION => self.jwt_expiration = parse_expiration(value)?,
            TEST_USER_EMAIL => self.test_user_email = value.to_string(),
            TEST_USER_PASSWORD => self.test_user_password = value.to_string(),
            LOG_LEVEL => self.log_level = value.to_string(),
            LOG_FORMAT => self.log_format = value.parse()?,
            _ => return Ok(()),
        }

        self.provided.insert(key.to_string());
        Ok(())
    }

    /// Check the shape of values that have no sensible fallback.
    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::invalid_value(API_URL, format!("invalid URL: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::invalid_value(API_URL, "URL cannot be a base"));
        }
        if self.jwt_expiration.is_zero() {
            return Err(ConfigError::invalid_value(
                JWT_EXPIRATION,
                "expiration must be greater than zero",
            ));
        }
        Ok(())
    }

    fn value_of(&self, var: &str) -> &str {
        match var {
            API_URL => &self.api_url,
            API_VERSION => &self.api_version,
            JWT_SECRET => &self.jwt_secret,
            TEST_USER_EMAIL => &self.test_user_email,
            TEST_USER_PASSWORD => &self.test_user_password,
            LOG_LEVEL => &self.log_level,
            _ => "",
        }
    }
}

/// Parse a token lifetime.
///
/// Accepts human durations (`1h`, `30m`, `7d`, `15min`) and bare integers,
/// which are read as seconds. Node's `jsonwebtoken` reads a numeric string
/// such as `"3600"` as milliseconds, so a `.env` shared with a Node suite
/// should spell lifetimes with a unit.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the value is neither.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use apiprobe_config::parse_expiration;
///
/// assert_eq!(parse_expiration("1h").unwrap(), Duration::from_secs(3600));
/// assert_eq!(parse_expiration("90").unwrap(), Duration::from_secs(90));
/// ```
pub fn parse_expiration(value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(value).map_err(|e| {
        ConfigError::invalid_value(JWT_EXPIRATION, format!("expected a duration: {e}"))
    })
}
