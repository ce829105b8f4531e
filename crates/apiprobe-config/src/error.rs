//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The `.env` file exists but could not be read or parsed.
    #[error("failed to read environment file: {path}")]
    DotenvRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: dotenvy::Error,
    },

    /// Invalid configuration value.
    #[error("invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable with the invalid value.
        var: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// One or more required variables were never provided.
    #[error(
        "missing required environment variables: {}\nPlease check your .env file or set these variables in your environment.",
        .vars.join(", ")
    )]
    MissingVariables {
        /// Names of every missing variable.
        vars: Vec<String>,
    },
}

impl ConfigError {
    /// Create a new dotenv read error.
    pub fn dotenv_read(path: impl Into<PathBuf>, source: dotenvy::Error) -> Self {
        Self::DotenvRead {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new missing variables error.
    pub fn missing_variables<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingVariables {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}
