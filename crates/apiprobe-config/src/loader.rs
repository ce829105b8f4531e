//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! defaults, a `.env` file and the process environment.

use std::env;
use std::path::{Path, PathBuf};

use crate::{ConfigError, HarnessConfig, KNOWN_VARS};

/// File name searched for by [`ConfigLoader::from_env`].
const DOTENV_FILE: &str = ".env";

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. `.env` file
/// 3. Process environment variables
///
/// Reading the `.env` file never touches the process environment; its entries
/// are applied directly to the configuration.
///
/// # Example
///
/// ```no_run
/// use apiprobe_config::ConfigLoader;
///
/// # fn main() -> Result<(), apiprobe_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_dotenv_file(".env")?
///     .with_process_env()
///     .load()?;
///
/// println!("Testing against: {}", config.api_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    vars: Vec<(String, String)>,
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the nearest `.env`, then the process environment.
    ///
    /// The `.env` file is searched for in the current directory and then in
    /// each parent, so a file at the workspace root is found when tests run
    /// from a member crate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the `.env` file exists but cannot be parsed,
    /// or if a value has the wrong shape.
    pub fn from_env() -> Result<HarnessConfig, ConfigError> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new()
            .with_dotenv_search(&cwd)?
            .with_process_env()
            .load()
    }

    /// Layer the nearest `.env` in `start` or one of its ancestors.
    ///
    /// When no file is found a warning is logged and loading continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvRead` if the file found cannot be read or
    /// contains a malformed line.
    pub fn with_dotenv_search<P: AsRef<Path>>(self, start: P) -> Result<Self, ConfigError> {
        let start = start.as_ref();
        match find_dotenv(start) {
            Some(path) => self.with_dotenv_file(path),
            None => {
                tracing::warn!(start = %start.display(), "environment file not found");
                Ok(self)
            }
        }
    }

    /// Layer the entries of a `.env` file.
    ///
    /// A missing file is not an error: a warning is logged and loading
    /// continues with the remaining layers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvRead` if the file exists but cannot be read
    /// or contains a malformed line.
    pub fn with_dotenv_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(path = %path.display(), "environment file not found");
            return Ok(self);
        }

        let entries =
            dotenvy::from_path_iter(path).map_err(|e| ConfigError::dotenv_read(path, e))?;
        for entry in entries {
            let (key, value) = entry.map_err(|e| ConfigError::dotenv_read(path, e))?;
            self.vars.push((key, value));
        }

        tracing::debug!(path = %path.display(), "loaded environment file");
        Ok(self)
    }

    /// Layer the known variables present in the process environment.
    #[must_use]
    pub fn with_process_env(mut self) -> Self {
        for var in KNOWN_VARS {
            if let Ok(value) = env::var(var) {
                self.vars.push((var.to_string(), value));
            }
        }
        self
    }

    /// Layer a single variable.
    ///
    /// # Example
    ///
    /// ```
    /// use apiprobe_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_var("API_URL", "http://127.0.0.1:8080")
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.api_url, "http://127.0.0.1:8080");
    /// ```
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((key.into(), value.into()));
        self
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Required secrets are not checked here; see
    /// [`HarnessConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a value cannot be parsed or the
    /// API URL is not absolute.
    pub fn load(self) -> Result<HarnessConfig, ConfigError> {
        let mut config = HarnessConfig::default();
        for (key, value) in &self.vars {
            config.apply_var(key, value)?;
        }
        config.check()?;
        Ok(config)
    }
}

fn find_dotenv(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(DOTENV_FILE))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn env_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` under a scoped subscriber and returns what it logged.
    fn logs_during(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert!(!config.is_provided("JWT_SECRET"));
    }

    #[test]
    fn test_loader_with_dotenv_file() {
        let file = env_file(
            "API_URL=http://api.internal:4000\n\
             API_VERSION=v2\n\
             JWT_SECRET=from-file\n\
             JWT_EXPIRATION=30m\n\
             LOG_FORMAT=json\n\
             UNRELATED=ignored\n",
        );

        let config = ConfigLoader::new()
            .with_dotenv_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.api_url, "http://api.internal:4000");
        assert_eq!(config.api_version, "v2");
        assert_eq!(config.jwt_secret, "from-file");
        assert_eq!(config.jwt_expiration, Duration::from_secs(1800));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loader_missing_dotenv_file_is_not_an_error() {
        let config = ConfigLoader::new()
            .with_dotenv_file("/nonexistent/.env")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.api_url, "http://localhost:3000");
    }

    #[test]
    fn test_loader_missing_dotenv_file_warns() {
        let logs = logs_during(|| {
            ConfigLoader::new()
                .with_dotenv_file("/nonexistent/.env")
                .unwrap();
        });

        assert!(logs.contains("WARN"), "logs: {logs}");
        assert!(logs.contains("environment file not found"), "logs: {logs}");
        assert!(logs.contains("/nonexistent/.env"), "logs: {logs}");
    }

    #[test]
    fn test_loaded_dotenv_file_does_not_warn() {
        let file = env_file("JWT_SECRET=from-file\n");
        let logs = logs_during(|| {
            ConfigLoader::new().with_dotenv_file(file.path()).unwrap();
        });

        assert!(!logs.contains("WARN"), "logs: {logs}");
    }

    #[test]
    fn test_dotenv_search_finds_parent_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".env"), "JWT_SECRET=from-root\n").unwrap();
        let member = root.path().join("crates").join("member");
        std::fs::create_dir_all(&member).unwrap();

        let config = ConfigLoader::new()
            .with_dotenv_search(&member)
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.jwt_secret, "from-root");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dotenv_search_prefers_nearest_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".env"), "JWT_SECRET=from-root\n").unwrap();
        let member = root.path().join("member");
        std::fs::create_dir_all(&member).unwrap();
        std::fs::write(member.join(".env"), "JWT_SECRET=from-member\n").unwrap();

        let config = ConfigLoader::new()
            .with_dotenv_search(&member)
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.jwt_secret, "from-member");
    }

    #[test]
    fn test_dotenv_search_skips_directories_named_env() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".env"), "API_VERSION=v9\n").unwrap();
        let member = root.path().join("member");
        std::fs::create_dir_all(member.join(".env")).unwrap();

        let config = ConfigLoader::new()
            .with_dotenv_search(&member)
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.api_version, "v9");
    }

    #[test]
    fn test_loader_malformed_dotenv_file() {
        let file = env_file("JWT_SECRET='unterminated\n");
        let result = ConfigLoader::new().with_dotenv_file(file.path());
        assert!(matches!(result, Err(ConfigError::DotenvRead { .. })));
    }

    #[test]
    fn test_later_layers_override_earlier() {
        let file = env_file("JWT_SECRET=from-file\nAPI_VERSION=v2\n");

        let config = ConfigLoader::new()
            .with_dotenv_file(file.path())
            .unwrap()
            .with_var("JWT_SECRET", "from-env")
            .load()
            .unwrap();

        assert_eq!(config.jwt_secret, "from-env");
        assert_eq!(config.api_version, "v2");
    }

    #[test]
    fn test_loader_invalid_expiration() {
        let result = ConfigLoader::new()
            .with_var("JWT_EXPIRATION", "eventually")
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_loader_invalid_url() {
        let result = ConfigLoader::new().with_var("API_URL", "not a url").load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_does_not_require_secret() {
        let config = ConfigLoader::new()
            .with_var("API_URL", "http://127.0.0.1:9999")
            .load()
            .unwrap();

        assert!(config.validate().is_err());
    }
}
