//! Environment configuration for apiprobe.
//!
//! This crate resolves the harness settings with support for:
//! - Built-in defaults for every variable
//! - A `.env` file (missing file is a warning, not an error)
//! - Process environment overrides
//! - An explicit validation step for required secrets
//!
//! # Example
//!
//! ```no_run
//! use apiprobe_config::ConfigLoader;
//!
//! # fn main() -> Result<(), apiprobe_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv_file(".env")?
//!     .with_process_env()
//!     .load()?;
//!
//! // Fail fast before signing anything.
//! config.validate()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `API_URL` | `http://localhost:3000` |
//! | `API_VERSION` | `v1` |
//! | `JWT_SECRET` | `default_jwt_secret` (required by `validate`) |
//! | `JWT_EXPIRATION` | `1h` |
//! | `TEST_USER_EMAIL` | `test@example.com` |
//! | `TEST_USER_PASSWORD` | `password123` |
//! | `LOG_LEVEL` | `info` |
//! | `LOG_FORMAT` | `pretty` |

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
