//! Logging setup for apiprobe.
//!
//! Every harness crate emits `tracing` events; this crate installs the
//! subscriber that renders them.
//!
//! - **Harness runs**: [`init_logging`] with a [`LogConfig`] derived from
//!   `LOG_LEVEL` / `LOG_FORMAT`
//! - **Unit and integration tests**: [`init_test_logging`], captured per test
//!   and filtered by `RUST_LOG`
//!
//! # Example
//!
//! ```rust,ignore
//! use apiprobe_config::ConfigLoader;
//! use apiprobe_telemetry::{init_logging, LogConfig};
//!
//! let config = ConfigLoader::from_env()?;
//! init_logging(&LogConfig::from_harness(&config))?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, init_test_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
