//! Top-level error type.

use thiserror::Error;

/// Errors raised while bootstrapping or driving a [`Harness`](crate::Harness).
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] apiprobe_config::ConfigError),

    /// Logging could not be installed.
    #[error(transparent)]
    Telemetry(#[from] apiprobe_telemetry::TelemetryError),

    /// A test identity could not be issued.
    #[error(transparent)]
    Auth(#[from] apiprobe_auth::AuthError),

    /// A request factory could not be built.
    #[error(transparent)]
    Test(#[from] apiprobe_test::TestError),

    /// An API client call failed.
    #[error(transparent)]
    Client(#[from] apiprobe_client::ClientError),

    /// The reference API could not bind its listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
