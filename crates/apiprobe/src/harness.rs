//! One-stop bootstrap for test suites.

use apiprobe_auth::TokenService;
use apiprobe_client::ApiClient;
use apiprobe_config::{ConfigLoader, HarnessConfig};
use apiprobe_telemetry::{init_logging, LogConfig, TelemetryError};
use apiprobe_test::{
    create_authenticated_request, create_request, AuthOptions, AuthenticatedRequest, Target,
    TestClient,
};

use crate::error::HarnessResult;

/// Configuration, logging and token issuance wired together.
///
/// A harness is bound to one [`Target`], the configured `API_URL` unless
/// replaced with [`with_target`](Self::with_target).
///
/// # Example
///
/// ```ignore
/// use apiprobe::prelude::*;
///
/// #[tokio::test]
/// async fn profile_roundtrip() {
///     let harness = Harness::from_env().unwrap();
///     let auth = harness.authenticated_request(AuthOptions::default()).unwrap();
///
///     let response = auth.request.get("/profile").send().await;
///     assertions::success(&response);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    tokens: TokenService,
    target: Target,
}

impl Harness {
    /// Loads `.env` and the process environment, then builds the harness.
    pub fn from_env() -> HarnessResult<Self> {
        Self::new(ConfigLoader::from_env()?)
    }

    /// Builds a harness from an explicit configuration.
    ///
    /// Installs the global log subscriber unless one is already present.
    /// Configuration is not validated here; call
    /// [`HarnessConfig::validate`] when required variables matter.
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        match init_logging(&LogConfig::from_harness(&config)) {
            Ok(()) => {}
            Err(TelemetryError::LoggingInit(reason)) => {
                tracing::debug!(%reason, "log subscriber already installed");
            }
            Err(e) => return Err(e.into()),
        }

        let target = Target::url(&config.api_url)?;
        let tokens = TokenService::from_config(&config);
        tracing::debug!(api.url = %config.api_url, "harness ready");

        Ok(Self {
            config,
            tokens,
            target,
        })
    }

    /// Points every factory built afterwards at `target`.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<Target>) -> Self {
        self.target = target.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The token service for the configured secret.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The target requests are sent to.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// A plain request factory for the target.
    pub fn request(&self) -> TestClient {
        create_request(self.target.clone())
    }

    /// A request factory that authenticates as a fresh test user.
    pub fn authenticated_request(&self, options: AuthOptions) -> HarnessResult<AuthenticatedRequest> {
        Ok(create_authenticated_request(
            self.target.clone(),
            &self.tokens,
            options,
        )?)
    }

    /// A versioned API client for the configured `API_URL`.
    pub fn api_client(&self) -> ApiClient {
        ApiClient::from_config(&self.config)
    }
}
