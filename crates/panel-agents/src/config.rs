//! Runtime configuration for the gateway and the pipeline.
//!
//! Everything the prompts and the gateway used to treat as implicit global
//! style constants — model id, endpoint, per-stage token ceilings — lives in
//! an explicit config struct so the pipeline can be driven by fakes in tests.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Environment variable overrides (`PANEL_GATEWAY_URL`, `PANEL_API_KEY`,
//!    `PANEL_MODEL`, `PANEL_TIMEOUT_SECS`)
//! 2. Values set on the struct
//! 3. Built-in defaults

use std::env;
use std::time::Duration;

use serde::Deserialize;

/// Default OpenAI-compatible chat-completions endpoint.
const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080/v1/chat/completions";
/// Default model identifier sent with every completion request.
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
/// Default per-request timeout. Expiry surfaces as `Unavailable`.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ENV_GATEWAY_URL: &str = "PANEL_GATEWAY_URL";
const ENV_API_KEY: &str = "PANEL_API_KEY";
const ENV_MODEL: &str = "PANEL_MODEL";
const ENV_TIMEOUT_SECS: &str = "PANEL_TIMEOUT_SECS";

/// Completion-service endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Full URL of the chat-completions endpoint.
    pub url: String,
    /// Bearer credential. Empty means unconfigured — the gateway fails
    /// with `AuthError` before issuing a request.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Hard per-request timeout enforced by the HTTP client.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let timeout_secs = env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            url: env::var(ENV_GATEWAY_URL).unwrap_or_else(|_| DEFAULT_GATEWAY_URL.into()),
            api_key: env::var(ENV_API_KEY).unwrap_or_default(),
            model: env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.into()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Per-stage completion token ceilings.
///
/// The pipeline stages use larger ceilings than simple text-asset
/// generation because they produce structured multi-field JSON.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TokenBudget {
    pub review: u32,
    pub discussion: u32,
    pub synthesis: u32,
    pub follow_up: u32,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            review: 1500,
            discussion: 2000,
            synthesis: 2000,
            follow_up: 500,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub tokens: TokenBudget,
}
