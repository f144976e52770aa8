//! Error taxonomy for the panel pipeline.
//!
//! Two layers:
//!
//! - [`GatewayError`] — the five transport/auth fault kinds the completion
//!   gateway can surface. None of them are retried by the pipeline; the
//!   first one encountered aborts the run.
//! - [`PanelError`] — run-level errors handed to the caller: a gateway
//!   fault tagged with the stage it occurred in, a caller validation fault
//!   (raised before any completion call), or cancellation.
//!
//! Malformed model output is deliberately absent from this taxonomy: JSON
//! parse and shape failures are absorbed at the coercer boundary and never
//! become errors.

use std::fmt;

use thiserror::Error;

/// Transport/auth faults from the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Upstream 429.
    #[error("completion service rate limit exceeded")]
    RateLimited,
    /// Upstream 402.
    #[error("completion service quota exhausted")]
    QuotaExceeded,
    /// Upstream 401/403 or a missing credential.
    #[error("completion service rejected credentials")]
    AuthError,
    /// Any other non-2xx status or transport fault (including timeout).
    #[error("completion service unavailable: {0}")]
    Unavailable(String),
    /// 2xx but no usable content field.
    #[error("completion service returned no content")]
    EmptyResponse,
}

impl GatewayError {
    /// User-actionable guidance for the fault kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimited => "Rate limit exceeded. Please try again later.",
            Self::QuotaExceeded => "Payment required. Please add credits to continue.",
            Self::AuthError => "Authentication failed. Please check your credentials.",
            Self::Unavailable(_) => "The AI service is unavailable. Please try again later.",
            Self::EmptyResponse => "The AI service returned an empty response. Please try again.",
        }
    }
}

/// Pipeline stage a gateway fault was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStage {
    Review,
    Discussion,
    Synthesis,
    FollowUp,
}

impl fmt::Display for PanelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Review => write!(f, "review"),
            Self::Discussion => write!(f, "discussion"),
            Self::Synthesis => write!(f, "synthesis"),
            Self::FollowUp => write!(f, "follow-up"),
        }
    }
}

/// Run-level errors surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    /// A transport/auth fault aborted the run. Carries the first fault
    /// encountered and the stage it occurred in.
    #[error("gateway fault during {stage} stage: {source}")]
    Gateway {
        stage: PanelStage,
        #[source]
        source: GatewayError,
    },

    /// Rejected before any completion call was issued — zero quota consumed.
    #[error("invalid panel request: {0}")]
    Validation(String),

    /// The run was cancelled via its cancellation token.
    #[error("panel run cancelled")]
    Cancelled,
}

impl PanelError {
    pub fn gateway(stage: PanelStage, source: GatewayError) -> Self {
        Self::Gateway { stage, source }
    }

    /// User-actionable message for display, independent of stage.
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway { source, .. } => source.user_message().to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Cancelled => "The panel run was cancelled.".to_string(),
        }
    }
}
