//! Synthesis stage — one completion call reducing the run to a final report.
//!
//! Produces the whole [`PanelResult`] in a single shot, no iterative
//! refinement. A malformed response degrades to the marker fallback report
//! (confidence pinned to zero) rather than failing the run.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::coerce::coerce;
use crate::error::{PanelError, PanelStage};
use crate::gateway::CompletionGateway;
use crate::prompts::build_synthesis_prompt;
use crate::types::{AgentReview, DiscussionMessage, InvestorPersona, PanelResult};

/// Run the synthesis stage.
pub async fn synthesize(
    gateway: &dyn CompletionGateway,
    personas: &[InvestorPersona],
    reviews: &[AgentReview],
    discussion: &[DiscussionMessage],
    brief: &str,
    max_tokens: u32,
    cancel: &CancellationToken,
) -> Result<PanelResult, PanelError> {
    let messages = build_synthesis_prompt(personas, reviews, discussion, brief);

    let raw = tokio::select! {
        _ = cancel.cancelled() => return Err(PanelError::Cancelled),
        result = gateway.complete(&messages, max_tokens) => {
            result.map_err(|e| PanelError::gateway(PanelStage::Synthesis, e))?
        }
    };

    let report = coerce(&raw, PanelResult::fallback());
    if report.is_fallback() {
        info!("synthesis degraded to fallback report");
    }
    Ok(report.into_inner())
}
