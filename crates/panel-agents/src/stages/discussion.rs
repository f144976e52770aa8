//! Discussion stage — one completion call simulating panel cross-talk.
//!
//! Coercion here is stricter than a whole-value fallback: the raw text is
//! first coerced to a JSON array (falling back to an empty one), then each
//! element is validated structurally on its own. An element missing a
//! required field is dropped; its well-formed neighbors survive. The run
//! therefore never fails on discussion content, it only thins out.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::coerce::coerce;
use crate::error::{PanelError, PanelStage};
use crate::gateway::CompletionGateway;
use crate::prompts::build_discussion_prompt;
use crate::types::{AgentReview, DiscussionMessage, InvestorPersona, PanelSettings};

/// Run the discussion stage.
///
/// Returns the attributed turns in the order the model produced them. Turn
/// numbers are model-trusted and not re-sorted.
pub async fn discuss(
    gateway: &dyn CompletionGateway,
    personas: &[InvestorPersona],
    reviews: &[AgentReview],
    brief: &str,
    settings: &PanelSettings,
    max_tokens: u32,
    cancel: &CancellationToken,
) -> Result<Vec<DiscussionMessage>, PanelError> {
    let messages = build_discussion_prompt(personas, reviews, brief, settings);

    let raw = tokio::select! {
        _ = cancel.cancelled() => return Err(PanelError::Cancelled),
        result = gateway.complete(&messages, max_tokens) => {
            result.map_err(|e| PanelError::gateway(PanelStage::Discussion, e))?
        }
    };

    let elements = coerce::<Vec<serde_json::Value>>(&raw, Vec::new()).into_inner();
    let total = elements.len();

    let turns: Vec<DiscussionMessage> = elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value(element) {
            Ok(turn) => Some(turn),
            Err(e) => {
                warn!(error = %e, "dropping malformed discussion turn");
                None
            }
        })
        .collect();

    info!(kept = turns.len(), received = total, "discussion stage complete");
    Ok(turns)
}
