//! Review fan-out — one concurrent completion call per seated persona.
//!
//! Reviews are independent, so they run concurrently on a `JoinSet` and
//! are reassembled by spawn index: the returned vector always matches the
//! input persona order regardless of completion order.
//!
//! Failure policy is asymmetric. A malformed response degrades that one
//! persona to the fallback review and the stage continues. A transport
//! fault aborts the stage: the first fault wins, in-flight siblings are
//! cancelled through a child token, and no partial review set escapes.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::coerce::coerce;
use crate::error::{GatewayError, PanelError, PanelStage};
use crate::gateway::CompletionGateway;
use crate::prompts::build_review_prompt;
use crate::types::{AgentReview, InvestorPersona, PanelSettings, ReviewBody};

/// Run the review stage for every seated persona.
///
/// Returns exactly `personas.len()` reviews in persona input order, or the
/// first transport fault observed.
pub async fn review_all(
    gateway: Arc<dyn CompletionGateway>,
    personas: &[InvestorPersona],
    brief: &str,
    settings: &PanelSettings,
    max_tokens: u32,
    cancel: &CancellationToken,
) -> Result<Vec<AgentReview>, PanelError> {
    // Child token: a sibling fault cancels the remaining reviews without
    // cancelling the caller's token.
    let bail = cancel.child_token();
    let mut set: JoinSet<(usize, Result<AgentReview, PanelError>)> = JoinSet::new();

    for (index, persona) in personas.iter().enumerate() {
        let gateway = Arc::clone(&gateway);
        let messages = build_review_prompt(persona, brief, settings);
        let persona_id = persona.id.clone();
        let persona_name = persona.full_name();
        let bail = bail.clone();

        set.spawn(async move {
            let raw = tokio::select! {
                _ = bail.cancelled() => return (index, Err(PanelError::Cancelled)),
                result = gateway.complete(&messages, max_tokens) => match result {
                    Ok(raw) => raw,
                    Err(e) => return (index, Err(PanelError::gateway(PanelStage::Review, e))),
                },
            };

            let body = coerce(&raw, ReviewBody::fallback());
            if body.is_fallback() {
                info!(persona = %persona_id, "review degraded to fallback");
            }
            let review = AgentReview {
                persona_id,
                persona_name,
                body: body.into_inner(),
            };
            (index, Ok(review))
        });
    }

    let mut slots: Vec<Option<AgentReview>> = (0..personas.len()).map(|_| None).collect();
    let mut first_err: Option<PanelError> = None;

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(review))) => slots[index] = Some(review),
            Ok((_, Err(err))) => {
                if first_err.is_none() {
                    warn!(error = %err, "review stage aborting, cancelling siblings");
                    bail.cancel();
                    first_err = Some(err);
                }
            }
            Err(join_err) => {
                if first_err.is_none() {
                    bail.cancel();
                    first_err = Some(PanelError::gateway(
                        PanelStage::Review,
                        GatewayError::Unavailable(format!("review task failed: {join_err}")),
                    ));
                }
            }
        }
    }

    if let Some(err) = first_err {
        return Err(err);
    }

    let mut reviews = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Some(review) => reviews.push(review),
            None => {
                return Err(PanelError::gateway(
                    PanelStage::Review,
                    GatewayError::Unavailable("review task produced no result".into()),
                ))
            }
        }
    }
    Ok(reviews)
}
