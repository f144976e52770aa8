//! Follow-up stage — a single free-text Q&A call outside the run pipeline.
//!
//! No JSON contract and no coercion: the panel answers in prose, so the
//! only failure modes are validation (blank question) and transport faults.

use tokio_util::sync::CancellationToken;

use crate::error::{PanelError, PanelStage};
use crate::gateway::CompletionGateway;
use crate::prompts::build_follow_up_prompt;
use crate::types::{InvestorPersona, StartupProfile};

/// Answer a founder's follow-up question in the voice of the panel.
pub async fn follow_up(
    gateway: &dyn CompletionGateway,
    question: &str,
    profile: &StartupProfile,
    personas: &[InvestorPersona],
    max_tokens: u32,
    cancel: &CancellationToken,
) -> Result<String, PanelError> {
    if question.trim().is_empty() {
        return Err(PanelError::Validation("question must not be empty".into()));
    }

    let messages = build_follow_up_prompt(question, profile, personas);

    let answer = tokio::select! {
        _ = cancel.cancelled() => return Err(PanelError::Cancelled),
        result = gateway.complete(&messages, max_tokens) => {
            result.map_err(|e| PanelError::gateway(PanelStage::FollowUp, e))?
        }
    };

    Ok(answer)
}
