//! Panel orchestrator — sequences the three pipeline stages over one
//! gateway and one state machine.
//!
//! A run is strictly linear between stages: every review is an input to
//! the discussion, and both are inputs to the synthesis. Nothing partial
//! escapes; the caller gets either the full artifact triple or a single
//! run-level error. Follow-up questions run outside the pipeline and do
//! not touch run state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{PanelConfig, TokenBudget};
use crate::error::{GatewayError, PanelError};
use crate::gateway::{CompletionGateway, HttpGateway};
use crate::personas::select_enabled;
use crate::prompts::render_brief;
use crate::stages::{discuss, follow_up, review_all, synthesize};
use crate::state::{RunState, RunStateMachine};
use crate::types::{InvestorPersona, PanelArtifacts, PanelSettings, StartupProfile};

/// Minimum seated panel size.
const MIN_PANEL_SIZE: usize = 3;

/// Everything a run needs, assembled by the caller.
#[derive(Debug, Clone)]
pub struct PanelRequest {
    pub profile: StartupProfile,
    pub settings: PanelSettings,
    /// Candidate personas; disabled entries are filtered at selection.
    pub personas: Vec<InvestorPersona>,
}

/// Drives panel runs and follow-up questions against one gateway.
pub struct PanelOrchestrator {
    gateway: Arc<dyn CompletionGateway>,
    tokens: TokenBudget,
}

impl PanelOrchestrator {
    /// Build over the production HTTP gateway.
    pub fn from_config(config: PanelConfig) -> Result<Self, GatewayError> {
        let gateway = HttpGateway::new(config.gateway)?;
        Ok(Self::with_gateway(Arc::new(gateway), config.tokens))
    }

    /// Build over any gateway implementation (tests inject fakes here).
    pub fn with_gateway(gateway: Arc<dyn CompletionGateway>, tokens: TokenBudget) -> Self {
        Self { gateway, tokens }
    }

    /// Run the full pipeline: reviews, discussion, synthesis.
    pub async fn run(&self, request: &PanelRequest) -> Result<PanelArtifacts, PanelError> {
        self.run_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run the full pipeline under an external cancellation token.
    pub async fn run_with_cancel(
        &self,
        request: &PanelRequest,
        cancel: &CancellationToken,
    ) -> Result<PanelArtifacts, PanelError> {
        let mut state = RunStateMachine::new();

        // Both validations reject before any completion call is issued.
        let missing = request.profile.missing_required_fields();
        if !missing.is_empty() {
            let err = PanelError::Validation(format!(
                "startup profile is missing required fields: {}",
                missing.join(", ")
            ));
            record_failure(&mut state, &err);
            return Err(err);
        }

        let seated = select_enabled(&request.personas, request.settings.agent_count);
        if seated.len() < MIN_PANEL_SIZE {
            let err = PanelError::Validation(format!(
                "panel needs at least {MIN_PANEL_SIZE} enabled personas, found {}",
                seated.len()
            ));
            record_failure(&mut state, &err);
            return Err(err);
        }

        let brief = render_brief(&request.profile);

        advance(
            &mut state,
            RunState::Reviewing,
            Some(&format!("{} personas seated", seated.len())),
        );
        let reviews = match review_all(
            Arc::clone(&self.gateway),
            &seated,
            &brief,
            &request.settings,
            self.tokens.review,
            cancel,
        )
        .await
        {
            Ok(reviews) => reviews,
            Err(err) => {
                record_failure(&mut state, &err);
                return Err(err);
            }
        };

        advance(&mut state, RunState::Discussing, None);
        let discussion = match discuss(
            self.gateway.as_ref(),
            &seated,
            &reviews,
            &brief,
            &request.settings,
            self.tokens.discussion,
            cancel,
        )
        .await
        {
            Ok(discussion) => discussion,
            Err(err) => {
                record_failure(&mut state, &err);
                return Err(err);
            }
        };

        advance(&mut state, RunState::Synthesizing, None);
        let final_report = match synthesize(
            self.gateway.as_ref(),
            &seated,
            &reviews,
            &discussion,
            &brief,
            self.tokens.synthesis,
            cancel,
        )
        .await
        {
            Ok(report) => report,
            Err(err) => {
                record_failure(&mut state, &err);
                return Err(err);
            }
        };

        advance(&mut state, RunState::Complete, None);
        info!(
            reviews = reviews.len(),
            turns = discussion.len(),
            confidence = final_report.confidence_percent,
            history = %state.summary(),
            "panel run complete"
        );

        Ok(PanelArtifacts {
            reviews,
            discussion,
            final_report,
        })
    }

    /// Answer a follow-up question in the panel's voice. Independent of
    /// run state; callable any time after (or without) a completed run.
    pub async fn follow_up(
        &self,
        question: &str,
        profile: &StartupProfile,
        personas: &[InvestorPersona],
    ) -> Result<String, PanelError> {
        let seated = select_enabled(personas, personas.len());
        follow_up(
            self.gateway.as_ref(),
            question,
            profile,
            &seated,
            self.tokens.follow_up,
            &CancellationToken::new(),
        )
        .await
    }
}

// Transitions driven by the linear pipeline are legal by construction; an
// illegal one indicates a bug and is logged rather than surfaced.
fn advance(state: &mut RunStateMachine, to: RunState, reason: Option<&str>) {
    if let Err(illegal) = state.advance(to, reason) {
        error!(error = %illegal, "run state transition rejected");
    }
}

fn record_failure(state: &mut RunStateMachine, err: &PanelError) {
    if let Err(illegal) = state.fail(&err.to_string()) {
        error!(error = %illegal, "could not record run failure");
    }
}
