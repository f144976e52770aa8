//! End-to-end pipeline tests over a scripted gateway.
//!
//! The gateway fake routes on prompt shape: review calls carry a persona
//! voice in the system turn and "Evaluate this startup" in the user turn,
//! the discussion and synthesis calls are recognized by their moderator /
//! synthesizer system prompts. No network, no live model.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use panel_agents::config::TokenBudget;
use panel_agents::error::{GatewayError, PanelError, PanelStage};
use panel_agents::gateway::{ChatMessage, CompletionGateway};
use panel_agents::orchestrator::{PanelOrchestrator, PanelRequest};
use panel_agents::personas;
use panel_agents::types::{PanelMode, PanelSettings, RiskTolerance, StartupProfile, Verdict};

/// Scripted gateway with per-stage responses and a call counter.
struct PanelScript {
    /// Review response per persona display name.
    reviews: HashMap<String, Result<String, GatewayError>>,
    discussion: Result<String, GatewayError>,
    synthesis: Result<String, GatewayError>,
    follow_up: Result<String, GatewayError>,
    calls: AtomicUsize,
}

impl PanelScript {
    fn new() -> Self {
        Self {
            reviews: HashMap::new(),
            discussion: Ok(discussion_json()),
            synthesis: Ok(synthesis_json(72.0)),
            follow_up: Ok("Raise from operator angels.".into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn with_review(mut self, name: &str, response: Result<String, GatewayError>) -> Self {
        self.reviews.insert(name.to_string(), response);
        self
    }
}

#[async_trait]
impl CompletionGateway for PanelScript {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _max_tokens: u32,
    ) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = &messages[0].content;
        let user = &messages[1].content;

        if user.starts_with("Evaluate this startup") {
            for (name, response) in &self.reviews {
                if system.starts_with(&format!("You are {name}")) {
                    return response.clone();
                }
            }
            // Unscripted persona: answer with a default parseable review.
            return Ok(review_json("Maybe", 5));
        }
        if system.starts_with("You are moderating a panel discussion") {
            return self.discussion.clone();
        }
        if system.starts_with("You are synthesizing a final investor panel report") {
            return self.synthesis.clone();
        }
        if system.starts_with("You are a panel of investors") {
            return self.follow_up.clone();
        }
        Err(GatewayError::Unavailable("unrecognized prompt".into()))
    }
}

fn review_json(verdict: &str, score: i32) -> String {
    format!(
        r#"{{
            "verdict": "{verdict}",
            "strengths": ["clear wedge"],
            "risks": ["crowded market"],
            "dueDiligenceQuestions": ["why now?"],
            "suggestedMilestone": "10 paying customers",
            "scoreCard": {{
                "team": {score}, "market": {score}, "product": {score},
                "moat": {score}, "traction": {score}, "gtm": {score},
                "pricing": {score}, "defensibility": {score}, "narrativeClarity": {score}
            }}
        }}"#
    )
}

fn discussion_json() -> String {
    r#"[
        {"personaId":"seed-vc","personaName":"Maya, Seed VC","targetPersonaId":"angel-operator","targetPersonaName":"Dev, Operator Angel","message":"The market sizing feels thin.","turn":1},
        {"personaId":"angel-operator","personaName":"Dev, Operator Angel","targetPersonaId":"seed-vc","targetPersonaName":"Maya, Seed VC","message":"Users love it, that buys time.","turn":2},
        {"personaId":"enterprise-vc","personaName":"Lauren, Enterprise VC","targetPersonaId":"angel-operator","targetPersonaName":"Dev, Operator Angel","message":"Love doesn't close procurement.","turn":3}
    ]"#
    .to_string()
}

fn synthesis_json(confidence: f64) -> String {
    format!(
        r#"{{
            "consensusSummary": "Strong team, unproven GTM.",
            "keyDisagreements": [{{
                "topic": "Go-to-market",
                "personaA": "Dev, Operator Angel",
                "personaAPosition": "Product love carries early growth",
                "personaB": "Lauren, Enterprise VC",
                "personaBPosition": "Enterprise needs a sales motion"
            }}],
            "fundingFit": "Angel round with operator angels.",
            "idealInvestorProfile": "Operators who've sold into the same buyer.",
            "pitchFixes": ["Quantify the TAM wedge"],
            "actionPlan": [{{"week": "Week 1-2", "milestone": "Run 20 buyer interviews"}}],
            "redFlags": [],
            "finalRecommendation": "Raise a small angel round now.",
            "confidencePercent": {confidence}
        }}"#
    )
}

fn profile() -> StartupProfile {
    StartupProfile {
        startup_name: "Acme".into(),
        one_liner: "Uber for X".into(),
        problem: "Logistics is slow".into(),
        solution: "On-demand routing".into(),
        target_customer: "Regional carriers".into(),
        business_model: "Per-seat SaaS".into(),
        ..StartupProfile::default()
    }
}

fn request(agent_count: usize) -> PanelRequest {
    // Enable the whole catalog so panels up to 8 can be seated.
    let mut catalog = personas::builtin();
    for p in &mut catalog {
        p.enabled = true;
    }
    PanelRequest {
        profile: profile(),
        settings: PanelSettings {
            agent_count,
            mode: PanelMode::Fast,
            risk_tolerance: RiskTolerance::Balanced,
        },
        personas: catalog,
    }
}

fn orchestrator(script: PanelScript) -> (PanelOrchestrator, Arc<PanelScript>) {
    let gateway = Arc::new(script);
    let orch = PanelOrchestrator::with_gateway(
        Arc::clone(&gateway) as Arc<dyn CompletionGateway>,
        TokenBudget::default(),
    );
    (orch, gateway)
}

#[tokio::test]
async fn happy_path_returns_full_artifact_triple() {
    let script = PanelScript::new()
        .with_review("Maya", Ok(review_json("Invest", 8)))
        .with_review("Dev", Ok(review_json("Maybe", 6)))
        .with_review("Lauren", Ok(review_json("Pass", 4)));
    let (orch, gateway) = orchestrator(script);

    let artifacts = orch.run(&request(3)).await.unwrap();

    assert_eq!(artifacts.reviews.len(), 3);
    for review in &artifacts.reviews {
        assert!(matches!(
            review.body.verdict,
            Verdict::Pass | Verdict::Maybe | Verdict::Invest
        ));
    }
    assert!(!artifacts.discussion.is_empty());
    for turn in &artifacts.discussion {
        assert!((1..=6).contains(&turn.turn));
    }
    let confidence = artifacts.final_report.confidence_percent;
    assert!((0.0..=100.0).contains(&confidence));

    // N reviews + 1 discussion + 1 synthesis.
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn review_order_matches_persona_order_for_every_panel_size() {
    for n in 3..=8 {
        let (orch, _) = orchestrator(PanelScript::new());
        let req = request(n);
        let expected: Vec<String> = req
            .personas
            .iter()
            .take(n)
            .map(|p| p.id.clone())
            .collect();

        let artifacts = orch.run(&req).await.unwrap();
        let got: Vec<String> = artifacts
            .reviews
            .iter()
            .map(|r| r.persona_id.clone())
            .collect();
        assert_eq!(got, expected, "panel size {n}");
    }
}

#[tokio::test]
async fn one_malformed_review_degrades_without_touching_siblings() {
    let script = PanelScript::new()
        .with_review("Maya", Ok(review_json("Invest", 8)))
        .with_review("Dev", Ok("As an investor, I'd rather chat than emit JSON.".into()))
        .with_review("Lauren", Ok(review_json("Pass", 4)));
    let (orch, _) = orchestrator(script);

    let artifacts = orch.run(&request(3)).await.unwrap();

    assert_eq!(artifacts.reviews[0].body.verdict, Verdict::Invest);
    // The degraded persona gets the defined fallback, attribution intact.
    let degraded = &artifacts.reviews[1];
    assert_eq!(degraded.persona_id, "angel-operator");
    assert_eq!(degraded.body.verdict, Verdict::Maybe);
    assert_eq!(degraded.body.score_card.team, 5);
    assert_eq!(degraded.body.strengths, vec!["Unable to fully evaluate"]);
    assert_eq!(artifacts.reviews[2].body.verdict, Verdict::Pass);
}

#[tokio::test]
async fn rate_limited_reviews_collapse_to_one_run_error() {
    let script = PanelScript::new()
        .with_review("Maya", Err(GatewayError::RateLimited))
        .with_review("Dev", Err(GatewayError::RateLimited))
        .with_review("Lauren", Err(GatewayError::RateLimited));
    let (orch, _) = orchestrator(script);

    let err = orch.run(&request(3)).await.unwrap_err();
    assert_eq!(
        err,
        PanelError::Gateway {
            stage: PanelStage::Review,
            source: GatewayError::RateLimited,
        }
    );
    assert_eq!(err.user_message(), "Rate limit exceeded. Please try again later.");
}

#[tokio::test]
async fn unparseable_synthesis_still_reports_zero_confidence() {
    let mut script = PanelScript::new();
    script.synthesis = Ok("The panel concluded things went well.".into());
    let (orch, _) = orchestrator(script);

    let artifacts = orch.run(&request(3)).await.unwrap();
    assert_eq!(artifacts.final_report.confidence_percent, 0.0);
    assert!(artifacts.final_report.key_disagreements.is_empty());
}

#[tokio::test]
async fn unparseable_discussion_yields_empty_turns_but_run_completes() {
    let mut script = PanelScript::new();
    script.discussion = Ok("They talked for a while.".into());
    let (orch, _) = orchestrator(script);

    let artifacts = orch.run(&request(3)).await.unwrap();
    assert!(artifacts.discussion.is_empty());
    // Synthesis still ran on the empty discussion.
    assert_eq!(artifacts.final_report.confidence_percent, 72.0);
}

#[tokio::test]
async fn discussion_fault_aborts_after_reviews() {
    let mut script = PanelScript::new();
    script.discussion = Err(GatewayError::QuotaExceeded);
    let (orch, gateway) = orchestrator(script);

    let err = orch.run(&request(3)).await.unwrap_err();
    assert!(matches!(
        err,
        PanelError::Gateway {
            stage: PanelStage::Discussion,
            source: GatewayError::QuotaExceeded,
        }
    ));
    // 3 reviews + the failed discussion call, no synthesis attempt.
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn follow_up_answers_and_names_no_json_contract() {
    let (orch, gateway) = orchestrator(PanelScript::new());
    let req = request(3);

    let answer = orch
        .follow_up("How much should we raise?", &req.profile, &req.personas)
        .await
        .unwrap();
    assert_eq!(answer, "Raise from operator angels.");
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn follow_up_empty_response_is_a_follow_up_fault() {
    let mut script = PanelScript::new();
    script.follow_up = Err(GatewayError::EmptyResponse);
    let (orch, _) = orchestrator(script);
    let req = request(3);

    let err = orch
        .follow_up("What about churn?", &req.profile, &req.personas)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PanelError::Gateway {
            stage: PanelStage::FollowUp,
            source: GatewayError::EmptyResponse,
        }
    );
}

#[tokio::test]
async fn validation_failure_consumes_no_quota() {
    let (orch, gateway) = orchestrator(PanelScript::new());

    let mut req = request(3);
    req.profile.solution = String::new();
    let err = orch.run(&req).await.unwrap_err();

    assert!(matches!(err, PanelError::Validation(_)));
    assert!(err.to_string().contains("solution"));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_discussion_is_accepted_unchanged() {
    // 8 turns against a fast-mode budget of 6: accepted as-is, no truncation.
    let mut turns = Vec::new();
    for i in 1..=8 {
        turns.push(format!(
            r#"{{"personaId":"seed-vc","personaName":"Maya, Seed VC","message":"turn {i}","turn":{i}}}"#
        ));
    }
    let mut script = PanelScript::new();
    script.discussion = Ok(format!("[{}]", turns.join(",")));
    let (orch, _) = orchestrator(script);

    let artifacts = orch.run(&request(3)).await.unwrap();
    assert_eq!(artifacts.discussion.len(), 8);
    assert_eq!(artifacts.discussion[7].turn, 8);
}
