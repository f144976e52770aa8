//! Domain types for the investor panel pipeline.
//!
//! Everything that crosses the model boundary serializes with camelCase
//! field names, because the prompt contracts dictate the JSON shape the
//! model is asked to produce (`scoreCard`, `dueDiligenceQuestions`,
//! `targetPersonaId`, ...). Parsing is strict: a response missing a
//! contract field fails to deserialize and is replaced by the call-site
//! fallback at the coercer boundary, never silently defaulted.

use serde::{Deserialize, Serialize};

/// Founder-supplied facts about the startup being evaluated.
///
/// Immutable input to a run; the pipeline never mutates it. Empty strings
/// mean "not provided" and are substituted when the brief is rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartupProfile {
    pub startup_name: String,
    pub one_liner: String,
    pub problem: String,
    pub solution: String,
    pub target_customer: String,
    pub business_model: String,
    pub traction: String,
    pub team: String,
    pub moat: String,
    pub competitors: String,
    pub fundraising_goal: String,
    pub extra_notes: String,
}

impl StartupProfile {
    /// Names of required fields that are empty or whitespace-only.
    ///
    /// The first six fields must be present before the pipeline issues any
    /// completion call; the rest are optional and rendered as "Not provided".
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let required: [(&'static str, &str); 6] = [
            ("startupName", &self.startup_name),
            ("oneLiner", &self.one_liner),
            ("problem", &self.problem),
            ("solution", &self.solution),
            ("targetCustomer", &self.target_customer),
            ("businessModel", &self.business_model),
        ];
        required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// A configured evaluator: one simulated investor.
///
/// Personas are static catalog data. The pipeline only selects a subset of
/// enabled personas for a run; it never creates or mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorPersona {
    pub id: String,
    pub display_name: String,
    pub role_title: String,
    /// Natural-language evaluation lens and voice for this investor.
    pub system_prompt: String,
    #[serde(default)]
    pub voice_style: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl InvestorPersona {
    /// "Name, Title" form used in reviews and discussion attribution.
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.display_name, self.role_title)
    }
}

/// Discussion depth requested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    Fast,
    Deep,
}

impl PanelMode {
    /// Turn budget requested from the discussion stage.
    pub fn max_turns(self) -> u32 {
        match self {
            Self::Fast => 6,
            Self::Deep => 12,
        }
    }
}

/// Evaluation framing applied to every review prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Balanced,
    Aggressive,
}

/// Run-scoped configuration, constructed once per run and read-only after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSettings {
    /// How many enabled personas to seat (clamped to 3..=8 at selection).
    pub agent_count: usize,
    pub mode: PanelMode,
    pub risk_tolerance: RiskTolerance,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            agent_count: 3,
            mode: PanelMode::Fast,
            risk_tolerance: RiskTolerance::Balanced,
        }
    }
}

/// Nine-dimension scorecard. Conventionally 0-10 per dimension, but model
/// output is trusted after parse — no clamping here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub team: i32,
    pub market: i32,
    pub product: i32,
    pub moat: i32,
    pub traction: i32,
    pub gtm: i32,
    pub pricing: i32,
    pub defensibility: i32,
    pub narrative_clarity: i32,
}

impl ScoreCard {
    /// All nine dimensions set to the same value (used by the fallback review).
    pub fn uniform(score: i32) -> Self {
        Self {
            team: score,
            market: score,
            product: score,
            moat: score,
            traction: score,
            gtm: score,
            pricing: score,
            defensibility: score,
            narrative_clarity: score,
        }
    }
}

/// An investor's bottom line on the startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Maybe,
    Invest,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Maybe => write!(f, "Maybe"),
            Self::Invest => write!(f, "Invest"),
        }
    }
}

/// The JSON body a review completion is contracted to return.
///
/// Separated from [`AgentReview`] because the model knows nothing about
/// persona ids — the stage stamps those on after parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub verdict: Verdict,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub due_diligence_questions: Vec<String>,
    pub suggested_milestone: String,
    pub score_card: ScoreCard,
}

impl ReviewBody {
    /// Well-defined low-fidelity substitute when a review response cannot
    /// be parsed. Verdict `Maybe`, every score 5.
    pub fn fallback() -> Self {
        Self {
            verdict: Verdict::Maybe,
            strengths: vec!["Unable to fully evaluate".into()],
            risks: vec!["Review parsing failed".into()],
            due_diligence_questions: vec!["Please try again".into()],
            suggested_milestone: "N/A".into(),
            score_card: ScoreCard::uniform(5),
        }
    }
}

/// One persona's verdict on the startup, produced exactly once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReview {
    pub persona_id: String,
    pub persona_name: String,
    #[serde(flatten)]
    pub body: ReviewBody,
}

/// One turn in the simulated panel discussion.
///
/// Turn numbers are model-trusted: not required to be unique or monotonic,
/// used only as a display grouping key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionMessage {
    pub persona_id: String,
    pub persona_name: String,
    #[serde(default)]
    pub target_persona_id: Option<String>,
    #[serde(default)]
    pub target_persona_name: Option<String>,
    pub message: String,
    pub turn: u32,
}

/// A disagreement surfaced by the synthesis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disagreement {
    pub topic: String,
    pub persona_a: String,
    pub persona_a_position: String,
    pub persona_b: String,
    pub persona_b_position: String,
}

/// One entry in the synthesized action plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub week: String,
    pub milestone: String,
}

/// The synthesized consensus report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelResult {
    pub consensus_summary: String,
    #[serde(default)]
    pub key_disagreements: Vec<Disagreement>,
    pub funding_fit: String,
    pub ideal_investor_profile: String,
    #[serde(default)]
    pub pitch_fixes: Vec<String>,
    #[serde(default)]
    pub action_plan: Vec<ActionItem>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    pub final_recommendation: String,
    pub confidence_percent: f64,
}

impl PanelResult {
    /// Marker report returned when synthesis output cannot be parsed.
    /// Confidence is always present, pinned to zero.
    pub fn fallback() -> Self {
        Self {
            consensus_summary: "Unable to generate consensus summary.".into(),
            key_disagreements: Vec::new(),
            funding_fit: "Unable to determine funding fit.".into(),
            ideal_investor_profile: "Unable to determine ideal investor profile.".into(),
            pitch_fixes: vec!["Please try again".into()],
            action_plan: vec![ActionItem {
                week: "Week 1-4".into(),
                milestone: "Retry panel analysis".into(),
            }],
            red_flags: Vec::new(),
            final_recommendation: "Panel analysis encountered an error. Please try again.".into(),
            confidence_percent: 0.0,
        }
    }
}

/// The full artifact triple a completed run exposes.
///
/// Callers either see all three together or a run-level error — partial
/// results are never committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelArtifacts {
    pub reviews: Vec<AgentReview>,
    pub discussion: Vec<DiscussionMessage>,
    pub final_report: PanelResult,
}
