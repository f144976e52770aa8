//! Prompt builders — pure functions from run inputs to message sequences.
//!
//! All three pipeline stages share one pattern: a system turn that ends in
//! an explicit "respond with ONLY valid JSON in this exact shape"
//! instruction, followed by the serialized startup brief as the user turn.
//! The identical contract pattern is what lets a single coercer serve every
//! stage. The "no markdown" wording is load-bearing: the backend is a
//! free-text generator with no native structured-output guarantee.

use crate::gateway::ChatMessage;
use crate::types::{
    AgentReview, DiscussionMessage, InvestorPersona, PanelMode, PanelSettings, RiskTolerance,
    StartupProfile,
};

/// How many discussion messages the synthesis prompt quotes back.
const SYNTHESIS_DISCUSSION_WINDOW: usize = 6;

fn or_not_provided(value: &str) -> &str {
    if value.trim().is_empty() {
        "Not provided"
    } else {
        value
    }
}

/// Render the profile as the labeled brief block appended to every
/// completion call in a run.
pub fn render_brief(profile: &StartupProfile) -> String {
    let notes = if profile.extra_notes.trim().is_empty() {
        "None"
    } else {
        &profile.extra_notes
    };
    format!(
        "STARTUP BRIEF:\n\
         - Name: {}\n\
         - One-liner: {}\n\
         - Problem: {}\n\
         - Solution: {}\n\
         - Target Customer: {}\n\
         - Business Model: {}\n\
         - Traction: {}\n\
         - Team: {}\n\
         - Moat/Differentiation: {}\n\
         - Competitors: {}\n\
         - Fundraising Goal: {}\n\
         - Additional Notes: {}",
        profile.startup_name,
        profile.one_liner,
        profile.problem,
        profile.solution,
        profile.target_customer,
        profile.business_model,
        or_not_provided(&profile.traction),
        or_not_provided(&profile.team),
        or_not_provided(&profile.moat),
        or_not_provided(&profile.competitors),
        or_not_provided(&profile.fundraising_goal),
        notes,
    )
}

fn risk_context(risk: RiskTolerance) -> &'static str {
    match risk {
        RiskTolerance::Conservative => {
            "Be cautious and focus on proven traction and lower-risk opportunities."
        }
        RiskTolerance::Balanced => "Balance potential upside with realistic assessment of risks.",
        RiskTolerance::Aggressive => {
            "Emphasize big vision and high upside potential over current limitations."
        }
    }
}

fn mode_context(mode: PanelMode) -> &'static str {
    match mode {
        PanelMode::Fast => "Provide a quick, focused assessment.",
        PanelMode::Deep => "Provide a thorough, detailed analysis.",
    }
}

/// Build the per-persona review prompt.
///
/// Persona voice first, then the evaluation framing, then the JSON
/// contract the coercer will enforce.
pub fn build_review_prompt(
    persona: &InvestorPersona,
    brief: &str,
    settings: &PanelSettings,
) -> Vec<ChatMessage> {
    let system = format!(
        "{}\n\n\
         Evaluation context: {}\n\
         {}\n\n\
         You MUST respond with ONLY valid JSON in this exact format (no markdown, no explanation):\n\
         {{\n\
           \"verdict\": \"Pass\" | \"Maybe\" | \"Invest\",\n\
           \"strengths\": [\"strength1\", \"strength2\", \"strength3\"],\n\
           \"risks\": [\"risk1\", \"risk2\", \"risk3\"],\n\
           \"dueDiligenceQuestions\": [\"q1\", \"q2\", \"q3\", \"q4\", \"q5\"],\n\
           \"suggestedMilestone\": \"One specific milestone before raising\",\n\
           \"scoreCard\": {{\n\
             \"team\": 0-10,\n\
             \"market\": 0-10,\n\
             \"product\": 0-10,\n\
             \"moat\": 0-10,\n\
             \"traction\": 0-10,\n\
             \"gtm\": 0-10,\n\
             \"pricing\": 0-10,\n\
             \"defensibility\": 0-10,\n\
             \"narrativeClarity\": 0-10\n\
           }}\n\
         }}",
        persona.system_prompt,
        risk_context(settings.risk_tolerance),
        mode_context(settings.mode),
    );

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Evaluate this startup:\n\n{brief}")),
    ]
}

fn review_summary_line(review: &AgentReview) -> String {
    format!(
        "{}: {} - Strengths: {}. Risks: {}",
        review.persona_name,
        review.body.verdict,
        review.body.strengths.join(", "),
        review.body.risks.join(", "),
    )
}

/// Build the single-call discussion prompt covering all seated personas.
pub fn build_discussion_prompt(
    personas: &[InvestorPersona],
    reviews: &[AgentReview],
    brief: &str,
    settings: &PanelSettings,
) -> Vec<ChatMessage> {
    let max_turns = settings.mode.max_turns();

    let roster = personas
        .iter()
        .map(|p| format!("- {} ({}): {}", p.display_name, p.role_title, p.voice_style))
        .collect::<Vec<_>>()
        .join("\n");

    let review_summary = reviews
        .iter()
        .map(review_summary_line)
        .collect::<Vec<_>>()
        .join("\n");

    let system = format!(
        "You are moderating a panel discussion between investors evaluating a startup.\n\
         The investors have already given their individual reviews. Now they will discuss, challenge assumptions, and debate.\n\n\
         INVESTORS:\n{roster}\n\n\
         THEIR REVIEWS:\n{review_summary}\n\n\
         Generate a realistic panel discussion with {max_turns} exchanges total.\n\
         Each investor should respond to at least one other investor.\n\
         They should point out blind spots, challenge assumptions, and propose counterfactuals.\n\
         Keep responses concise and opinionated.\n\n\
         Respond with ONLY valid JSON array (no markdown):\n\
         [\n\
           {{\n\
             \"personaId\": \"investor-id\",\n\
             \"personaName\": \"Name, Title\",\n\
             \"targetPersonaId\": \"other-investor-id or null\",\n\
             \"targetPersonaName\": \"Other Name or null\",\n\
             \"message\": \"The discussion message\",\n\
             \"turn\": 1-{max_turns}\n\
           }}\n\
         ]",
    );

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Startup being discussed:\n\n{brief}")),
    ]
}

/// Build the synthesis prompt reducing reviews + discussion to one report.
pub fn build_synthesis_prompt(
    personas: &[InvestorPersona],
    reviews: &[AgentReview],
    discussion: &[DiscussionMessage],
    brief: &str,
) -> Vec<ChatMessage> {
    let review_summary = reviews
        .iter()
        .map(|r| {
            format!(
                "{}: {} (Team: {}, Market: {}, Product: {})",
                r.persona_name,
                r.body.verdict,
                r.body.score_card.team,
                r.body.score_card.market,
                r.body.score_card.product,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let discussion_summary = discussion
        .iter()
        .take(SYNTHESIS_DISCUSSION_WINDOW)
        .map(|d| format!("{}: {}", d.persona_name, d.message))
        .collect::<Vec<_>>()
        .join("\n");

    let system = format!(
        "You are synthesizing a final investor panel report based on individual reviews and discussion.\n\n\
         PANEL: {} investors\n\n\
         REVIEWS:\n{review_summary}\n\n\
         DISCUSSION SUMMARY:\n{discussion_summary}\n\n\
         Create a comprehensive final report. Respond with ONLY valid JSON (no markdown):\n\
         {{\n\
           \"consensusSummary\": \"What most investors agree on (2-3 sentences)\",\n\
           \"keyDisagreements\": [\n\
             {{\n\
               \"topic\": \"Topic of disagreement\",\n\
               \"personaA\": \"Investor A name\",\n\
               \"personaAPosition\": \"Their position\",\n\
               \"personaB\": \"Investor B name\",\n\
               \"personaBPosition\": \"Their position\"\n\
             }}\n\
           ],\n\
           \"fundingFit\": \"Best funding route recommendation (angel/VC/grant/accelerator/bootstrapping) with reasoning\",\n\
           \"idealInvestorProfile\": \"Description of ideal investor to target, check sizes, thesis alignment\",\n\
           \"pitchFixes\": [\"Specific fix 1\", \"Specific fix 2\", \"Specific fix 3\"],\n\
           \"actionPlan\": [\n\
             {{\"week\": \"Week 1-2\", \"milestone\": \"Action item\"}},\n\
             {{\"week\": \"Week 3-4\", \"milestone\": \"Action item\"}},\n\
             {{\"week\": \"Week 5-8\", \"milestone\": \"Action item\"}},\n\
             {{\"week\": \"Week 9-12\", \"milestone\": \"Action item\"}}\n\
           ],\n\
           \"redFlags\": [\"Red flag if any\"],\n\
           \"finalRecommendation\": \"Clear recommendation with reasoning (2-3 sentences)\",\n\
           \"confidencePercent\": 0-100\n\
         }}",
        personas.len(),
    );

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Startup:\n\n{brief}")),
    ]
}

/// Build the follow-up Q&A prompt. Free-text answer, no JSON contract.
pub fn build_follow_up_prompt(
    question: &str,
    profile: &StartupProfile,
    personas: &[InvestorPersona],
) -> Vec<ChatMessage> {
    let persona_names = personas
        .iter()
        .map(|p| p.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let system = format!(
        "You are a panel of investors ({persona_names}) responding to a founder's follow-up question about their startup.\n\n\
         Startup: {} - {}\n\
         Problem: {}\n\
         Solution: {}\n\n\
         Provide a concise, helpful response that synthesizes perspectives from the panel. \
         Be direct and actionable. Keep it under 200 words.",
        profile.startup_name, profile.one_liner, profile.problem, profile.solution,
    );

    vec![ChatMessage::system(system), ChatMessage::user(question.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReviewBody, ScoreCard, Verdict};

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

    fn persona(id: &str, name: &str) -> InvestorPersona {
        InvestorPersona {
            id: id.into(),
            display_name: name.into(),
            role_title: "Seed VC".into(),
            system_prompt: format!("You are {name}, a seed-stage investor."),
            voice_style: "Direct, pattern-matching".into(),
            enabled: true,
        }
    }

    fn review(name: &str, verdict: Verdict) -> AgentReview {
        AgentReview {
            persona_id: name.to_lowercase(),
            persona_name: format!("{name}, Seed VC"),
            body: ReviewBody {
                verdict,
                strengths: vec!["team".into()],
                risks: vec!["market".into()],
                due_diligence_questions: vec!["why now?".into()],
                suggested_milestone: "ship".into(),
                score_card: ScoreCard::uniform(7),
            },
        }
    }

    fn message(name: &str, turn: u32, text: &str) -> DiscussionMessage {
        DiscussionMessage {
            persona_id: name.to_lowercase(),
            persona_name: format!("{name}, Seed VC"),
            target_persona_id: None,
            target_persona_name: None,
            message: text.into(),
            turn,
        }
    }

    #[test]
    fn brief_substitutes_empty_optionals() {
        let brief = render_brief(&profile());
        assert!(brief.contains("- Name: Acme"));
        assert!(brief.contains("- Traction: Not provided"));
        assert!(brief.contains("- Additional Notes: None"));
    }

    #[test]
    fn brief_keeps_provided_optionals() {
        let mut p = profile();
        p.traction = "40% MoM".into();
        let brief = render_brief(&p);
        assert!(brief.contains("- Traction: 40% MoM"));
    }

    #[test]
    fn review_prompt_leads_with_persona_voice() {
        let p = persona("seed-vc", "Maya");
        let settings = PanelSettings::default();
        let messages = build_review_prompt(&p, "BRIEF", &settings);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.starts_with("You are Maya"));
        assert!(messages[1].content.ends_with("BRIEF"));
    }

    #[test]
    fn review_prompt_carries_full_json_contract() {
        let p = persona("seed-vc", "Maya");
        let messages = build_review_prompt(&p, "B", &PanelSettings::default());
        let system = &messages[0].content;
        for key in [
            "\"verdict\"",
            "\"dueDiligenceQuestions\"",
            "\"suggestedMilestone\"",
            "\"scoreCard\"",
            "\"narrativeClarity\"",
            "ONLY valid JSON",
        ] {
            assert!(system.contains(key), "missing {key}");
        }
    }

    #[test]
    fn review_prompt_reflects_risk_and_mode() {
        let p = persona("seed-vc", "Maya");
        let settings = PanelSettings {
            agent_count: 3,
            mode: PanelMode::Deep,
            risk_tolerance: RiskTolerance::Aggressive,
        };
        let system = &build_review_prompt(&p, "B", &settings)[0].content;
        assert!(system.contains("big vision"));
        assert!(system.contains("thorough, detailed"));
    }

    #[test]
    fn discussion_prompt_requests_turn_budget_by_mode() {
        let personas = vec![persona("a", "Maya"), persona("b", "Dev"), persona("c", "Lauren")];
        let reviews = vec![review("Maya", Verdict::Invest)];

        let fast = PanelSettings::default();
        let system = &build_discussion_prompt(&personas, &reviews, "B", &fast)[0].content;
        assert!(system.contains("with 6 exchanges total"));
        assert!(system.contains("\"turn\": 1-6"));

        let deep = PanelSettings {
            mode: PanelMode::Deep,
            ..PanelSettings::default()
        };
        let system = &build_discussion_prompt(&personas, &reviews, "B", &deep)[0].content;
        assert!(system.contains("with 12 exchanges total"));
        assert!(system.contains("\"turn\": 1-12"));
    }

    #[test]
    fn discussion_prompt_summarizes_each_review() {
        let personas = vec![persona("a", "Maya"), persona("b", "Dev")];
        let reviews = vec![review("Maya", Verdict::Invest), review("Dev", Verdict::Pass)];
        let system = &build_discussion_prompt(&personas, &reviews, "B", &PanelSettings::default())[0]
            .content;
        assert!(system.contains("Maya, Seed VC: Invest"));
        assert!(system.contains("Dev, Seed VC: Pass"));
        assert!(system.contains("Direct, pattern-matching"));
    }

    #[test]
    fn synthesis_prompt_quotes_only_first_six_messages() {
        let personas = vec![persona("a", "Maya")];
        let reviews = vec![review("Maya", Verdict::Maybe)];
        let discussion: Vec<DiscussionMessage> = (1..=9)
            .map(|i| message("Maya", i, &format!("point-{i}")))
            .collect();

        let system = &build_synthesis_prompt(&personas, &reviews, &discussion, "B")[0].content;
        assert!(system.contains("point-6"));
        assert!(!system.contains("point-7"));
    }

    #[test]
    fn synthesis_prompt_carries_key_scores_and_contract() {
        let personas = vec![persona("a", "Maya")];
        let reviews = vec![review("Maya", Verdict::Invest)];
        let system = &build_synthesis_prompt(&personas, &reviews, &[], "B")[0].content;
        assert!(system.contains("(Team: 7, Market: 7, Product: 7)"));
        assert!(system.contains("\"confidencePercent\""));
        assert!(system.contains("\"keyDisagreements\""));
    }

    #[test]
    fn follow_up_prompt_names_every_persona() {
        let personas = vec![persona("a", "Maya"), persona("b", "Dev")];
        let messages = build_follow_up_prompt("How big should our round be?", &profile(), &personas);
        assert!(messages[0].content.contains("Maya, Dev"));
        assert!(messages[0].content.contains("under 200 words"));
        assert_eq!(messages[1].content, "How big should our round be?");
    }
}
