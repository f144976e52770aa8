use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use panel_agents::config::PanelConfig;
use panel_agents::orchestrator::{PanelOrchestrator, PanelRequest};
use panel_agents::personas;
use panel_agents::types::{PanelMode, PanelSettings, RiskTolerance, StartupProfile};

/// Run a simulated investor panel over a startup profile.
#[derive(Parser)]
#[command(name = "panel")]
struct Cli {
    /// Path to the startup profile JSON file.
    profile: PathBuf,

    /// Persona catalog TOML file; omit to use the built-in panel.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Number of personas to seat (3-8).
    #[arg(long, default_value_t = 3)]
    agents: usize,

    /// Discussion depth.
    #[arg(long, value_enum, default_value = "fast")]
    mode: ModeArg,

    /// Evaluation framing.
    #[arg(long, value_enum, default_value = "balanced")]
    risk: RiskArg,

    /// Ask the panel a follow-up question after the run completes.
    #[arg(long)]
    question: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Fast,
    Deep,
}

#[derive(Clone, Copy, ValueEnum)]
enum RiskArg {
    Conservative,
    Balanced,
    Aggressive,
}

impl From<ModeArg> for PanelMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Fast => PanelMode::Fast,
            ModeArg::Deep => PanelMode::Deep,
        }
    }
}

impl From<RiskArg> for RiskTolerance {
    fn from(arg: RiskArg) -> Self {
        match arg {
            RiskArg::Conservative => RiskTolerance::Conservative,
            RiskArg::Balanced => RiskTolerance::Balanced,
            RiskArg::Aggressive => RiskTolerance::Aggressive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.profile)
        .with_context(|| format!("reading profile {}", cli.profile.display()))?;
    let profile: StartupProfile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing profile {}", cli.profile.display()))?;

    let catalog = match &cli.catalog {
        Some(path) => personas::load_catalog(path)?,
        None => personas::builtin(),
    };

    let settings = PanelSettings {
        agent_count: cli.agents,
        mode: cli.mode.into(),
        risk_tolerance: cli.risk.into(),
    };

    let config = PanelConfig::default();
    info!(
        url = %config.gateway.url,
        model = %config.gateway.model,
        agents = settings.agent_count,
        "starting investor panel"
    );

    let orchestrator = PanelOrchestrator::from_config(config)?;
    let request = PanelRequest {
        profile,
        settings,
        personas: catalog,
    };

    let artifacts = match orchestrator.run(&request).await {
        Ok(artifacts) => artifacts,
        Err(err) => {
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&artifacts)?);

    if let Some(question) = &cli.question {
        let answer = match orchestrator
            .follow_up(question, &request.profile, &request.personas)
            .await
        {
            Ok(answer) => answer,
            Err(err) => {
                eprintln!("{}", err.user_message());
                return Err(err.into());
            }
        };
        println!("\nFOLLOW-UP: {question}\n{answer}");
    }

    Ok(())
}
