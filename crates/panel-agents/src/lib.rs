//! Investor panel simulation.
//!
//! Simulated investor personas independently review a startup profile,
//! hold a panel discussion about it, and synthesize a consensus report.
//! The whole pipeline runs over one [`gateway::CompletionGateway`] so
//! tests drive it with scripted fakes instead of a live model.
//!
//! Entry points: [`orchestrator::PanelOrchestrator::run`] for a full run,
//! [`orchestrator::PanelOrchestrator::follow_up`] for one-off Q&A.

pub mod coerce;
pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod personas;
pub mod prompts;
pub mod stages;
pub mod state;
pub mod types;

pub use error::{GatewayError, PanelError, PanelStage};
pub use orchestrator::{PanelOrchestrator, PanelRequest};
pub use types::{PanelArtifacts, PanelMode, PanelSettings, RiskTolerance, StartupProfile};
