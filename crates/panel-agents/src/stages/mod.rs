//! Pipeline stages.
//!
//! Each stage is a free async function over the [`CompletionGateway`]
//! trait: build the prompt, make the call(s), coerce the output. Stage
//! sequencing and state tracking live in the orchestrator, not here.
//!
//! [`CompletionGateway`]: crate::gateway::CompletionGateway

pub mod discussion;
pub mod followup;
pub mod review;
pub mod synthesis;

pub use discussion::discuss;
pub use followup::follow_up;
pub use review::review_all;
pub use synthesis::synthesize;
