// Interview engine: state machine, prompt composition, output sanitizing, HTTP handlers.
// All model calls go through composer -> llm_client::TextGenerator.

pub mod classifier;
pub mod composer;
pub mod handlers;
pub mod machine;
pub mod prompts;
pub mod sanitizer;

pub use composer::PromptComposer;
pub use machine::{Interviewer, StartedInterview, TurnOutcome};
