//! Answer generation with the LLM

pub mod answer;
pub mod prompt;

pub use answer::GenerationOrchestrator;
pub use prompt::PromptBuilder;
