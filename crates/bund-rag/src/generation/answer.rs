//! Answer generation from retrieved context

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::types::{Answer, RetrievedContext};

use super::prompt::PromptBuilder;

/// Renders the prompt and calls the generative model
pub struct GenerationOrchestrator {
    llm: Arc<dyn LlmProvider>,
}

impl GenerationOrchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Answer `question` from `contexts`; the model's text is returned as is
    pub async fn answer(&self, question: &str, contexts: RetrievedContext) -> Result<Answer> {
        let context = PromptBuilder::build_context(&contexts);
        let prompt = PromptBuilder::build_rag_prompt(question, &context);

        tracing::info!(
            provider = self.llm.name(),
            model = self.llm.model(),
            contexts = contexts.len(),
            "Generating answer"
        );

        let text = self.llm.complete(&prompt).await?;

        Ok(Answer { text, contexts })
    }
}
