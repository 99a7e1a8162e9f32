//! Prompt template for answer generation

use crate::types::RetrievedContext;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from retrieved chunks
    pub fn build_context(contexts: &RetrievedContext) -> String {
        contexts.joined_text()
    }

    /// Build the full RAG prompt
    pub fn build_rag_prompt(question: &str, context: &str) -> String {
        format!(
            "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you can't retrieve the answer from the context and you also don't know the answer for sure, just say that you don't know. \
Use three sentences maximum and keep the answer concise. \
Please answer in the language of the question.
Question: {question}
Context: {context}
Answer:",
            question = question,
            context = context,
        )
    }
}
