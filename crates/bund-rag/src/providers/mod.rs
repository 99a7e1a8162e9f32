//! Provider abstractions for embeddings, LLM, vector storage, and upload storage
//!
//! Every external collaborator sits behind a trait so the pipeline can be
//! wired with real clients at startup and with fakes in tests.

pub mod document_store;
pub mod embedding;
pub mod llm;
pub mod local;
pub mod memory;
pub mod ollama;
pub mod openai;
pub mod qdrant;
pub mod vector_store;

pub use document_store::DocumentStoreProvider;
pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use vector_store::{CollectionSpec, DistanceMetric, ScoredRecord, VectorDatabase, VectorRecord};

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Run a request, retrying with exponential backoff up to `max_retries` times
pub(crate) async fn retry_request<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_retries => {
                let delay = Duration::from_secs(backoff_secs(attempt));
                tracing::warn!(
                    "Request failed (attempt {}/{}): {}, retrying in {:?}",
                    attempt + 1,
                    max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Backoff before retry `attempt`, doubling from one second up to a minute
fn backoff_secs(attempt: u32) -> u64 {
    2u64.saturating_pow(attempt.min(MAX_BACKOFF_EXPONENT)).min(60)
}

const MAX_BACKOFF_EXPONENT: u32 = 6;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_request(0, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::embedding("down"))
        })
        .await;

        assert!(matches!(result, Err(Error::Embedding(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_request(2, || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::generation("flaky"))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_backoff_is_capped_for_large_attempts() {
        assert_eq!(backoff_secs(0), 1);
        assert_eq!(backoff_secs(3), 8);
        assert_eq!(backoff_secs(6), 60);
        assert_eq!(backoff_secs(64), 60);
        assert_eq!(backoff_secs(u32::MAX), 60);
    }
}
