//! End-to-end ingestion and answering over fake providers

mod common;

use std::sync::Arc;

use bund_rag::config::RagConfig;
use bund_rag::error::Error;
use bund_rag::ingestion::BatchPolicy;
use bund_rag::providers::local::LocalDocumentStore;
use bund_rag::providers::memory::InMemoryVectorDb;
use bund_rag::retrieval::CollectionState;
use bund_rag::server::state::AppState;
use bund_rag::types::UploadedFile;

use common::{long_paragraph, DownEmbedder, Harness, KeywordEmbedder, RecordingLlm, KEYWORDS};

#[tokio::test]
async fn test_markdown_paragraph_ingest_and_query() {
    let harness = Harness::new();
    let paragraph = long_paragraph();
    assert_eq!(paragraph.trim().chars().count(), 999);

    let report = harness
        .state
        .pipeline()
        .upload(vec![UploadedFile::new("story.md", paragraph.clone())])
        .await
        .unwrap();

    assert_eq!(report.files, 1);
    assert_eq!(report.chunks, 3);
    assert_eq!(
        report.message(),
        "Successfully uploaded 1 file(s) in 3 chunks to the vector store"
    );
    assert_eq!(harness.stored_points().await, 3);
    assert_eq!(harness.uploaded_files(), 1);

    let contexts = harness.state.retrieval().retrieve("lighthouse", 20).await.unwrap();
    assert_eq!(contexts.len(), 3);
    assert!(contexts.top().unwrap().content.contains("The lighthouse keeper counted the ship."));
    assert_eq!(contexts.top().unwrap().source.filename, "story.md");

    let scores: Vec<f32> = contexts.entries().iter().map(|c| c.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_retrieval_is_bounded_by_k() {
    let harness = Harness::new();
    harness
        .state
        .pipeline()
        .upload(vec![UploadedFile::new("story.md", long_paragraph())])
        .await
        .unwrap();

    let contexts = harness.state.retrieval().retrieve("harbour", 2).await.unwrap();
    assert_eq!(contexts.len(), 2);
}

#[tokio::test]
async fn test_unsupported_format_commits_nothing() {
    let harness = Harness::new();

    let err = harness
        .state
        .pipeline()
        .upload(vec![UploadedFile::new("image.xyz", b"\x89PNG".to_vec())])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedFormat(_)));
    assert_eq!(harness.stored_points().await, 0);
}

#[tokio::test]
async fn test_all_or_nothing_aborts_on_bad_file() {
    let harness = Harness::new();

    let err = harness
        .state
        .pipeline()
        .upload(vec![
            UploadedFile::new("good.md", "A harbour and a bakery."),
            UploadedFile::new("bad.json", "{ broken"),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Load { ref filename, .. } if filename == "bad.json"));
    assert_eq!(harness.stored_points().await, 0);
}

#[tokio::test]
async fn test_per_file_policy_skips_bad_files() {
    let harness = Harness::with_config(|config| {
        config.upload.batch_policy = BatchPolicy::PerFile;
    });

    let report = harness
        .state
        .pipeline()
        .upload(vec![
            UploadedFile::new("good.md", "A harbour and a bakery."),
            UploadedFile::new("notes.xyz", "ignored"),
            UploadedFile::new("data.json", r#"{"bakery": "open"}"#),
        ])
        .await
        .unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.chunks, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].filename, "notes.xyz");
    assert_eq!(harness.stored_points().await, 2);
}

#[tokio::test]
async fn test_embedding_failure_commits_nothing() {
    let harness = Harness::build(Arc::new(DownEmbedder), |config| {
        config.embeddings.dimensions = 4;
    });

    let err = harness
        .state
        .pipeline()
        .upload(vec![UploadedFile::new("good.md", "Some text.")])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Embedding(_)));
    assert_eq!(harness.stored_points().await, 0);
}

#[tokio::test]
async fn test_clear_then_query_passes_empty_context() {
    let harness = Harness::new();
    harness
        .state
        .pipeline()
        .upload(vec![UploadedFile::new("story.md", long_paragraph())])
        .await
        .unwrap();

    let spec = harness.state.collection().clone();
    harness.state.documents().clear().await.unwrap();
    harness.state.collections().clear(&spec).await.unwrap();

    assert_eq!(harness.stored_points().await, 0);
    assert_eq!(harness.uploaded_files(), 0);
    assert_eq!(harness.state.collections().state(&spec.name).await, CollectionState::Ready);

    let contexts = harness.state.retrieval().retrieve("lighthouse", 20).await.unwrap();
    assert!(contexts.is_empty());

    let answer = harness.state.generation().answer("Who counted?", contexts).await.unwrap();
    assert_eq!(answer.text, RecordingLlm::ANSWER);
    assert!(answer.contexts.is_empty());

    let prompt = harness.llm.last_prompt().unwrap();
    assert!(prompt.contains("Question: Who counted?\nContext: \nAnswer:"));
}

#[tokio::test]
async fn test_answer_prompt_carries_retrieved_context() {
    let harness = Harness::new();
    harness
        .state
        .pipeline()
        .upload(vec![UploadedFile::new("story.md", long_paragraph())])
        .await
        .unwrap();

    let contexts = harness.state.retrieval().retrieve("lighthouse", 1).await.unwrap();
    let answer = harness
        .state
        .generation()
        .answer("What did the keeper count?", contexts)
        .await
        .unwrap();

    assert_eq!(answer.contexts.len(), 1);
    let prompt = harness.llm.last_prompt().unwrap();
    assert!(prompt.contains("Question: What did the keeper count?"));
    assert!(prompt.contains("The lighthouse keeper counted the ship."));
}

#[tokio::test]
async fn test_concurrent_uploads_and_queries() {
    let harness = Harness::new();
    let state = harness.state.clone();

    let mut handles = Vec::new();
    for i in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                state
                    .pipeline()
                    .upload(vec![UploadedFile::new(format!("f{}.txt", i), "harbour lights")])
                    .await
                    .map(|_| ())
            } else {
                state.retrieval().retrieve("harbour", 5).await.map(|_| ())
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(harness.stored_points().await, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_clears_interleaved_with_uploads() {
    let harness = Harness::new();
    let state = harness.state.clone();
    let spec = state.collection().clone();

    let mut handles = Vec::new();
    for i in 0..12 {
        let state = state.clone();
        let spec = spec.clone();
        handles.push(tokio::spawn(async move {
            if i % 3 == 0 {
                state.collections().clear(&spec).await
            } else {
                state
                    .pipeline()
                    .upload(vec![UploadedFile::new(format!("story{}.md", i), long_paragraph())])
                    .await
                    .map(|report| assert_eq!(report.chunks, 3))
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(state.collections().state(&spec.name).await, CollectionState::Ready);
    let points = harness.stored_points().await;
    assert_eq!(points % 3, 0);
    assert!(points <= 8 * 3);
}

#[tokio::test]
async fn test_embedder_dimension_must_match_config() {
    let upload_dir = tempfile::TempDir::new().unwrap();
    let mut config = RagConfig::default();
    config.embeddings.dimensions = 8;
    config.upload.dir = upload_dir.path().to_path_buf();

    let documents = Arc::new(LocalDocumentStore::new(config.upload.dir.clone()).unwrap());
    let result = AppState::from_parts(
        config,
        Arc::new(KeywordEmbedder::new(KEYWORDS.to_vec())),
        Arc::new(RecordingLlm::default()),
        Arc::new(InMemoryVectorDb::new()),
        documents,
    );

    assert!(matches!(result, Err(Error::Config(_))));
}
