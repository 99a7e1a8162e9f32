//! Document ingestion: format dispatch, loading, chunking and upload

mod chunker;
mod dispatcher;
mod parser;
mod processor;

pub use chunker::{TextChunker, TextSpan, TextSpans};
pub use dispatcher::FormatDispatcher;
pub use parser::{
    loader_for, DocumentLoader, HtmlLoader, JsonLoader, MarkdownLoader, PdfLoader, TextLoader,
    WordLoader,
};
pub use processor::{BatchPolicy, SkippedFile, UploadPipeline, UploadReport};
