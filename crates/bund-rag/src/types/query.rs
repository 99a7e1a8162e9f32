//! Request types

use serde::{Deserialize, Serialize};

/// Body of `POST /rag`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagRequest {
    /// The user's question
    pub user_query: String,
}
