//! Search client trait: the abstraction over hosted web search.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// A search request: one query and a result cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,

    pub max_results: usize,

    /// Ask the service for a synthesized answer alongside the results.
    #[serde(default)]
    pub include_answer: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            include_answer: false,
        }
    }

    pub fn with_answer(mut self) -> Self {
        self.include_answer = true;
        self
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    /// The snippet text that research steps accumulate.
    pub content: String,

    #[serde(default)]
    pub score: f32,
}

/// Ordered hits, best first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError>;
}
