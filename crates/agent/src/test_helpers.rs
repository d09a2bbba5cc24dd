//! Shared test helpers: scripted model and search doubles.

use std::sync::Mutex;

use inkloop_core::error::{ProviderError, SearchError};
use inkloop_core::message::{Message, MessageToolCall};
use inkloop_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use inkloop_core::search::{SearchClient, SearchHit, SearchRequest, SearchResponse};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Panics if more calls are made than responses
/// provided. Calls listed with [`ScriptedProvider::failing_on`] return an
/// API error instead and consume no response.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
    failures: Vec<usize>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            failures: Vec::new(),
        }
    }

    /// Make the zero-based call `call` fail.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.failures.push(call);
        self
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| make_text_response(t)).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let call = requests.len();
        requests.push(request);
        if self.failures.contains(&call) {
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: "scripted failure".into(),
            });
        }
        let n = call - self.failures.iter().filter(|&&f| f < call).count();
        if n >= responses.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{call}, have {})",
                responses.len()
            );
        }
        Ok(responses[n].clone())
    }
}

/// A provider whose every call fails.
pub struct FailingProvider;

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::ApiError {
            status_code: 500,
            message: "upstream exploded".into(),
        })
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut response = make_text_response(thought);
    response.message.tool_calls = tool_calls;
    response
}

pub fn make_tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: args.to_string(),
    }
}

/// Search double: every query yields `max_results` hits whose content is
/// `"<query> #<i>"`. Queries listed in `fail_on` return a network error.
pub struct ScriptedSearch {
    queries: Mutex<Vec<SearchRequest>>,
    fail_on: Vec<String>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            fail_on: Vec::new(),
        }
    }

    pub fn failing_on(query: &str) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            fail_on: vec![query.to_string()],
        }
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchClient for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted_search"
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        self.queries.lock().unwrap().push(request.clone());
        if self.fail_on.contains(&request.query) {
            return Err(SearchError::Network("search backend unreachable".into()));
        }
        Ok(SearchResponse {
            results: (0..request.max_results)
                .map(|i| SearchHit {
                    title: format!("{} result {i}", request.query),
                    url: format!("https://example.com/{i}"),
                    content: format!("{} #{i}", request.query),
                    score: 1.0 - i as f32 * 0.1,
                })
                .collect(),
            answer: None,
        })
    }
}
