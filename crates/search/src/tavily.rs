//! Tavily search API client.
//!
//! `POST {base}/search` with the API key in the body. Results come back
//! ranked; each carries the `content` snippet the research steps collect.

use std::time::Duration;

use async_trait::async_trait;
use inkloop_core::error::SearchError;
use inkloop_core::search::{SearchClient, SearchHit, SearchRequest, SearchResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct TavilyClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn request_body<'a>(&'a self, request: &'a SearchRequest) -> ApiRequest<'a> {
        ApiRequest {
            api_key: &self.api_key,
            query: &request.query,
            max_results: request.max_results,
            include_answer: request.include_answer,
        }
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let url = format!("{}/search", self.base_url);
        debug!(query = %request.query, max_results = request.max_results, "Tavily search");

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(e.to_string())
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(SearchError::AuthenticationFailed(
                "Tavily rejected the API key".into(),
            ));
        }
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Tavily returned error");
            return Err(SearchError::ApiError {
                status_code: status,
                message: body,
            });
        }

        let api: ApiResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(api.into_response(request.max_results))
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl ApiResponse {
    /// The service treats `max_results` as a hint; enforce it here.
    fn into_response(mut self, max_results: usize) -> SearchResponse {
        self.results.truncate(max_results);
        SearchResponse {
            results: self.results,
            answer: self.answer.filter(|a| !a.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TavilyClient {
        TavilyClient::new("https://api.tavily.com/", "tvly-test", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn body_carries_key_and_cap() {
        let c = client();
        let req = SearchRequest::new("blackwell gpu", 2).with_answer();
        let body = serde_json::to_value(c.request_body(&req)).unwrap();
        assert_eq!(body["api_key"], "tvly-test");
        assert_eq!(body["max_results"], 2);
        assert_eq!(body["include_answer"], true);
        assert_eq!(c.base_url, "https://api.tavily.com");
    }

    #[test]
    fn response_is_capped_and_keeps_order() {
        let api: ApiResponse = serde_json::from_value(serde_json::json!({
            "query": "q",
            "answer": "",
            "results": [
                {"title": "a", "url": "https://a", "content": "first", "score": 0.9},
                {"title": "b", "url": "https://b", "content": "second", "score": 0.8},
                {"title": "c", "url": "https://c", "content": "third", "score": 0.7}
            ]
        }))
        .unwrap();

        let resp = api.into_response(2);
        let contents: Vec<&str> = resp.results.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert!(resp.answer.is_none());
    }

    #[test]
    fn answer_is_kept_when_present() {
        let api: ApiResponse = serde_json::from_value(serde_json::json!({
            "answer": "Blackwell is a GPU architecture.",
            "results": []
        }))
        .unwrap();
        assert!(api.into_response(5).answer.unwrap().contains("Blackwell"));
    }
}
