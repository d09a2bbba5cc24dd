//! Decoding the research steps' structured output.
//!
//! The model is asked for `{"queries": [...]}` but tends to wrap it in
//! prose or code fences. Everything from the first `{` to the last `}` is
//! decoded strictly: no other keys, no empty queries. At most
//! [`MAX_QUERIES`] are kept.

use inkloop_core::error::DecodeError;
use serde::Deserialize;
use serde_json::error::Category;
use tracing::warn;

pub const MAX_QUERIES: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Queries {
    queries: Vec<String>,
}

pub fn decode_queries(text: &str) -> Result<Vec<String>, DecodeError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(DecodeError::MissingObject);
    };
    if end < start {
        return Err(DecodeError::MissingObject);
    }

    let parsed: Queries = serde_json::from_str(&text[start..=end]).map_err(|e| match e.classify() {
        Category::Data => DecodeError::Schema(e.to_string()),
        _ => DecodeError::InvalidJson(e.to_string()),
    })?;

    let mut queries = Vec::with_capacity(parsed.queries.len());
    for (i, query) in parsed.queries.into_iter().enumerate() {
        let query = query.trim();
        if query.is_empty() {
            return Err(DecodeError::Schema(format!("query {i} is empty")));
        }
        queries.push(query.to_string());
    }

    if queries.len() > MAX_QUERIES {
        warn!(returned = queries.len(), kept = MAX_QUERIES, "Too many research queries");
        queries.truncate(MAX_QUERIES);
    }
    Ok(queries)
}
