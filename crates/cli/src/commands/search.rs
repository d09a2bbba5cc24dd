//! `inkloop search`: a single web search with the service's own answer.

use inkloop_core::search::SearchRequest;

use super::{CmdResult, load_config, search_client};

pub async fn run(query: &str) -> CmdResult {
    let config = load_config()?;
    let client = search_client(&config)?;

    let response = client
        .search(SearchRequest::new(query, config.search.tool_results).with_answer())
        .await?;

    match &response.answer {
        Some(answer) => println!("{answer}"),
        None => {
            if response.results.is_empty() {
                println!("No results.");
            }
            for (i, hit) in response.results.iter().enumerate() {
                println!("{}. {} <{}>", i + 1, hit.title, hit.url);
                println!("   {}", hit.content);
            }
        }
    }
    Ok(())
}
