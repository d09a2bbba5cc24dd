//! `inkloop research`: function-calling agent with a web search tool.

use inkloop_agent::ToolCallingAgent;
use inkloop_core::message::Role;
use inkloop_tools::WebSearchTool;

use super::{CmdResult, load_config, model_provider, search_client};

pub async fn run(question: &str, show_transcript: bool) -> CmdResult {
    let config = load_config()?;
    let (provider, model) = model_provider(&config)?;
    let search = search_client(&config)?;

    let agent = ToolCallingAgent::new(provider, search.clone(), &model)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_max_iterations(config.agent.max_iterations)
        .with_search_tool(WebSearchTool::new(search, config.search.tool_results));

    eprint!("  Researching...");
    let run = agent.run_detailed(question).await?;
    eprint!("\r                \r");

    if show_transcript {
        for msg in run.transcript.messages() {
            match msg.role {
                Role::Assistant if msg.has_tool_calls() => {
                    for call in &msg.tool_calls {
                        println!("[assistant] calling {}({})", call.name, call.arguments);
                    }
                }
                Role::Tool => println!(
                    "[tool {}] {}",
                    msg.tool_call_id.as_deref().unwrap_or("?"),
                    msg.content
                ),
                _ => println!("[{}] {}", msg.role, msg.content),
            }
        }
        println!();
        println!(
            "{} model call(s), {} search(es)",
            run.iterations, run.tool_calls_made
        );
    } else {
        println!("{}", run.answer);
    }
    Ok(())
}
