//! `inkloop ask`: the action agent, one-shot or as a chat session.

use std::io::Write;

use inkloop_agent::ActionAgent;
use inkloop_core::message::Role;
use inkloop_tools::ActionKind;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CmdResult, load_config, model_provider};

pub async fn run(message: Option<String>) -> CmdResult {
    let config = load_config()?;
    let (provider, model) = model_provider(&config)?;

    let agent = ActionAgent::new(provider, &model)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_max_iterations(config.agent.max_iterations);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let answer = agent.run(&msg).await?;
        eprint!("\r              \r");
        println!("{answer}");
        return Ok(());
    }

    // Interactive mode
    let actions: Vec<&str> = ActionKind::ALL.iter().map(|k| k.name()).collect();
    println!();
    println!("  inkloop ask: interactive mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {model}");
    println!("  Actions:   {}", actions.join(", "));
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let before = agent.history().await.len();
        match agent.run(line).await {
            Ok(_) => {
                // the whole exchange for this turn, observations included
                for msg in agent.history().await.iter().skip(before + 1) {
                    let who = match msg.role {
                        Role::Assistant => "Assistant",
                        Role::User => "Observation",
                        Role::System | Role::Tool => continue,
                    };
                    for text in msg.content.lines() {
                        println!("  {who} > {text}");
                    }
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}
