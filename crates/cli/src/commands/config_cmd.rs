//! `inkloop config`: configuration management commands.

use inkloop_config::AppConfig;

use super::{CmdResult, load_config};

pub async fn init(force: bool) -> CmdResult {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if config_path.exists() && !force {
        println!("  Config already exists: {}", config_path.display());
        println!("  Use --force to overwrite it.");
        return Ok(());
    }

    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Wrote {}", config_path.display());
    println!();
    println!("  Next steps:");
    println!("    export OPENROUTER_API_KEY=sk-or-v1-...");
    println!("    export TAVILY_API_KEY=tvly-...");
    println!("    inkloop ask -m \"How much does a Border Collie weigh?\"");
    Ok(())
}

/// Print the effective configuration. Secrets are never printed.
pub async fn show() -> CmdResult {
    let mut config = load_config()?;
    let has_key = config.has_api_key();
    let has_search_key = config.search.api_key.is_some();

    config.api_key = None;
    config.search.api_key = None;
    for provider in config.providers.values_mut() {
        provider.api_key = None;
    }

    println!("{}", toml::to_string_pretty(&config)?);
    println!("# model API key:  {}", if has_key { "set" } else { "missing" });
    println!("# search API key: {}", if has_search_key { "set" } else { "missing" });
    Ok(())
}

pub async fn path() -> CmdResult {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
