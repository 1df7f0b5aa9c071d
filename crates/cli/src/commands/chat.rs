//! `pitwall chat` — Interactive or single-message chat within a session.

use pitwall_config::AppConfig;
use pitwall_core::message::SessionKey;
use pitwall_session::{ModelSettings, SessionRegistry};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    session: Option<String>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    if config.api_key.is_none() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    CLOUDFLARE_API_TOKEN + CLOUDFLARE_ACCOUNT_ID   (Workers AI, default)");
        eprintln!("    OPENAI_API_KEY                                 (with PITWALL_PROVIDER=openai)");
        eprintln!("    PITWALL_API_KEY                                (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = super::default_provider(&config)?;
    let settings = ModelSettings::from_config(&config);
    let registry = SessionRegistry::new(
        pitwall_gateway::build_store(&config),
        config.session.clone(),
    );

    let key = SessionKey::new(session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()));
    let actor = registry.actor(&key).await;

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let reply = actor.chat(provider.as_ref(), &settings, &msg).await;
        eprint!("\r              \r");
        println!("{}", reply?);
        return Ok(());
    }

    let context = actor.read_context().await?;
    let history = actor.read_history().await?;

    println!();
    println!("  Pitwall — Interactive Chat");
    println!();
    println!("  Session:   {key}");
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", settings.model);
    println!("  History:   {} messages", history.len());
    println!(
        "  Context:   telemetry {}, strategy {}",
        if context.telemetry.is_some() { "yes" } else { "no" },
        if context.strategy.is_some() { "yes" } else { "no" }
    );
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text == "exit" || text == "quit" {
            break;
        }
        if !text.is_empty() {
            eprint!("  ...");
            match actor.chat(provider.as_ref(), &settings, text).await {
                Ok(reply) => {
                    eprint!("\r     \r");
                    println!();
                    for line in reply.lines() {
                        println!("  Pitwall > {line}");
                    }
                    println!();
                }
                Err(e) => {
                    eprint!("\r     \r");
                    eprintln!("  [Error] {e}");
                    println!();
                }
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Session saved as {key}");
    println!();

    Ok(())
}
