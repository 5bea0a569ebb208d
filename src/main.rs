mod agent;
mod cli;
mod config;
mod consts;
mod llm;
mod repl;
mod request;

use agent::Agent;
use anyhow::{Context, Result};
use clap::Parser;
use repl::Repl;
use request::Supervisor;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::CliArgs::parse();
    let config =
        config::load_from_file_list(&args.config_paths()).context("loading configuration")?;

    let llm_config = config
        .llm
        .get(&config.default_llm)
        .with_context(|| format!("default LLM '{}' not found in configuration", config.default_llm))?;

    let client = llm::instantiate(llm_config).context("building LLM client")?;

    let prompt = llm_config
        .system_prompt()
        .unwrap_or(consts::DEFAULT_SYSTEM_PROMPT);
    let agent_name = config
        .agent_name
        .clone()
        .unwrap_or_else(|| consts::DEFAULT_AGENT_NAME.to_string());
    let agent = Agent::new(&agent_name, Some(prompt));

    let cancel_key = config.repl.cancel_key().context("parsing repl.cancel_key")?;
    let supervisor = Supervisor::new(cancel_key, config.repl.poll_interval());

    let mut repl = Repl::new(client, agent, supervisor, &config.repl.cancel_key, args.pipe);
    repl.run(&config).await
}
