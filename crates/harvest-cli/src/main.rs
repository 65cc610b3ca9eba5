//! Harvest CLI - LLM-driven structured extraction from web pages.

use clap::Parser;
use harvest_cli::commands;
use harvest_cli::{Cli, Command, Config, Formatter};
use harvest_llm::OllamaProvider;
use harvest_sdk::Harvester;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = Formatter::new(!cli.no_color);

    init_tracing(cli.verbose);

    if let Err(e) = run(cli, &formatter).await {
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug,chromiumoxide=info" } else { "info,chromiumoxide=warn" };

    // Logs go to stderr so stdout carries only results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .init();
}

async fn run(cli: Cli, formatter: &Formatter) -> harvest_cli::Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load(&path)?;
    debug!(path = %path.display(), "Loaded configuration");

    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    if let Some(endpoint) = cli.endpoint {
        config.llm.endpoint = endpoint;
    }
    debug!(model = %config.llm.model, endpoint = %config.llm.endpoint, "Using model");

    match cli.command {
        Command::Config(args) => commands::execute_config(args, &config, &path, formatter),
        Command::Scrape(args) => commands::execute_scrape(args, &harvester(&config)?, formatter).await,
        Command::Extract(args) => commands::execute_extract(args, &harvester(&config)?, formatter).await,
        Command::Fetch(args) => commands::execute_fetch(args, &harvester(&config)?, formatter).await,
        Command::Analyze(args) => commands::execute_analyze(args, &harvester(&config)?, formatter).await,
    }
}

fn harvester(config: &Config) -> harvest_cli::Result<Harvester<OllamaProvider>> {
    Ok(Harvester::new(config.provider(), config.harvester())?)
}
