//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Harvest CLI - Extract structured data from web pages with a local model.
#[derive(Debug, Parser)]
#[command(name = "harvest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "HARVEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model to use, overriding the configuration
    #[arg(short, long, global = true, env = "HARVEST_MODEL")]
    pub model: Option<String>,

    /// Ollama endpoint, overriding the configuration
    #[arg(long, global = true, env = "OLLAMA_HOST")]
    pub endpoint: Option<String>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a page and extract a record matching a schema
    Scrape(ScrapeArgs),

    /// Extract a record from a saved HTML file
    Extract(ExtractArgs),

    /// Fetch a page and print its HTML
    Fetch(FetchArgs),

    /// Ask the model a free-form question about a saved HTML file
    Analyze(AnalyzeArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the scrape command.
#[derive(Debug, Parser)]
pub struct ScrapeArgs {
    /// Page URL
    pub url: String,

    /// JSON Schema file describing the record
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Extra guidance for the model
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// Render the page in a headless browser
    #[arg(short, long)]
    pub browser: bool,

    /// Do not fall back to the browser when HTTP output looks unrendered
    #[arg(long)]
    pub no_fallback: bool,

    /// Save the HTML that was extracted from
    #[arg(long)]
    pub save_html: Option<PathBuf>,

    /// CSS selector to wait for when rendering
    #[arg(long)]
    pub wait_for: Option<String>,

    /// JSON indentation width
    #[arg(long, default_value = "2")]
    pub indent: usize,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// HTML file
    #[arg(long)]
    pub html: PathBuf,

    /// JSON Schema file describing the record
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Extra guidance for the model
    #[arg(short, long)]
    pub instructions: Option<String>,
}

/// Arguments for the fetch command.
#[derive(Debug, Parser)]
pub struct FetchArgs {
    /// Page URL
    pub url: String,

    /// Render the page in a headless browser
    #[arg(short, long)]
    pub browser: bool,

    /// CSS selector to wait for when rendering
    #[arg(long)]
    pub wait_for: Option<String>,

    /// Write the HTML to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// HTML file
    #[arg(long)]
    pub html: PathBuf,

    /// Question or instruction for the model
    #[arg(short, long)]
    pub prompt: String,

    /// Sampling temperature
    #[arg(short, long)]
    pub temperature: Option<f32>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
