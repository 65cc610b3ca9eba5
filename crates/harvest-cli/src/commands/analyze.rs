//! Analyze command implementation.

use super::load_html;
use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use harvest_llm::OllamaProvider;
use harvest_sdk::Harvester;

/// Execute the analyze command.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    harvester: &Harvester<OllamaProvider>,
    formatter: &Formatter,
) -> Result<()> {
    if args.prompt.trim().is_empty() {
        return Err(CliError::InvalidInput("Prompt must not be empty".to_string()));
    }
    let html = load_html(&args.html)?;

    formatter.status(formatter.info(&format!("Analyzing {}", args.html.display())));
    let answer = harvester.analyze_html(&html, &args.prompt, args.temperature).await?;

    println!("{}", answer.trim());
    Ok(())
}
