//! Scrape command implementation.

use super::load_schema;
use crate::cli::ScrapeArgs;
use crate::error::Result;
use crate::output::Formatter;
use harvest_fetch::FetchOptions;
use harvest_llm::OllamaProvider;
use harvest_sdk::{Harvester, ScrapeOptions};

/// Execute the scrape command.
pub async fn execute_scrape(
    args: ScrapeArgs,
    harvester: &Harvester<OllamaProvider>,
    formatter: &Formatter,
) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let options = scrape_options(&args);

    formatter.status(formatter.info(&format!("Scraping {}", args.url)));
    let response = harvester.scrape(&args.url, &schema, &options).await?;

    if let Some(path) = &args.save_html {
        formatter.status(formatter.success(&format!("Saved HTML to {}", path.display())));
    }
    formatter.status(formatter.success(&format!(
        "Extracted {} field(s) via {}",
        response.record().field_count(),
        response.strategy()
    )));

    println!("{}", response.to_json(args.indent));
    Ok(())
}

fn scrape_options(args: &ScrapeArgs) -> ScrapeOptions {
    let mut fetch = FetchOptions::default();
    if let Some(selector) = &args.wait_for {
        fetch = fetch.with_wait_for(selector.as_str());
    }

    ScrapeOptions {
        instructions: args.instructions.clone(),
        use_browser: args.browser,
        auto_fallback: !args.no_fallback,
        save_html: args.save_html.clone(),
        fetch,
    }
}
