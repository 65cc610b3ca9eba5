//! Fetch command implementation.

use crate::cli::FetchArgs;
use crate::error::Result;
use crate::output::Formatter;
use harvest_fetch::FetchOptions;
use harvest_llm::OllamaProvider;
use harvest_sdk::Harvester;
use std::fs;

/// Execute the fetch command.
pub async fn execute_fetch(
    args: FetchArgs,
    harvester: &Harvester<OllamaProvider>,
    formatter: &Formatter,
) -> Result<()> {
    let mut options = FetchOptions::default();
    if let Some(selector) = args.wait_for {
        options = options.with_wait_for(selector);
    }

    let html = harvester.fetch_html(&args.url, args.browser, &options).await?;

    match args.output {
        Some(path) => {
            fs::write(&path, &html)?;
            formatter.status(formatter.success(&format!(
                "Saved {} chars to {}",
                html.chars().count(),
                path.display()
            )));
        }
        None => println!("{}", html),
    }

    Ok(())
}
