//! Extract command implementation.

use super::{load_html, load_schema};
use crate::cli::ExtractArgs;
use crate::error::Result;
use crate::output::Formatter;
use harvest_llm::OllamaProvider;
use harvest_sdk::Harvester;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    harvester: &Harvester<OllamaProvider>,
    formatter: &Formatter,
) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let html = load_html(&args.html)?;

    formatter.status(formatter.info(&format!(
        "Extracting {} from {}",
        schema.name(),
        args.html.display()
    )));
    let record = harvester
        .extract_from_html(&html, &schema, args.instructions.as_deref())
        .await?;

    if harvest_extractor::is_empty(&record) {
        formatter.status(formatter.warning("Most fields came back empty"));
    }

    println!("{}", record.to_json_pretty());
    Ok(())
}
