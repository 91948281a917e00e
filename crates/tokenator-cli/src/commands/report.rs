use std::path::PathBuf;

use anyhow::Result;
use time::OffsetDateTime;
use tokenator_config::Config;
use tokenator_core::{Report, ReportFormat};

use crate::cli::InputArgs;

pub async fn handle(
    input: InputArgs,
    format: Option<ReportFormat>,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let batch = super::run_batch(input, config).await?;

    let format = format.unwrap_or(config.report.format);
    let rendered = Report::build(&batch.results, &batch.totals)
        .with_timestamp(OffsetDateTime::now_utc())
        .render(format)?;

    match output.or_else(|| config.report.output.clone()) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, rendered).await?;
            println!("✓ Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
