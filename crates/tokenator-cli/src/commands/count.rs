use anyhow::Result;
use tokenator_config::Config;
use tokenator_core::report::{ReportSummary, group_thousands};

use crate::cli::InputArgs;

pub async fn handle(input: InputArgs, json: bool, config: &Config) -> Result<()> {
    let batch = super::run_batch(input, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    println!("Files ({}):", batch.results.len());
    for result in &batch.results {
        match &result.error {
            Some(error) => println!("  {:<32} error: {}", result.file_name, error),
            None => println!(
                "  {:<32} {:>12} chars {:>12} tokens  {}",
                result.file_name,
                group_thousands(result.char_count),
                group_thousands(result.token_count),
                if result.is_exact { "exact" } else { "estimated" }
            ),
        }
    }

    let summary = ReportSummary::new(batch.results.len(), &batch.totals);
    println!();
    println!("{}", usage_line(&summary));
    println!(
        "  {} tokens / {} chars",
        group_thousands(summary.total_tokens),
        group_thousands(summary.total_chars)
    );

    Ok(())
}

fn usage_line(summary: &ReportSummary) -> String {
    let mut line = format!(
        "Context usage ({} files): {:.1}% of 1M limit",
        summary.file_count, summary.usage_percent
    );
    if summary.is_over_limit {
        line.push_str(" - OVER LIMIT");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenator_core::BatchTotals;

    #[test]
    fn test_usage_line() {
        let summary = ReportSummary::new(
            2,
            &BatchTotals {
                total_tokens: 125_000,
                total_chars: 500_000,
            },
        );
        assert_eq!(usage_line(&summary), "Context usage (2 files): 12.5% of 1M limit");

        let over = ReportSummary::new(
            1,
            &BatchTotals {
                total_tokens: 1_000_001,
                total_chars: 0,
            },
        );
        assert_eq!(
            usage_line(&over),
            "Context usage (1 files): 100.0% of 1M limit - OVER LIMIT"
        );
    }
}
