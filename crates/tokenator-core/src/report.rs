//! Report formatter - export artifact for a finished batch
//!
//! `Report::build` is a pure function of the results and totals it is given.
//! Rendering to Markdown or JSON happens on the built value.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::{BatchTotals, CONTEXT_WINDOW_TOKENS, FileResult, Result};

/// Files shown individually in the distribution before grouping
pub const TOP_FILES: usize = 5;

/// Files shown in the tokens vs characters comparison
pub const COMPARISON_FILES: usize = 10;

pub const OTHERS_LABEL: &str = "Others";

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(with = "time::serde::timestamp::option")]
    pub generated_at: Option<OffsetDateTime>,
    pub summary: ReportSummary,
    pub distribution: Vec<DistributionSlice>,
    pub comparison: Vec<ComparisonBar>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub file_count: usize,
    pub total_tokens: usize,
    pub total_chars: usize,
    pub budget_tokens: usize,
    /// Share of the budget used, clamped to 100 for display
    pub usage_percent: f64,
    /// Decided on the unclamped token total
    pub is_over_limit: bool,
}

impl ReportSummary {
    pub fn new(file_count: usize, totals: &BatchTotals) -> Self {
        let raw_percent = totals.total_tokens as f64 / CONTEXT_WINDOW_TOKENS as f64 * 100.0;

        Self {
            file_count,
            total_tokens: totals.total_tokens,
            total_chars: totals.total_chars,
            budget_tokens: CONTEXT_WINDOW_TOKENS,
            usage_percent: raw_percent.min(100.0),
            is_over_limit: totals.total_tokens > CONTEXT_WINDOW_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub label: String,
    pub token_count: usize,
    pub share_percent: f64,
    pub is_others: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonBar {
    pub file_name: String,
    pub token_count: usize,
    pub char_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub file_name: String,
    pub char_count: usize,
    pub token_count: usize,
    pub is_exact: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&FileResult> for ReportRow {
    fn from(result: &FileResult) -> Self {
        Self {
            file_name: result.file_name.clone(),
            char_count: result.char_count,
            token_count: result.token_count,
            is_exact: result.is_exact,
            error: result.error.clone(),
        }
    }
}

impl Report {
    pub fn build(results: &[FileResult], totals: &BatchTotals) -> Self {
        Self {
            generated_at: None,
            summary: ReportSummary::new(results.len(), totals),
            distribution: distribution(results, totals.total_tokens),
            comparison: results
                .iter()
                .take(COMPARISON_FILES)
                .map(|r| ComparisonBar {
                    file_name: r.file_name.clone(),
                    token_count: r.token_count,
                    char_count: r.char_count,
                })
                .collect(),
            rows: results.iter().map(ReportRow::from).collect(),
        }
    }

    pub fn with_timestamp(mut self, generated_at: OffsetDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Markdown => Ok(self.to_markdown()),
            ReportFormat::Json => self.to_json(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_markdown(&mut out);
        out
    }

    fn write_markdown(&self, out: &mut String) -> fmt::Result {
        let summary = &self.summary;

        writeln!(out, "# Tokenator Report\n")?;
        if let Some(generated_at) = self.generated_at {
            if let Ok(stamp) = generated_at.format(&Rfc3339) {
                writeln!(out, "Generated: {}\n", stamp)?;
            }
        }

        writeln!(out, "## Analysis Summary\n")?;
        writeln!(out, "| Total Files | Total Tokens | Total Characters |")?;
        writeln!(out, "|---:|---:|---:|")?;
        writeln!(
            out,
            "| {} | {} | {} |\n",
            summary.file_count,
            group_thousands(summary.total_tokens),
            group_thousands(summary.total_chars)
        )?;

        writeln!(
            out,
            "## Context Window Usage ({} Token Limit)\n",
            group_thousands(summary.budget_tokens)
        )?;
        write!(
            out,
            "`{}` {:.2}% Used",
            bar(summary.usage_percent / 100.0),
            summary.usage_percent
        )?;
        if summary.is_over_limit {
            write!(out, " (OVER LIMIT)")?;
        }
        writeln!(out, "\n")?;

        if self.rows.is_empty() {
            writeln!(out, "No files analyzed.")?;
            return Ok(());
        }

        writeln!(out, "## Token Distribution (Share per File)\n")?;
        for slice in &self.distribution {
            writeln!(
                out,
                "- {}: {} tokens ({:.1}%)",
                escape_cell(&slice.label),
                group_thousands(slice.token_count),
                slice.share_percent
            )?;
        }
        writeln!(out)?;

        writeln!(out, "## File Comparison (Tokens vs Characters)\n")?;
        let max = self
            .comparison
            .iter()
            .map(|c| c.token_count.max(c.char_count))
            .max()
            .unwrap_or(0)
            .max(1);
        for item in &self.comparison {
            writeln!(out, "- {}", escape_cell(&item.file_name))?;
            writeln!(
                out,
                "  - tokens `{}` {}",
                bar(item.token_count as f64 / max as f64),
                group_thousands(item.token_count)
            )?;
            writeln!(
                out,
                "  - chars  `{}` {}",
                bar(item.char_count as f64 / max as f64),
                group_thousands(item.char_count)
            )?;
        }
        writeln!(out)?;

        writeln!(out, "## Files\n")?;
        writeln!(out, "| File Name | Characters | Tokens |")?;
        writeln!(out, "|---|---:|---:|")?;
        for row in &self.rows {
            let tokens = match &row.error {
                Some(error) => format!("0 (error: {})", escape_cell(error)),
                None if row.is_exact => group_thousands(row.token_count),
                None => format!("~{}", group_thousands(row.token_count)),
            };
            writeln!(
                out,
                "| {} | {} | {} |",
                escape_cell(&row.file_name),
                group_thousands(row.char_count),
                tokens
            )?;
        }

        Ok(())
    }
}

/// Top files by token count, remainder grouped into one slice
fn distribution(results: &[FileResult], total_tokens: usize) -> Vec<DistributionSlice> {
    let mut sorted: Vec<&FileResult> = results.iter().collect();
    // Stable, so ties keep input order
    sorted.sort_by(|a, b| b.token_count.cmp(&a.token_count));

    let denominator = total_tokens.max(1) as f64;
    let share = |tokens: usize| tokens as f64 / denominator * 100.0;

    let mut slices: Vec<DistributionSlice> = sorted
        .iter()
        .take(TOP_FILES)
        .map(|r| DistributionSlice {
            label: r.file_name.clone(),
            token_count: r.token_count,
            share_percent: share(r.token_count),
            is_others: false,
        })
        .collect();

    if sorted.len() > TOP_FILES {
        let others: usize = sorted[TOP_FILES..].iter().map(|r| r.token_count).sum();
        slices.push(DistributionSlice {
            label: OTHERS_LABEL.to_string(),
            token_count: others,
            share_percent: share(others),
            is_others: true,
        });
    }

    slices
}

fn bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0)) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Format with `,` thousands separators
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
