//! Output formatting for finalized bigram reports
//!
//! This module renders an `AggregationReport` as text, JSON or CSV.

use super::{AggregationReport, BigramCount, HistogramBucket, Report};
use crate::error::{BigramError, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Format type for output presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormatType {
    /// Plain text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// CSV format
    Csv,
}

/// Output formatter for bigram reports
pub struct OutputFormatter {
    format_type: FormatType,
}

impl OutputFormatter {
    /// Create a new formatter with the specified format type
    pub fn new(format_type: FormatType) -> Self {
        Self { format_type }
    }

    /// Format a report according to the configured format type
    pub fn format(&self, report: &AggregationReport) -> Result<String> {
        match self.format_type {
            FormatType::Text => self.format_text(report),
            FormatType::Json => Ok(serde_json::to_string(report)?),
            FormatType::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
            FormatType::Csv => self.format_csv(&report.result),
        }
    }

    /// Format as plain text
    fn format_text(&self, report: &AggregationReport) -> Result<String> {
        let mut output = String::new();
        let stats = &report.stats;

        writeln!(&mut output, "=== Bigram Results ===")?;
        writeln!(&mut output, "Partitions: {}", stats.partitions)?;
        writeln!(&mut output, "Records: {}", stats.records)?;
        writeln!(&mut output, "Skipped: {}", stats.skipped)?;
        if stats.retries > 0 {
            writeln!(&mut output, "Retries: {}", stats.retries)?;
        }
        writeln!(&mut output)?;

        match &report.result {
            Report::Full { bigrams } => {
                writeln!(&mut output, "All bigrams ({}):", bigrams.len())?;
                write_counts(&mut output, bigrams)?;
            }
            Report::TopK { k, bigrams } => {
                writeln!(&mut output, "Top {} bigrams:", k)?;
                write_counts(&mut output, bigrams)?;
            }
            Report::Histogram { buckets } => {
                writeln!(&mut output, "Histogram of how many bigrams share each count:")?;
                for bucket in buckets {
                    writeln!(
                        &mut output,
                        "  count {:>6}: {} bigram(s)",
                        bucket.count, bucket.num_bigrams
                    )?;
                }
            }
            Report::Distinct { bigrams } => {
                writeln!(&mut output, "Distinct bigrams ({}):", bigrams.len())?;
                for bigram in bigrams {
                    writeln!(&mut output, "  {}", bigram)?;
                }
            }
        }

        Ok(output)
    }

    /// Format as CSV
    fn format_csv(&self, result: &Report) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        match result {
            Report::Full { bigrams } | Report::TopK { bigrams, .. } => {
                writer.write_record(["bigram", "count"]).map_err(csv_error)?;
                for BigramCount { bigram, count } in bigrams {
                    writer
                        .write_record([bigram.to_string(), count.to_string()])
                        .map_err(csv_error)?;
                }
            }
            Report::Histogram { buckets } => {
                writer
                    .write_record(["count", "num_bigrams"])
                    .map_err(csv_error)?;
                for HistogramBucket { count, num_bigrams } in buckets {
                    writer
                        .write_record([count.to_string(), num_bigrams.to_string()])
                        .map_err(csv_error)?;
                }
            }
            Report::Distinct { bigrams } => {
                writer.write_record(["bigram"]).map_err(csv_error)?;
                for bigram in bigrams {
                    writer
                        .write_record([bigram.to_string()])
                        .map_err(csv_error)?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| output_error("CSV flush failed").with_source(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| output_error("CSV output is not UTF-8").with_source(e))
    }
}

fn write_counts(output: &mut String, bigrams: &[BigramCount]) -> std::fmt::Result {
    let width = bigrams
        .iter()
        .map(|e| e.count.to_string().len())
        .max()
        .unwrap_or(1);
    for entry in bigrams {
        writeln!(output, "  {:>width$}  {}", entry.count, entry.bigram, width = width)?;
    }
    Ok(())
}

fn output_error(message: &str) -> BigramError {
    BigramError::Other {
        code: ErrorCode::OTHER_OUTPUT,
        message: message.to_string(),
        source: None,
    }
}

fn csv_error(err: csv::Error) -> BigramError {
    output_error("CSV rendering failed").with_source(err)
}
