//! Output formatting for query results and change reports

use colored::Colorize;
use pipehat_core::{PipehatError, Result, ValueChange};
use serde::Serialize;

use crate::OutputFormat;

/// Values one address resolved to in one file.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub path: String,
    pub address: String,
    pub values: Vec<String>,
}

/// Before/after pairs one mutating command produced in one file.
#[derive(Debug, Serialize)]
pub struct ChangeReport {
    pub path: String,
    pub changes: Vec<ValueChange>,
}

/// Output formatter for the supported formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    pub fn print_query_reports(&self, reports: &[QueryReport]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for report in reports {
                    if report.values.is_empty() {
                        println!("{}: {} matched nothing", self.path(&report.path), report.address);
                        continue;
                    }
                    for value in &report.values {
                        println!("{}: {} = {}", self.path(&report.path), report.address, value);
                    }
                }
                Ok(())
            }
            OutputFormat::Json => print_json(reports),
        }
    }

    pub fn print_change_reports(&self, reports: &[ChangeReport]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for report in reports {
                    if report.changes.is_empty() {
                        println!("{}: no changes", self.path(&report.path));
                        continue;
                    }
                    println!("{}:", self.path(&report.path));
                    for change in &report.changes {
                        println!(
                            "  {}: '{}' -> '{}'",
                            change.location, change.before, change.after
                        );
                    }
                }
                Ok(())
            }
            OutputFormat::Json => print_json(reports),
        }
    }

    fn path(&self, path: &str) -> String {
        if self.use_colors {
            path.cyan().to_string()
        } else {
            path.to_string()
        }
    }
}

fn print_json<T: Serialize>(reports: &[T]) -> Result<()> {
    let rendered = serde_json::to_string_pretty(reports)
        .map_err(|err| PipehatError::internal(format!("failed to serialize report: {err}")))?;
    println!("{rendered}");
    Ok(())
}
