//! `pipehat query` - read item values from message files

use pipehat_core::{Address, Result, ResultExt, expand_paths};

use super::{load_message, parse_filter, passes_filter};
use crate::OutputFormat;
use crate::output::{OutputFormatter, QueryReport};

pub fn query_command(
    address: &str,
    paths: &[String],
    filter: Option<&str>,
    format: OutputFormat,
    use_colors: bool,
) -> Result<usize> {
    // A bad address or filter is a caller mistake; fail before touching files.
    let _: Address = address.parse()?;
    let filter = parse_filter(filter)?;
    let files = expand_paths(paths)?;

    let mut failures = 0;
    let mut reports = Vec::new();
    for path in &files {
        let Some(message) = load_message(path).log_and_continue() else {
            failures += 1;
            continue;
        };
        if !passes_filter(filter.as_ref(), &message, path) {
            continue;
        }
        reports.push(QueryReport {
            path: path.display().to_string(),
            address: address.to_string(),
            values: message.query(address)?,
        });
    }

    OutputFormatter::new(format, use_colors).print_query_reports(&reports)?;
    Ok(failures)
}
