//! Subcommand implementations: query, set/mask/deidentify, send

pub mod edit;
pub mod query;
pub mod send;

use std::fs;
use std::path::Path;

use pipehat_core::{Filter, Message, PipehatError, Result};
use tracing::info;

/// Read and parse one message file.
pub(crate) fn load_message(path: &Path) -> Result<Message> {
    let text = fs::read_to_string(path).map_err(|err| PipehatError::io(path, err))?;
    Message::parse(&text)
}

pub(crate) fn parse_filter(filter: Option<&str>) -> Result<Option<Filter>> {
    filter.map(str::parse).transpose()
}

/// True when no filter is set or the message passes it.
pub(crate) fn passes_filter(filter: Option<&Filter>, message: &Message, path: &Path) -> bool {
    match filter {
        Some(filter) if !filter.matches(message) => {
            info!("skipping {} (filter did not match)", path.display());
            false
        }
        _ => true,
    }
}
