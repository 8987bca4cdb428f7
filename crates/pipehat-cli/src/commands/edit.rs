//! `pipehat set` / `pipehat mask` / `pipehat deidentify` - mutate message
//! files and report what changed

use std::fs;
use std::path::{Path, PathBuf};

use pipehat_core::{
    Address, Message, PipehatError, Result, ResultExt, ValueChange, expand_paths,
};
use rayon::prelude::*;
use tracing::info;

use super::{load_message, parse_filter, passes_filter};
use crate::EditArgs;
use crate::output::{ChangeReport, OutputFormatter};

/// The mutation a single run applies to every processed message.
pub enum EditOp {
    Set { address: String, value: String },
    Mask { address: String, mask: char },
    Deidentify { mask: char },
}

impl EditOp {
    /// Fail fast on a malformed address before any file is touched.
    fn validate(&self) -> Result<()> {
        match self {
            EditOp::Set { address, .. } | EditOp::Mask { address, .. } => {
                let _: Address = address.parse()?;
                Ok(())
            }
            EditOp::Deidentify { .. } => Ok(()),
        }
    }

    fn apply(&self, message: &mut Message) -> Result<Vec<ValueChange>> {
        match self {
            EditOp::Set { address, value } => message.set_item(address, value),
            EditOp::Mask { address, mask } => message.mask_item(address, *mask),
            EditOp::Deidentify { mask } => Ok(message.de_identify(*mask)),
        }
    }
}

enum Outcome {
    Done(ChangeReport),
    Skipped,
    Failed,
}

pub fn edit_command(op: EditOp, args: EditArgs, use_colors: bool) -> Result<usize> {
    op.validate()?;
    let filter = parse_filter(args.filter.as_deref())?;
    let files = expand_paths(&args.paths)?;

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).map_err(|err| PipehatError::io(dir, err))?;
    }

    let writes_files = args.write || args.out_dir.is_some();
    let outcomes: Vec<Outcome> = if writes_files {
        // Each worker owns its message tree whole; resolved handles never
        // cross a file boundary.
        files
            .par_iter()
            .map(|path| process_file(&op, path, filter.as_ref(), &args))
            .collect()
    } else {
        files
            .iter()
            .map(|path| process_file(&op, path, filter.as_ref(), &args))
            .collect()
    };

    let mut failures = 0;
    let mut reports = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Done(report) => reports.push(report),
            Outcome::Skipped => {}
            Outcome::Failed => failures += 1,
        }
    }

    if writes_files {
        OutputFormatter::new(args.format, use_colors).print_change_reports(&reports)?;
    }
    Ok(failures)
}

fn process_file(
    op: &EditOp,
    path: &Path,
    filter: Option<&pipehat_core::Filter>,
    args: &EditArgs,
) -> Outcome {
    let result = apply_to_file(op, path, filter, args);
    match result.log_and_continue() {
        Some(Some(report)) => Outcome::Done(report),
        Some(None) => Outcome::Skipped,
        None => Outcome::Failed,
    }
}

fn apply_to_file(
    op: &EditOp,
    path: &Path,
    filter: Option<&pipehat_core::Filter>,
    args: &EditArgs,
) -> Result<Option<ChangeReport>> {
    let mut message = load_message(path)?;
    if !passes_filter(filter, &message, path) {
        return Ok(None);
    }

    let changes = op.apply(&mut message)?;
    let serialized = message.to_string();

    match destination(path, args) {
        Some(destination) => {
            fs::write(&destination, &serialized)
                .map_err(|err| PipehatError::io(&destination, err))?;
            info!("wrote {}", destination.display());
        }
        None => print!("{serialized}"),
    }

    Ok(Some(ChangeReport {
        path: path.display().to_string(),
        changes,
    }))
}

fn destination(path: &Path, args: &EditArgs) -> Option<PathBuf> {
    if let Some(dir) = &args.out_dir {
        let name = path.file_name().unwrap_or(path.as_os_str());
        return Some(dir.join(name));
    }
    if args.write {
        return Some(path.to_path_buf());
    }
    None
}
