//! File discovery for CLI path arguments
//!
//! Arguments may be literal files, directories (walked recursively), or
//! glob patterns. Nonexistent matches are a warning, not an abort, so a
//! batch keeps going; only a syntactically bad pattern fails the call.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::PipehatError;
use crate::result::Result;

/// Expand path arguments into a deduplicated, sorted file list.
pub fn expand_paths(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for arg in args {
        let path = Path::new(arg);
        if path.is_dir() {
            collect_dir(path, &mut files);
            continue;
        }
        if path.is_file() {
            files.insert(path.to_path_buf());
            continue;
        }
        let entries = glob(arg)
            .map_err(|err| PipehatError::invalid_pattern(arg, err.to_string()))?;
        let mut matched = false;
        for entry in entries {
            match entry {
                Ok(path) if path.is_dir() => {
                    collect_dir(&path, &mut files);
                    matched = true;
                }
                Ok(path) => {
                    files.insert(path);
                    matched = true;
                }
                Err(err) => warn!("skipping unreadable path: {err}"),
            }
        }
        if !matched {
            warn!("no files matched '{arg}'");
        }
    }
    debug!("expanded {} argument(s) to {} file(s)", args.len(), files.len());
    Ok(files.into_iter().collect())
}

fn collect_dir(dir: &Path, files: &mut BTreeSet<PathBuf>) {
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if entry.file_type().is_file() {
            files.insert(entry.into_path());
        }
    }
}
