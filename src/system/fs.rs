//! Glob-based file and directory removal

use crate::error::{SystemError, SystemResult};
use crate::system::COMMAND_PREFIX;
use std::fs;
use std::path::{Path, PathBuf};

/// How [`remove_paths`] treats missing and undeletable paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOptions {
    /// A pattern matching nothing is not an error
    pub ignore_missing: bool,

    /// Deletion failures are skipped instead of returned
    pub ignore_undeletable: bool,

    /// Echo each pattern before removing it
    pub echo: bool,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        RemoveOptions {
            ignore_missing: true,
            ignore_undeletable: false,
            echo: true,
        }
    }
}

/// Expand each glob pattern and delete every matching file or directory tree
pub fn remove_paths<I, S>(patterns: I, options: RemoveOptions) -> SystemResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for pattern in patterns {
        remove_pattern(pattern.as_ref(), options)?;
    }
    Ok(())
}

fn remove_pattern(pattern: &str, options: RemoveOptions) -> SystemResult<()> {
    if options.echo {
        let flags = if options.ignore_missing { "-rf" } else { "-r" };
        println!("{} knit-rm {} {}", COMMAND_PREFIX, flags, pattern);
    }

    let entries = glob::glob(pattern).map_err(|e| SystemError::Pattern {
        pattern: pattern.to_string(),
        error: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(_) if options.ignore_undeletable => {}
            Err(e) => {
                let path = e.path().to_path_buf();
                return Err(SystemError::Remove {
                    path,
                    error: e.into_error(),
                });
            }
        }
    }

    if paths.is_empty() && !options.ignore_missing {
        return Err(SystemError::NoMatch(pattern.to_string()));
    }

    for path in paths {
        if let Err(error) = remove_path(&path) {
            if !options.ignore_undeletable {
                return Err(SystemError::Remove { path, error });
            }
        }
    }

    Ok(())
}

/// Remove a file, symlink, or directory tree without following symlinks
fn remove_path(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
