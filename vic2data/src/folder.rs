//! Recursive folder loading and linting.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::db::Database;
use crate::error::{Diagnostics, LoadError};

/// Every file below `dir`, depth first, in file name order.
pub fn files_in(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::Io {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Runs `load` on every file below `dir`.
///
/// Per-file error counts are summed and reported once for the folder; only
/// fatal errors stop the walk.
pub fn load_folder(
    db: &mut Database,
    dir: &Path,
    load: fn(&mut Database, &Path) -> Result<(), LoadError>,
) -> Result<(), LoadError> {
    let mut diag = Diagnostics::for_path(dir);
    let files = files_in(dir)?;
    for path in &files {
        log::debug!("Loading {}", path.display());
        diag.merge(load(db, path))?;
    }
    log::info!("Read {} files from {}", files.len(), dir.display());
    diag.finish()
}

/// Structural check of every text file below `dir`. Returns the number of
/// problems found.
pub fn lint_folder(dir: &Path) -> Result<usize, LoadError> {
    let mut problems = 0;
    for path in files_in(dir)?.iter().filter(|p| vic2txt::check::is_checkable(p)) {
        match vic2txt::check::check_file(path) {
            Ok(found) => problems += found.len(),
            Err(e) => {
                log::error!("{}", e);
                problems += 1;
            }
        }
    }
    Ok(problems)
}
