use std::path::{Path, PathBuf};

use tracing::warn;

#[derive(Debug, Default)]
pub struct InputSet {
    pub files: Vec<PathBuf>,
    /// Entries dropped before processing because they do not exist.
    pub missing: usize,
}

/// Drop flag-like entries and paths that do not exist, keeping the order of the rest.
pub fn resolve_inputs(paths: &[PathBuf]) -> InputSet {
    let mut set = InputSet::default();
    for path in paths {
        if looks_like_flag(path) {
            warn!(arg = %path.display(), "ignoring unrecognized flag");
            continue;
        }
        if !path.exists() {
            warn!("File not found: {}", path.display());
            set.missing += 1;
            continue;
        }
        set.files.push(path.clone());
    }
    set
}

fn looks_like_flag(path: &Path) -> bool {
    path.to_str().is_some_and(|s| s.starts_with('-'))
}
