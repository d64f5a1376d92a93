//! Expansion of command-line inputs into a file list

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use tracing::warn;

/// Expand files, directories and glob patterns into a de-duplicated list.
///
/// Caller order is kept. Directory contents are walked recursively and sorted.
/// An input that matches nothing is kept as given so the batch can report it.
pub fn collect_inputs<S: AsRef<str>>(inputs: &[S]) -> Vec<PathBuf> {
    let mut files: IndexSet<PathBuf> = IndexSet::new();

    for input in inputs {
        let input = input.as_ref();
        let path = Path::new(input);
        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            files.extend(walk_dir(path));
        } else if is_pattern(input) {
            let matches = expand_glob(input);
            if matches.is_empty() {
                warn!(pattern = input, "pattern matched no files");
            }
            files.extend(matches);
        } else {
            files.insert(path.to_path_buf());
        }
    }

    files.into_iter().collect()
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn walk_dir(dir: &Path) -> Vec<PathBuf> {
    let root = PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()));
    expand_glob(&root.join("**").join("*").to_string_lossy())
}

fn expand_glob(pattern: &str) -> Vec<PathBuf> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(pattern, error = %e, "invalid glob pattern");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
