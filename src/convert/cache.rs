//! Per-run cache of workbook sheet names

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::parser::TableReader;

/// Sheet names keyed by input path.
///
/// Entries live for the whole run and are never invalidated, so a workbook is
/// enumerated at most once.
#[derive(Debug, Default)]
pub struct SheetCache {
    entries: FxHashMap<PathBuf, Vec<String>>,
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached sheet names, detecting them on first use
    pub fn get_or_detect(&mut self, path: &Path, reader: &TableReader) -> Result<&[String]> {
        if !self.entries.contains_key(path) {
            let names = reader.detect_sheets(path)?;
            self.entries.insert(path.to_path_buf(), names);
        }
        Ok(self.entries.get(path).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn get(&self, path: &Path) -> Option<&[String]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::NoAutomation;
    use std::fs;

    #[test]
    fn test_entries_are_not_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        fs::write(&path, "a\n1\n").unwrap();
        let reader = TableReader::new(Box::new(NoAutomation));

        let mut cache = SheetCache::new();
        assert!(cache.get_or_detect(&path, &reader).unwrap().is_empty());
        assert_eq!(cache.len(), 1);

        // the file is gone but the cached answer still stands
        fs::remove_file(&path).unwrap();
        assert!(cache.get_or_detect(&path, &reader).is_ok());
        assert_eq!(cache.get(&path), Some(&[][..]));
    }
}
