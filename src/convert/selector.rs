//! Sheet selection protocol

use std::path::PathBuf;

use indexmap::IndexMap;

/// Workbook path → sheet names, in input order
pub type SheetListing = IndexMap<PathBuf, Vec<String>>;

/// Chooses which sheets of each workbook are converted.
///
/// Returning `None` cancels the whole batch. A path mapped to an empty list,
/// or left out of the result, is skipped.
pub trait SheetSelector {
    fn select(&mut self, sheets: &SheetListing) -> Option<SheetListing>;
}

impl<F> SheetSelector for F
where
    F: FnMut(&SheetListing) -> Option<SheetListing>,
{
    fn select(&mut self, sheets: &SheetListing) -> Option<SheetListing> {
        self(sheets)
    }
}

/// Selects every sheet of every workbook
#[derive(Debug, Clone, Copy, Default)]
pub struct AllSheets;

impl SheetSelector for AllSheets {
    fn select(&mut self, sheets: &SheetListing) -> Option<SheetListing> {
        Some(sheets.clone())
    }
}

/// Selects the named sheets wherever they exist, in workbook order
#[derive(Debug, Clone, Default)]
pub struct NamedSheets {
    names: Vec<String>,
}

impl NamedSheets {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl SheetSelector for NamedSheets {
    fn select(&mut self, sheets: &SheetListing) -> Option<SheetListing> {
        let chosen = sheets
            .iter()
            .map(|(path, available)| {
                let picked: Vec<String> = available
                    .iter()
                    .filter(|sheet| self.names.contains(*sheet))
                    .cloned()
                    .collect();
                (path.clone(), picked)
            })
            .collect();
        Some(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> SheetListing {
        let mut listing = SheetListing::new();
        listing.insert(PathBuf::from("a.xlsx"), vec!["Jan".into(), "Feb".into()]);
        listing.insert(PathBuf::from("b.xlsx"), vec!["Summary".into()]);
        listing
    }

    #[test]
    fn test_all_sheets() {
        assert_eq!(AllSheets.select(&listing()), Some(listing()));
    }

    #[test]
    fn test_named_sheets_keep_workbook_order() {
        let mut selector = NamedSheets::new(vec!["Feb".into(), "Jan".into(), "Mar".into()]);
        let chosen = selector.select(&listing()).unwrap();
        assert_eq!(chosen[&PathBuf::from("a.xlsx")], vec!["Jan", "Feb"]);
        assert!(chosen[&PathBuf::from("b.xlsx")].is_empty());
    }

    #[test]
    fn test_closure_can_cancel() {
        let mut cancel = |_: &SheetListing| -> Option<SheetListing> { None };
        assert!(cancel.select(&listing()).is_none());
    }
}
