//! End-to-end conversion tests over generated workbooks and text files

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rust_xlsxwriter::{Workbook, XlsxError};

use tabconv::automation::{AutomationError, ConvertedWorkbook, LegacyConverter, NoAutomation};
use tabconv::config::{Config, OutputFormat, SheetMode};
use tabconv::convert::{AllSheets, Converter, SheetListing};
use tabconv::detect::OLE_SIGNATURE;
use tabconv::error::ErrorKind;
use tabconv::model::SHEET_NAME_COLUMN;
use tabconv::output::{write_table, WriteOutcome};
use tabconv::parser::{read_strict_tab, TableReader};
use tabconv::{ConvertError, Table};

mod fixtures {
    use super::*;

    /// `Jan` holds three rows, `Feb` only a header
    pub fn jan_feb_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let jan = workbook.add_worksheet();
        jan.set_name("Jan")?;
        jan.write_string(0, 0, "ISRC")?;
        jan.write_string(0, 1, "Units")?;
        for (i, (isrc, units)) in [("00012", 3.0), ("00013", 4.5), ("00014", 10.0)]
            .into_iter()
            .enumerate()
        {
            let row = i as u32 + 1;
            jan.write_string(row, 0, isrc)?;
            jan.write_number(row, 1, units)?;
        }

        let feb = workbook.add_worksheet();
        feb.set_name("Feb")?;
        feb.write_string(0, 0, "ISRC")?;
        feb.write_string(0, 1, "Units")?;

        workbook.save_to_buffer()
    }

    /// Three sheets with one row each
    pub fn quarter_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        for name in ["Q1", "Q2", "Q3"] {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name)?;
            sheet.write_string(0, 0, "code")?;
            sheet.write_string(1, 0, format!("{}-007", name))?;
        }
        workbook.save_to_buffer()
    }

    pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    /// Compound document header cut short; the built-in parser cannot open it
    pub fn broken_legacy(dir: &Path, name: &str) -> PathBuf {
        let mut bytes = OLE_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"truncated");
        write(dir, name, &bytes)
    }
}

fn config(out: &Path, format: OutputFormat) -> Config {
    Config::new(out.to_path_buf()).with_output_format(format)
}

fn converter(config: Config) -> Converter {
    Converter::with_reader(config, TableReader::new(Box::new(NoAutomation)))
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn test_selected_empty_sheet_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write(dir.path(), "book.xlsx", &fixtures::jan_feb_workbook().unwrap());
    let out = dir.path().join("out");

    let mut converter = converter(config(&out, OutputFormat::Csv));
    let report = converter.run_with_selector(&[input], &mut AllSheets).unwrap();

    assert_eq!(list_dir(&out), vec!["book_Jan.csv"]);
    assert_eq!(report.outputs_written, 1);
    assert!(report.is_success());

    let written = fs::read_to_string(out.join("book_Jan.csv")).unwrap();
    assert_eq!(written, "ISRC,Units\n00012,3\n00013,4.5\n00014,10\n");
}

#[test]
fn test_merged_workbook_carries_sheet_names() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write(dir.path(), "quarters.xlsx", &fixtures::quarter_workbook().unwrap());

    let reader = TableReader::new(Box::new(NoAutomation));
    let table = reader.read_table(&input).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.columns().collect::<Vec<_>>(), vec!["code", SHEET_NAME_COLUMN]);
    assert_eq!(table.cell(2, "code"), Some("Q3-007"));
    assert_eq!(table.cell(2, SHEET_NAME_COLUMN), Some("Q3"));
}

#[test]
fn test_named_sheets_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write(dir.path(), "quarters.xlsx", &fixtures::quarter_workbook().unwrap());
    let out = dir.path().join("out");

    let config = config(&out, OutputFormat::Json)
        .with_sheet_mode(SheetMode::Named(vec!["Q3".into(), "Q1".into(), "Q9".into()]));
    let mut converter = converter(config);
    let report = converter.run(&[input.clone()]).unwrap();

    assert_eq!(report.outputs_written, 2);
    assert_eq!(list_dir(&out), vec!["quarters_Q1.json", "quarters_Q3.json"]);
    assert_eq!(
        fs::read_to_string(out.join("quarters_Q1.json")).unwrap(),
        r#"[{"code":"Q1-007"}]"#
    );
    assert_eq!(
        converter.sheet_cache().get(&input).unwrap(),
        &["Q1".to_string(), "Q2".to_string(), "Q3".to_string()][..]
    );
}

#[test]
fn test_empty_selection_skips_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write(dir.path(), "book.xlsx", &fixtures::jan_feb_workbook().unwrap());
    let out = dir.path().join("out");

    let mut nothing = |sheets: &SheetListing| -> Option<SheetListing> {
        Some(sheets.keys().map(|path| (path.clone(), Vec::new())).collect())
    };
    let mut converter = converter(config(&out, OutputFormat::Csv));
    let report = converter.run_with_selector(&[input], &mut nothing).unwrap();

    assert_eq!(report.attempted, 1);
    assert_eq!(report.outputs_written, 0);
    assert!(report.files[0].error.is_none());
    assert!(list_dir(&out).is_empty());
}

#[test]
fn test_zip_named_xls_reads_as_modern() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write(dir.path(), "mislabelled.xls", &fixtures::jan_feb_workbook().unwrap());
    let out = dir.path().join("out");

    let report = converter(config(&out, OutputFormat::Tsv)).run(&[input]).unwrap();
    assert!(report.is_success(), "{:?}", report);

    let written = fs::read_to_string(out.join("mislabelled.tsv")).unwrap();
    assert!(written.starts_with("ISRC\tUnits\tSheetName\n00012\t3\tJan\n"));
}

#[test]
fn test_unreadable_legacy_without_automation() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::broken_legacy(dir.path(), "old.xls");
    let out = dir.path().join("out");

    let report = converter(config(&out, OutputFormat::Csv)).run(&[input]).unwrap();
    assert_eq!(report.outputs_written, 0);
    assert_eq!(report.converted, 0);

    let error = report.files[0].error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::DependencyMissing);
    assert!(error.message.contains("old.xls"));
    assert!(error.message.contains("BIFF8"));
    assert!(error.message.contains("soffice"));
    assert!(list_dir(&out).is_empty());
}

/// Stands in for the office suite by copying a prepared workbook
struct CopyingAutomation {
    workbook: Vec<u8>,
    produced: Rc<RefCell<Vec<PathBuf>>>,
}

impl LegacyConverter for CopyingAutomation {
    fn convert_to_modern(&self, source: &Path) -> Result<ConvertedWorkbook, AutomationError> {
        let dir = tempfile::tempdir()?;
        let stem = source.file_stem().unwrap_or_default();
        let path = dir.path().join(format!("{}.xlsx", stem.to_string_lossy()));
        fs::write(&path, &self.workbook)?;
        self.produced.borrow_mut().push(path.clone());
        Ok(ConvertedWorkbook::new(dir, path))
    }
}

#[test]
fn test_automation_fallback_reads_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::broken_legacy(dir.path(), "old.xls");
    let out = dir.path().join("out");

    let produced = Rc::new(RefCell::new(Vec::new()));
    let automation = CopyingAutomation {
        workbook: fixtures::quarter_workbook().unwrap(),
        produced: Rc::clone(&produced),
    };
    let reader = TableReader::new(Box::new(automation));

    let mut converter = Converter::with_reader(
        config(&out, OutputFormat::Csv).with_sheet_mode(SheetMode::Named(vec!["Q2".into(), "Q3".into()])),
        reader,
    );
    let report = converter.run(&[input.clone()]).unwrap();
    assert!(report.is_success(), "{:?}", report);
    assert_eq!(list_dir(&out), vec!["old_Q2.csv", "old_Q3.csv"]);
    assert_eq!(converter.sheet_cache().get(&input).map(<[String]>::len), Some(3));

    // one conversion for the sheet listing, one for all selected sheets
    let produced = produced.borrow();
    assert_eq!(produced.len(), 2);
    assert!(produced.iter().all(|path| !path.exists()));
}

#[test]
fn test_automation_fallback_keeps_dotted_names() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::broken_legacy(dir.path(), "statement.2024.01.xls");
    let out = dir.path().join("out");

    let produced = Rc::new(RefCell::new(Vec::new()));
    let automation = CopyingAutomation {
        workbook: fixtures::quarter_workbook().unwrap(),
        produced: Rc::clone(&produced),
    };
    let mut converter =
        Converter::with_reader(config(&out, OutputFormat::Csv), TableReader::new(Box::new(automation)));
    let report = converter.run(&[input]).unwrap();
    assert!(report.is_success(), "{:?}", report);
    assert_eq!(list_dir(&out), vec!["statement.2024.01.csv"]);

    let produced = produced.borrow();
    assert_eq!(produced[0].file_name().unwrap(), "statement.2024.01.xlsx");
}

#[test]
fn test_failed_automation_read_still_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::broken_legacy(dir.path(), "old.xls");

    let produced = Rc::new(RefCell::new(Vec::new()));
    let automation = CopyingAutomation {
        workbook: b"not a workbook".to_vec(),
        produced: Rc::clone(&produced),
    };
    let reader = TableReader::new(Box::new(automation));

    let err = reader.read_table(&input).unwrap_err();
    assert!(matches!(err, ConvertError::LegacyUnreadable { .. }), "{}", err);

    let produced = produced.borrow();
    assert_eq!(produced.len(), 1);
    assert!(!produced[0].exists());
    assert!(!produced[0].parent().unwrap().exists());
}

#[test]
fn test_empty_table_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nothing.xlsx");
    let outcome = write_table(&Table::new(["a"]), &path, OutputFormat::Xlsx).unwrap();
    assert_eq!(outcome, WriteOutcome::Skipped);
    assert!(!path.exists());
}

#[test]
fn test_strict_tab_round_trip() {
    let mut table = Table::new(["ISRC", "Title", "Amount Received", "Share %"]);
    table.add_row(vec!["00012".into(), "+007 Remix".into(), "12.50".into(), "0".into()], 2);
    table.add_row(vec!["00013".into(), "".into(), "3".into(), "50.5".into()], 3);
    table.add_row(vec!["US-XYZ".into(), "\"Quoted\"".into(), "0.25".into(), "".into()], 4);
    table.add_row(vec!["".into(), "".into(), "".into(), "".into()], 5);
    table.add_row(vec!["00014".into(), "Last".into(), "1".into(), "100".into()], 6);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("royalties.tsv");
    write_table(&table, &path, OutputFormat::Tsv).unwrap();

    let read = read_strict_tab(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(read, table);
}

#[test]
fn test_strict_tab_normalization_through_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write(
        dir.path(),
        "statement.tab",
        b"Title\tAmount Received\tRate\tNotes\n+007\t+000012.50\t+0\t\n",
    );

    let reader = TableReader::new(Box::new(NoAutomation));
    let table = reader.read_table(&path).unwrap();
    assert_eq!(table.columns().collect::<Vec<_>>(), vec!["Title", "Amount Received", "Rate"]);
    assert_eq!(table.cell(0, "Title"), Some("+007"));
    assert_eq!(table.cell(0, "Amount Received"), Some("12.50"));
    assert_eq!(table.cell(0, "Rate"), Some("0"));
}

#[test]
fn test_cross_format_conversion_keeps_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixtures::write(
        dir.path(),
        "codes.json",
        br#"[{"code": "007", "sign": "+03"}, {"code": "0100", "sign": "-1"}]"#,
    );
    let out = dir.path().join("out");

    let report = converter(config(&out, OutputFormat::Xml)).run(&[input]).unwrap();
    assert!(report.is_success());

    let reader = TableReader::new(Box::new(NoAutomation));
    let table = reader.read_table(&out.join("codes.xml")).unwrap();
    assert_eq!(table.cell(0, "code"), Some("007"));
    assert_eq!(table.cell(0, "sign"), Some("+03"));
    assert_eq!(table.cell(1, "code"), Some("0100"));
}
