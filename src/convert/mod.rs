//! Batch driver: read each input, optionally split it by sheet, write the results

mod cache;
mod inputs;
mod job;
mod report;
mod selector;

use std::fs;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::config::{Config, SheetMode};
use crate::error::{ConvertError, Result};
use crate::model::Table;
use crate::output::{write_table, WriteOutcome};
use crate::parser::TableReader;

pub use cache::SheetCache;
pub use inputs::collect_inputs;
pub use job::ConversionJob;
pub use report::{BatchReport, Failure, FileOutcome};
pub use selector::{AllSheets, NamedSheets, SheetListing, SheetSelector};

/// Runs conversions one file at a time
pub struct Converter {
    config: Config,
    reader: TableReader,
    cache: SheetCache,
}

impl Converter {
    pub fn new(config: Config) -> Self {
        let reader = TableReader::from_config(&config);
        Self::with_reader(config, reader)
    }

    /// Use a custom reader, e.g. one with a stub automation bridge
    pub fn with_reader(config: Config, reader: TableReader) -> Self {
        Self {
            config,
            reader,
            cache: SheetCache::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sheet_cache(&self) -> &SheetCache {
        &self.cache
    }

    /// Convert `inputs` using the sheet mode from the configuration
    pub fn run(&mut self, inputs: &[PathBuf]) -> Result<BatchReport> {
        match self.config.sheet_mode.clone() {
            SheetMode::Merged => self.convert_all(inputs, None),
            SheetMode::All => self.run_with_selector(inputs, &mut AllSheets),
            SheetMode::Named(names) => self.run_with_selector(inputs, &mut NamedSheets::new(names)),
        }
    }

    /// Convert `inputs`, letting `selector` choose the sheets of every workbook.
    ///
    /// Cancelling the selection aborts the batch before anything is written.
    pub fn run_with_selector(
        &mut self,
        inputs: &[PathBuf],
        selector: &mut dyn SheetSelector,
    ) -> Result<BatchReport> {
        let mut listing = SheetListing::new();
        let mut detect_errors: FxHashMap<PathBuf, ConvertError> = FxHashMap::default();

        for input in inputs {
            if !input.is_file() {
                continue;
            }
            match self.cache.get_or_detect(input, &self.reader) {
                Ok(sheets) if !sheets.is_empty() => {
                    listing.insert(input.clone(), sheets.to_vec());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %input.display(), error = %e, "could not list sheets");
                    detect_errors.insert(input.clone(), e);
                }
            }
        }

        let Some(selection) = selector.select(&listing) else {
            info!("sheet selection cancelled");
            return Err(ConvertError::Cancelled);
        };

        let plan = Plan {
            listing: &listing,
            selection: &selection,
            detect_errors,
        };
        self.convert_all(inputs, Some(plan))
    }

    fn convert_all(&mut self, inputs: &[PathBuf], mut plan: Option<Plan<'_>>) -> Result<BatchReport> {
        fs::create_dir_all(&self.config.output_folder)?;

        let mut report = BatchReport::default();
        for input in inputs {
            if let Some(error) = plan.as_mut().and_then(|p| p.detect_errors.remove(input)) {
                report.push(FileOutcome::failed(input.clone(), &error));
                continue;
            }

            let mut job = ConversionJob::new(
                input.clone(),
                self.config.output_folder.clone(),
                self.config.output_format,
            );
            if let Some(plan) = &plan {
                if plan.listing.contains_key(input) {
                    let chosen = plan.selection.get(input).cloned().unwrap_or_default();
                    job = job.with_sheet_selection(chosen);
                }
            }

            let outcome = self.convert(job);
            match &outcome.error {
                Some(failure) => warn!(path = %input.display(), error = %failure.message, "conversion failed"),
                None => debug!(path = %input.display(), outputs = outcome.outputs.len(), "conversion finished"),
            }
            report.push(outcome);
        }

        info!(
            attempted = report.attempted,
            converted = report.converted,
            outputs = report.outputs_written,
            "batch finished"
        );
        Ok(report)
    }

    /// Convert a single job; failures are recorded in the outcome
    pub fn convert(&self, job: ConversionJob) -> FileOutcome {
        let mut outcome = FileOutcome::new(job.input.clone());
        if let Err(e) = self.convert_into(&job, &mut outcome) {
            outcome.error = Some((&e).into());
        }
        outcome
    }

    fn convert_into(&self, job: &ConversionJob, outcome: &mut FileOutcome) -> Result<()> {
        if !job.input.is_file() {
            return Err(ConvertError::unreadable(&job.input, "input", "file not found"));
        }

        match &job.sheet_selection {
            Some(sheets) if sheets.is_empty() => {
                outcome.warnings.push("no sheets selected; skipped".to_string());
            }
            Some(sheets) => {
                for (sheet, table) in self.reader.read_sheets(&job.input, sheets)? {
                    let path = job.output_path(Some(&sheet));
                    self.write(&table, path, outcome)?;
                }
                if outcome.outputs.is_empty() {
                    outcome.warnings.push("selected sheets hold no data".to_string());
                }
            }
            None => {
                let loaded = self.reader.read(&job.input)?;
                outcome.warnings.extend(loaded.warning);
                let path = job.output_path(None);
                self.write(&loaded.table, path, outcome)?;
                if outcome.outputs.is_empty() && outcome.warnings.is_empty() {
                    outcome.warnings.push("no data rows; nothing written".to_string());
                }
            }
        }
        Ok(())
    }

    fn write(&self, table: &Table, path: PathBuf, outcome: &mut FileOutcome) -> Result<()> {
        if write_table(table, &path, self.config.output_format)? == WriteOutcome::Written {
            outcome.outputs.push(path);
        }
        Ok(())
    }
}

/// Sheet choices made before any file is converted
struct Plan<'a> {
    listing: &'a SheetListing,
    selection: &'a SheetListing,
    detect_errors: FxHashMap<PathBuf, ConvertError>,
}
