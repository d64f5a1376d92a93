//! Batch outcome reporting

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::{ConvertError, ErrorKind};

/// Why a file was not converted
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ConvertError> for Failure {
    fn from(e: &ConvertError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// What happened to one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub outputs: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl FileOutcome {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            outputs: Vec::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn failed(input: PathBuf, error: &ConvertError) -> Self {
        let mut outcome = Self::new(input);
        outcome.error = Some(error.into());
        outcome
    }

    /// Converted: no error and at least one file written
    pub fn is_converted(&self) -> bool {
        self.error.is_none() && !self.outputs.is_empty()
    }
}

/// Per-file outcomes and totals for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub attempted: usize,
    pub converted: usize,
    pub outputs_written: usize,
}

impl BatchReport {
    pub fn push(&mut self, outcome: FileOutcome) {
        self.attempted += 1;
        if outcome.is_converted() {
            self.converted += 1;
        }
        self.outputs_written += outcome.outputs.len();
        self.files.push(outcome);
    }

    /// Every file converted and something was written
    pub fn is_success(&self) -> bool {
        self.outputs_written > 0 && self.converted == self.attempted
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Print a coloured summary to stdout
    pub fn print_summary(&self, color_choice: ColorChoice) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(color_choice);
        self.write_summary(&mut stdout)
    }

    pub fn write_summary(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        let mut ok = ColorSpec::new();
        ok.set_fg(Some(Color::Green)).set_bold(true);
        let mut warn = ColorSpec::new();
        warn.set_fg(Some(Color::Yellow)).set_bold(true);
        let mut fail = ColorSpec::new();
        fail.set_fg(Some(Color::Red)).set_bold(true);

        for file in &self.files {
            let (spec, tag) = match (&file.error, file.outputs.is_empty()) {
                (Some(_), _) => (&fail, "FAILED "),
                (None, true) => (&warn, "SKIPPED"),
                (None, false) => (&ok, "OK     "),
            };
            out.set_color(spec)?;
            write!(out, "{}", tag)?;
            out.reset()?;
            writeln!(out, " {}", file.input.display())?;

            for output in &file.outputs {
                writeln!(out, "          -> {}", output.display())?;
            }
            for warning in &file.warnings {
                writeln!(out, "          warning: {}", warning)?;
            }
            if let Some(error) = &file.error {
                for line in error.message.lines() {
                    writeln!(out, "          {}", line)?;
                }
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "Converted {} of {} file(s); {} output file(s) written",
            self.converted, self.attempted, self.outputs_written
        )?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn report() -> BatchReport {
        let mut report = BatchReport::default();
        let mut ok = FileOutcome::new(PathBuf::from("a.csv"));
        ok.outputs.push(PathBuf::from("out/a.xlsx"));
        report.push(ok);
        report.push(FileOutcome::failed(
            PathBuf::from("b.xls"),
            &ConvertError::UnsupportedWriteTarget("dbf".into()),
        ));
        report
    }

    #[test]
    fn test_totals() {
        let report = report();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.converted, 1);
        assert_eq!(report.outputs_written, 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_summary_text() {
        let mut out = NoColor::new(Vec::new());
        report().write_summary(&mut out).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("OK      a.csv"));
        assert!(text.contains("FAILED  b.xls"));
        assert!(text.contains("Converted 1 of 2 file(s)"));
    }

    #[test]
    fn test_json_report() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["attempted"], 2);
        assert_eq!(json["files"][1]["error"]["kind"], "unsupported_write_target");
        assert!(json["files"][0].get("error").is_none());
    }
}
