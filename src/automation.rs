//! Office automation bridge for legacy workbooks.
//!
//! When the built-in `.xls` parser cannot open a file, an external office
//! suite re-saves it as `.xlsx` in a private temporary directory. The
//! directory is removed when the returned [`ConvertedWorkbook`] is dropped,
//! whichever way the caller exits.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

/// Default automation command (LibreOffice)
pub const DEFAULT_OFFICE_COMMAND: &str = "soffice";

/// Default limit for one conversion
pub const DEFAULT_OFFICE_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Failure of the automation fallback
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("automation service unavailable: {0}")]
    Unavailable(String),

    #[error("automation service did not finish within {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("automation conversion failed: {0}")]
    Failed(String),

    #[error("automation I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A modern workbook produced by the automation service.
/// Dropping it deletes the file and its temporary directory.
#[derive(Debug)]
pub struct ConvertedWorkbook {
    path: PathBuf,
    _dir: TempDir,
}

impl ConvertedWorkbook {
    pub fn new(dir: TempDir, path: PathBuf) -> Self {
        Self { path, _dir: dir }
    }

    /// Location of the converted `.xlsx`
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Converts a legacy workbook into a temporary modern one
pub trait LegacyConverter {
    fn convert_to_modern(&self, source: &Path) -> Result<ConvertedWorkbook, AutomationError>;
}

/// Headless office suite invoked as a subprocess
#[derive(Debug, Clone)]
pub struct OfficeAutomation {
    command: String,
    timeout: Duration,
}

impl Default for OfficeAutomation {
    fn default() -> Self {
        Self::new(DEFAULT_OFFICE_COMMAND, DEFAULT_OFFICE_TIMEOUT)
    }
}

impl OfficeAutomation {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

impl LegacyConverter for OfficeAutomation {
    fn convert_to_modern(&self, source: &Path) -> Result<ConvertedWorkbook, AutomationError> {
        let dir = tempfile::Builder::new().prefix("tabconv-").tempdir()?;
        let profile = dir.path().join("profile");

        debug!(command = %self.command, source = %source.display(), "starting office automation");
        let spawned = Command::new(&self.command)
            .arg(format!("-env:UserInstallation=file://{}", profile.display()))
            .args(["--headless", "--norestore", "--convert-to", "xlsx", "--outdir"])
            .arg(dir.path())
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AutomationError::Unavailable(format!(
                    "`{}` was not found",
                    self.command
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let status = wait_with_timeout(&mut child, self.timeout)?;
        if !status.success() {
            return Err(AutomationError::Failed(format!("`{}` exited with {}", self.command, status)));
        }

        let stem = source
            .file_stem()
            .ok_or_else(|| AutomationError::Failed("source has no file name".to_string()))?;
        let converted = modern_path(dir.path(), stem);
        if !converted.is_file() {
            return Err(AutomationError::Failed(format!(
                "`{}` produced no workbook",
                self.command
            )));
        }

        info!(source = %source.display(), "converted legacy workbook via office automation");
        Ok(ConvertedWorkbook::new(dir, converted))
    }
}

/// Automation disabled; every conversion reports the service as unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAutomation;

impl LegacyConverter for NoAutomation {
    fn convert_to_modern(&self, _source: &Path) -> Result<ConvertedWorkbook, AutomationError> {
        Err(AutomationError::Unavailable(
            "office automation is disabled".to_string(),
        ))
    }
}

/// Where the office suite writes its conversion of a file with `stem`.
/// Dots inside the stem are kept.
fn modern_path(dir: &Path, stem: &OsStr) -> PathBuf {
    dir.join(format!("{}.xlsx", stem.to_string_lossy()))
}

/// Wait for `child`, killing it once `timeout` has passed
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, AutomationError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AutomationError::TimedOut(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
