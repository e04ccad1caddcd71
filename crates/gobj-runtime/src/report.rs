//! Emission of drained leaks: one console line per frame, one log record per leak.

use std::error::Error;
use std::fmt::{self, Write as _};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, TimeZone};
use gobj_types::LeakReport;
use parking_lot::Mutex;

use crate::ScriptTable;

pub const CONSOLE_PREFIX: &str = "Undisposed graphical objects garbage collected: ";

#[derive(Debug)]
pub enum ReportError {
    Io {
        path: Option<PathBuf>,
        source: io::Error,
    },
    /// A reporter panicked while handling one entry.
    Panicked(String),
}

impl ReportError {
    fn io(path: Option<&Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.map(Path::to_path_buf),
            source,
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "failed to write leak report to {}: {source}", path.display()),
            Self::Io { path: None, source } => write!(f, "failed to write leak report: {source}"),
            Self::Panicked(message) => write!(f, "leak reporter panicked: {message}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Panicked(_) => None,
        }
    }
}

/// Destination for drained leaks. Runs at the frame boundary, where host
/// operations and I/O are safe.
pub trait Reporter: Send {
    /// Called once per drain with every leak drained in it.
    fn begin_batch(&mut self, _batch: &[LeakReport]) -> Result<(), ReportError> {
        Ok(())
    }

    /// Called once per leak, in finalization order.
    fn report(&mut self, _report: &LeakReport, _scripts: &ScriptTable) -> Result<(), ReportError> {
        Ok(())
    }
}

/// `[[Sprite, Scene_Map], [Window, NoScene]]`
pub fn console_line(batch: &[LeakReport]) -> String {
    let mut line = String::from(CONSOLE_PREFIX);
    line.push('[');
    for (index, report) in batch.iter().enumerate() {
        if index > 0 {
            line.push_str(", ");
        }
        let _ = write!(line, "[{}, {}]", report.kind(), report.scene());
    }
    line.push(']');
    line
}

/// Renders the persisted record for one leak, with times shown in `tz`.
pub fn render_record<Tz>(report: &LeakReport, scripts: &ScriptTable, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let record = &report.record;
    let mut out = String::from("\n-----\n");
    let _ = writeln!(out, "Time: {}", record.created_at.format_in(tz));
    let _ = writeln!(out, "Memory Leak {}", record.kind);
    let _ = writeln!(out, "In Scene {}", record.scene);
    let _ = writeln!(out, "Creation {}:: ", record.trace.label());
    let frames: Vec<String> = record
        .trace
        .frames
        .iter()
        .map(|frame| scripts.render(frame))
        .collect();
    out.push_str(&frames.join("\n"));
    out
}

/// Writes the per-frame summary line.
pub struct ConsoleReporter {
    out: Box<dyn Write + Send>,
}

impl ConsoleReporter {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl Reporter for ConsoleReporter {
    fn begin_batch(&mut self, batch: &[LeakReport]) -> Result<(), ReportError> {
        writeln!(self.out, "{}", console_line(batch)).map_err(|e| ReportError::io(None, e))?;
        self.out.flush().map_err(|e| ReportError::io(None, e))
    }
}

/// Appends one record per leak to a text file, opening it per record.
pub struct LogFileReporter {
    path: PathBuf,
}

impl LogFileReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reporter for LogFileReporter {
    fn report(&mut self, report: &LeakReport, scripts: &ScriptTable) -> Result<(), ReportError> {
        let text = render_record(report, scripts, &Local);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ReportError::io(Some(&self.path), e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| ReportError::io(Some(&self.path), e))
    }
}

/// Keeps drained leaks in memory for hosts that display them themselves.
#[derive(Clone, Default)]
pub struct CollectingReporter {
    seen: Arc<Mutex<Vec<LeakReport>>>,
    batches: Arc<Mutex<Vec<usize>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every leak seen so far, in drain order.
    pub fn reports(&self) -> Vec<LeakReport> {
        self.seen.lock().clone()
    }

    /// Sizes of the batches drained so far.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().clone()
    }

    pub fn clear(&self) {
        self.seen.lock().clear();
        self.batches.lock().clear();
    }
}

impl Reporter for CollectingReporter {
    fn begin_batch(&mut self, batch: &[LeakReport]) -> Result<(), ReportError> {
        self.batches.lock().push(batch.len());
        Ok(())
    }

    fn report(&mut self, report: &LeakReport, _scripts: &ScriptTable) -> Result<(), ReportError> {
        self.seen.lock().push(report.clone());
        Ok(())
    }
}
