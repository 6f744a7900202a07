use super::{table, write_artifact};
use crate::Result;
use camino::Utf8PathBuf;
use core::fmt::Write;
use std::sync::Mutex;

const LOG_TARGET: &str = "    report";

/// A tabular report shared by every producer of findings.
///
/// Rows may be recorded concurrently; recording a row and counting it as an
/// issue happen under one lock. Every recorded row is an issue. The report is
/// only persisted by [`ReportSink::finish`] when at least one was recorded.
#[derive(Debug)]
pub struct ReportSink {
    path: Utf8PathBuf,
    header: Vec<String>,
    rows: Mutex<Vec<Vec<String>>>,
}

impl ReportSink {
    #[must_use]
    pub fn new(path: Utf8PathBuf, header: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            path,
            header: header.into_iter().map(Into::into).collect(),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Record one issue row.
    pub fn record(&self, row: Vec<String>) {
        self.rows.lock().expect("lock not poisoned").push(row);
    }

    #[must_use]
    pub fn issues(&self) -> usize {
        self.rows.lock().expect("lock not poisoned").len()
    }

    /// Render the table followed by the issue summary line.
    pub fn render(&self) -> Result<String> {
        let rows = self.rows.lock().expect("lock not poisoned");
        let header: Vec<&str> = self.header.iter().map(String::as_str).collect();

        let mut out = String::new();
        table::generate(&header, &rows, &mut out)?;
        writeln!(out, "\nencountered {} issues", rows.len())?;
        Ok(out)
    }

    /// Persist the report if any issue was recorded, returning where it was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the report file cannot be written.
    pub fn finish(self) -> Result<Option<Utf8PathBuf>> {
        let issues = self.issues();
        if issues == 0 {
            log::info!(target: LOG_TARGET, "No issues found, discarding {}", self.path);
            return Ok(None);
        }

        write_artifact(&self.path, &self.render()?)?;
        log::warn!(target: LOG_TARGET, "encountered {issues} issues, refer: {}", self.path);
        Ok(Some(self.path))
    }
}
