use crate::domain::{TableError, TableResult};
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const RUN_LOG_FILE_NAME: &str = "log_table.txt";

/// Run-scoped audit log (`log_table.txt`). Every line is mirrored to
/// `tracing` and kept in memory for the run summary.
#[derive(Debug)]
pub struct RunLog {
    path: Option<PathBuf>,
    sink: RefCell<Option<BufWriter<File>>>,
    lines: RefCell<Vec<String>>,
}

impl RunLog {
    /// Truncates or creates `<output_dir>/log_table.txt`.
    pub fn create(output_dir: &Path) -> TableResult<Self> {
        fs::create_dir_all(output_dir).map_err(|source| {
            TableError::io_system(
                "IO.TABLE_OUTPUT_DIRECTORY",
                format!(
                    "failed to create table directory '{}': {}",
                    output_dir.display(),
                    source
                ),
            )
        })?;

        let path = output_dir.join(RUN_LOG_FILE_NAME);
        let file = File::create(&path).map_err(|source| {
            TableError::io_system(
                "IO.RUN_LOG",
                format!("failed to create run log '{}': {}", path.display(), source),
            )
        })?;

        Ok(Self {
            path: Some(path),
            sink: RefCell::new(Some(BufWriter::new(file))),
            lines: RefCell::new(Vec::new()),
        })
    }

    /// Log that only mirrors to `tracing` and memory.
    pub fn detached() -> Self {
        Self {
            path: None,
            sink: RefCell::new(None),
            lines: RefCell::new(Vec::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn line(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(target: "prtk::run_log", "{}", text);
        self.append(&text);
    }

    /// Records a recoverable numeric correction.
    pub fn correction(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(target: "prtk::run_log", "{}", text);
        self.append(&text);
    }

    pub fn error(&self, error: &TableError) {
        let text = error.diagnostic_line();
        tracing::error!(target: "prtk::run_log", "{}", text);
        self.append(&text);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn flush(&self) -> TableResult<()> {
        if let Some(writer) = self.sink.borrow_mut().as_mut() {
            writer.flush().map_err(|source| {
                TableError::io_system("IO.RUN_LOG", format!("failed to flush run log: {}", source))
            })?;
        }
        Ok(())
    }

    fn append(&self, text: &str) {
        if let Some(writer) = self.sink.borrow_mut().as_mut()
            && let Err(source) = writeln!(writer, "{}", text)
        {
            tracing::warn!("failed to append to run log: {}", source);
        }
        self.lines.borrow_mut().push(text.to_string());
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        if let Some(writer) = self.sink.get_mut().as_mut() {
            let _ = writer.flush();
        }
    }
}
