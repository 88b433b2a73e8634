//! Destinations for structured log output.
//!
//! All structured output goes through a sink explicitly — nothing intercepts
//! the global stdout stream. Each sink owns its writer behind a mutex so
//! concurrent fan-out batches never interleave a partial record.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Where one structured line goes.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Writes to stdout.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{line}")
    }
}

/// Writes to a file, one line per call, flushed immediately.
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Open in append mode: entries are cumulative across runs.
    pub fn append(path: &Path) -> io::Result<Self> {
        Self::open(path, OpenOptions::new().create(true).append(true))
    }

    /// Truncate once at construction: fresh contents each run.
    pub fn truncate(path: &Path) -> io::Result<Self> {
        Self::open(path, OpenOptions::new().create(true).write(true).truncate(true))
    }

    fn open(path: &Path, options: &OpenOptions) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            file: Mutex::new(options.open(path)?),
        })
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file mutex poisoned"))?;
        writeln!(file, "{line}")?;
        file.flush()
    }
}

/// Mirrors every line to several sinks; all sinks are attempted even when an
/// earlier one fails, and the first error is reported.
pub struct TeeSink {
    sinks: Vec<Box<dyn LogSink>>,
}

impl TeeSink {
    pub fn new(sinks: Vec<Box<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

impl LogSink for TeeSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.write_line(line) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Captures lines in memory. Used by tests to assert on emission counts and
/// by embedders that want to inspect records programmatically.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink mutex poisoned"))?
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_captures_lines_in_order() {
        let sink = MemorySink::new();
        sink.write_line("first").unwrap();
        sink.write_line("second").unwrap();
        assert_eq!(sink.lines(), vec!["first", "second"]);
    }

    #[test]
    fn tee_sink_writes_to_all_sinks() {
        let a = std::sync::Arc::new(MemorySink::new());
        let b = std::sync::Arc::new(MemorySink::new());

        struct Shared(std::sync::Arc<MemorySink>);
        impl LogSink for Shared {
            fn write_line(&self, line: &str) -> io::Result<()> {
                self.0.write_line(line)
            }
        }

        let tee = TeeSink::new(vec![
            Box::new(Shared(a.clone())),
            Box::new(Shared(b.clone())),
        ]);
        tee.write_line("mirrored").unwrap();
        assert_eq!(a.lines(), vec!["mirrored"]);
        assert_eq!(b.lines(), vec!["mirrored"]);
    }

    #[test]
    fn file_sink_append_preserves_existing_content() {
        let dir = std::env::temp_dir().join("probeman-sink-test");
        let path = dir.join("append.log");
        let _ = std::fs::remove_file(&path);

        {
            let sink = FileSink::append(&path).unwrap();
            sink.write_line("run one").unwrap();
        }
        {
            let sink = FileSink::append(&path).unwrap();
            sink.write_line("run two").unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "run one\nrun two\n");

        let truncated = FileSink::truncate(&path).unwrap();
        truncated.write_line("fresh").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "fresh\n");
    }
}
