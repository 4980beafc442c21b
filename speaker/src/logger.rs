use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, NaiveDate};

/// Timestamp layout used on every log line, e.g. `19.10.2026 14:03:27.512`.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S%.3f";

const SEPARATOR_WIDTH: usize = 60;

pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

pub fn timestamp_now() -> String {
    format_timestamp(&Local::now())
}

/// Name of the log file for the given day. Runs on the same day share a file.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("ssmlsay_{}.log", date.format("%Y-%m-%d"))
}

/// Destination for session log lines.
pub trait LogSink {
    fn append_line(&mut self, line: &str) -> io::Result<()>;
}

/// Appends UTF-8 lines to the per-day log file. Existing files are extended, never truncated.
pub struct DailyFileSink {
    path: PathBuf,
    file: File,
}

impl DailyFileSink {
    pub fn open(dir: &Path, date: NaiveDate) -> io::Result<Self> {
        let path = dir.join(log_file_name(date));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for DailyFileSink {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{line}")?;
        self.file.flush()
    }
}

/// Writes session messages to the console and, when enabled, to a log sink.
///
/// Sink failures never propagate: the first one is reported on the console, the rest are dropped
/// silently.
pub struct SessionLogger<W> {
    console: W,
    sink: Option<Box<dyn LogSink>>,
    sink_failed: bool,
}

impl<W: Write> SessionLogger<W> {
    /// A logger that only ever writes to the console.
    pub fn disabled(console: W) -> Self {
        Self {
            console,
            sink: None,
            sink_failed: false,
        }
    }

    pub fn with_sink(console: W, sink: Box<dyn LogSink>) -> Self {
        Self {
            console,
            sink: Some(sink),
            sink_failed: false,
        }
    }

    /// Open today's log file in `dir`. If it can't be opened the session carries on without file
    /// logging and a warning is printed.
    pub fn daily_file(console: W, dir: &Path, date: NaiveDate) -> Self {
        match DailyFileSink::open(dir, date) {
            Ok(sink) => {
                tracing::debug!(path = %sink.path().display(), "session log opened");
                Self::with_sink(console, Box::new(sink))
            }
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "failed to open session log");
                let mut logger = Self::disabled(console);
                logger.console_line(&format!(
                    "Warning: logging disabled, could not open log file: {e}"
                ));
                logger
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Mark the start of a run in the log file.
    pub fn start(&mut self, program: &str) {
        if self.sink.is_none() {
            return;
        }
        self.append_raw(&"-".repeat(SEPARATOR_WIDTH));
        self.write(&format!("Starting {program}"), false);
    }

    /// Log `message` with a timestamp, optionally echoing it on the console.
    pub fn write(&mut self, message: &str, also_to_console: bool) {
        if also_to_console {
            self.console_line(message);
        }
        if self.sink.is_some() {
            let line = format!("[{}] {}", timestamp_now(), message);
            self.append_raw(&line);
        }
    }

    /// Console writer for prompts that shouldn't land in the log.
    pub fn console(&mut self) -> &mut W {
        &mut self.console
    }

    pub fn into_console(self) -> W {
        self.console
    }

    fn console_line(&mut self, message: &str) {
        // a closed stdout is not worth aborting a speech session for
        let _ = writeln!(self.console, "{message}");
        let _ = self.console.flush();
    }

    fn append_raw(&mut self, line: &str) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.append_line(line) {
            if !self.sink_failed {
                self.sink_failed = true;
                tracing::debug!(error = %e, "failed to write session log");
                self.console_line(&format!("Warning: could not write to log file: {e}"));
            }
        }
    }
}
