use std::{
    fmt,
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use yansi::Paint;

use crate::priority::Priority;

/// Source location a log call originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl<'a> CallSite<'a> {
    pub const fn new(file: &'a str, line: u32) -> Self {
        Self { file, line }
    }

    /// Last path component of `file`.
    pub fn short_file(&self) -> &'a str {
        Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file)
    }

    /// True when `file` ends with one of `suffixes`.
    pub fn matches_any(&self, suffixes: &[String]) -> bool {
        suffixes.iter().any(|suffix| self.file.ends_with(suffix.as_str()))
    }

    /// File and line `depth` frames above the frame making the call at this
    /// site.
    ///
    /// Walks the current stack, so it needs debug info. `None` when this site
    /// is not on the stack or the stack is not that deep.
    pub fn resolve_above(&self, depth: usize) -> Option<(String, u32)> {
        let trace = backtrace::Backtrace::new();
        let frames: Vec<(PathBuf, u32)> = trace
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .filter_map(|symbol| Some((symbol.filename()?.to_path_buf(), symbol.lineno()?)))
            .collect();

        // innermost match, the stack is walked from the top
        let anchor = frames
            .iter()
            .position(|(file, line)| *line == self.line && file.ends_with(self.file))?;
        let (file, line) = frames.get(anchor + depth)?;

        Some((file.to_string_lossy().into_owned(), *line))
    }
}

impl CallSite<'static> {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for CallSite<'static> {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for CallSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.short_file(), self.line)
    }
}

/// A formatted line on its way to a sink.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub priority: Priority,
    pub site: CallSite<'a>,
    pub line: &'a str,
}

pub trait LogSink: Sync + Send {
    fn write_log(&self, record: &Record<'_>) -> eyre::Result<()>;

    fn flush(&self) {}

    /// Discarding sinks let callers skip formatting entirely.
    fn is_discarding(&self) -> bool {
        false
    }
}

/// Raw destination shared by the sinks of one facility.
pub trait LineWriter: Sync + Send {
    fn write_line(&self, buf: &[u8]) -> eyre::Result<()>;

    fn flush(&self) {}
}

#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// `None` leaves timestamps to the destination.
    pub datetime_format: Option<String>,
    pub use_ansi: bool,
}

impl SinkConfig {
    pub fn new() -> Self {
        Self {
            datetime_format: Some("%Y/%m/%d %H:%M:%S".to_string()),
            use_ansi: false,
        }
    }

    pub fn without_timestamp(self) -> Self {
        Self {
            datetime_format: None,
            ..self
        }
    }

    pub fn with_ansi(self, use_ansi: bool) -> Self {
        Self { use_ansi, ..self }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefixes each line with the rank tag, a timestamp and, when enabled, the
/// call site, then hands it to a [`LineWriter`].
pub struct StampedSink<W: ?Sized> {
    writer: Arc<W>,
    priority: Priority,
    config: SinkConfig,
    show_site: bool,
}

impl<W: LineWriter + ?Sized> StampedSink<W> {
    pub fn new(writer: Arc<W>, priority: Priority, config: SinkConfig) -> Self {
        Self {
            writer,
            priority: priority.bound(),
            config,
            show_site: false,
        }
    }

    pub fn with_site(self, show_site: bool) -> Self {
        Self { show_site, ..self }
    }

    fn tag(&self) -> String {
        let tag = self.priority.tag();
        if !self.config.use_ansi {
            return tag.to_string();
        }

        match self.priority {
            Priority::ERROR => tag.red().to_string(),
            Priority::WARN => tag.yellow().to_string(),
            Priority::NOTICE => tag.cyan().to_string(),
            Priority::INFO => tag.green().to_string(),
            _ => tag.white().to_string(),
        }
    }

    fn render(&self, record: &Record<'_>) -> String {
        let mut out = self.tag();

        if let Some(datetime_format) = &self.config.datetime_format {
            let time = chrono::Local::now().format(datetime_format);
            out.push_str(&format!("{} ", time));
        }

        if self.show_site {
            out.push_str(&format!("{}: ", record.site));
        }

        out.push_str(record.line);
        if !record.line.ends_with('\n') {
            out.push('\n');
        }

        out
    }
}

impl<W: LineWriter + ?Sized> LogSink for StampedSink<W> {
    fn write_log(&self, record: &Record<'_>) -> eyre::Result<()> {
        self.writer.write_line(self.render(record).as_bytes())
    }

    fn flush(&self) {
        self.writer.flush()
    }
}

pub struct NullSink {}

impl NullSink {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for NullSink {
    fn write_log(&self, _record: &Record<'_>) -> eyre::Result<()> {
        Ok(())
    }

    fn is_discarding(&self) -> bool {
        true
    }
}

/// A line kept by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub priority: Priority,
    pub file: String,
    pub line_no: u32,
    pub text: String,
}

/// Keeps every record in memory; used to assert on log output.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<CapturedLine>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.text).collect()
    }

    pub fn clear(&self) {
        self.lines.lock().map(|mut l| Vec::clear(&mut *l)).ok();
    }
}

impl LogSink for MemorySink {
    fn write_log(&self, record: &Record<'_>) -> eyre::Result<()> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|e| eyre::eyre!(e.to_string()))?;

        lines.push(CapturedLine {
            priority: record.priority,
            file: record.site.file.to_string(),
            line_no: record.site.line,
            text: record.line.to_string(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct VecWriter(Mutex<Vec<u8>>);

    impl LineWriter for VecWriter {
        fn write_line(&self, buf: &[u8]) -> eyre::Result<()> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(())
        }
    }

    fn record<'a>(line: &'a str) -> Record<'a> {
        Record {
            priority: Priority::TRACE,
            site: CallSite::new("src/net/conn.rs", 42),
            line,
        }
    }

    #[test]
    fn test_call_site() {
        let site = CallSite::new("src/net/conn.rs", 42);
        assert_eq!(site.short_file(), "conn.rs");
        assert_eq!(site.to_string(), "conn.rs:42");
        assert!(site.matches_any(&["net/conn.rs".to_string()]));
        assert!(!site.matches_any(&["disk.rs".to_string()]));
        assert!(!site.matches_any(&[]));
    }

    #[test]
    fn test_caller_points_here() {
        let site = CallSite::caller();
        assert!(site.file.ends_with("sinks.rs"));
    }

    #[track_caller]
    fn resolve_here(depth: usize) -> Option<(String, u32)> {
        CallSite::caller().resolve_above(depth)
    }

    #[inline(never)]
    fn relay() -> Option<(String, u32)> {
        resolve_here(1)
    }

    #[test]
    fn test_resolve_above() {
        let (line, resolved) = (line!(), resolve_here(0));
        let (file, resolved_line) = resolved.unwrap();
        assert!(file.ends_with("sinks.rs"));
        assert_eq!(resolved_line, line);

        let (line, resolved) = (line!(), relay());
        let (file, resolved_line) = resolved.unwrap();
        assert!(file.ends_with("sinks.rs"));
        assert_eq!(resolved_line, line);

        assert!(CallSite::new("src/nowhere.rs", 1).resolve_above(0).is_none());
    }

    #[test]
    fn test_stamped_sink_without_timestamp() {
        let writer = Arc::new(VecWriter::default());
        let config = SinkConfig::new().without_timestamp();
        let sink = StampedSink::new(writer.clone(), Priority::TRACE, config).with_site(true);

        sink.write_log(&record("hello")).unwrap();

        let out = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out, "TRACE conn.rs:42: hello\n");
    }

    #[test]
    fn test_stamped_sink_with_timestamp() {
        let writer = Arc::new(VecWriter::default());
        let sink = StampedSink::new(writer.clone(), Priority::INFO, SinkConfig::new());

        sink.write_log(&record("hello")).unwrap();

        let out = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        assert!(out.starts_with("INFO "));
        assert!(out.ends_with(" hello\n"));
        // INFO + "yyyy/mm/dd hh:mm:ss " + hello\n
        assert_eq!(out.len(), "INFO ".len() + 20 + "hello\n".len());
    }

    #[test]
    fn test_null_sink_discards() {
        let sink = NullSink::new();
        assert!(sink.is_discarding());
        assert!(sink.write_log(&record("dropped")).is_ok());
    }

    #[test]
    fn test_memory_sink_captures() {
        let sink = MemorySink::new();
        sink.write_log(&record("one")).unwrap();
        sink.write_log(&record("two")).unwrap();

        assert_eq!(sink.texts(), vec!["one", "two"]);
        assert_eq!(sink.lines()[0].line_no, 42);

        sink.clear();
        assert!(sink.lines().is_empty());
    }
}
