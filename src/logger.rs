use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use eyre::Context;

use crate::{
    facility::{Facility, NullFacility},
    formatters::{LogFormatter, SimpleFormatter},
    priority::Priority,
    scope::Scope,
    selector::Selector,
    sinks::{CallSite, LogSink, NullSink, Record},
    value::Value,
};

/// Operations shared by [`Logger`] and [`Selector`]: picking the Log of a
/// rank. A Selector hands out Logs with its scope already bound.
pub trait Accessor {
    fn log(&self, priority: Priority) -> Log;

    fn trace(&self, detail: i32) -> Log;

    fn info(&self) -> Log {
        self.log(Priority::INFO)
    }

    fn notice(&self) -> Log {
        self.log(Priority::NOTICE)
    }

    fn warning(&self) -> Log {
        self.log(Priority::WARN)
    }

    fn error(&self) -> Log {
        self.log(Priority::ERROR)
    }
}

/// Writer for one rank.
///
/// A Log is an immutable value; `scoped_log` and `offset` return new Logs.
/// Printing through a discarding Log neither formats nor writes.
#[derive(Clone)]
pub struct Log {
    priority: Priority,
    formatter: Option<Arc<dyn LogFormatter>>,
    sink: Arc<dyn LogSink>,
    filter: Arc<[String]>,
    scope: Scope,
    depth: usize,
}

static DISCARD: OnceLock<Log> = OnceLock::new();

impl Log {
    pub fn new(
        priority: Priority,
        formatter: Arc<dyn LogFormatter>,
        sink: Arc<dyn LogSink>,
        filter: impl Into<Arc<[String]>>,
    ) -> Self {
        Self {
            priority: priority.bound(),
            formatter: Some(formatter),
            sink,
            filter: filter.into(),
            scope: Scope::empty(),
            depth: 0,
        }
    }

    /// The shared Log that drops everything.
    pub fn discard() -> Log {
        DISCARD
            .get_or_init(|| Log {
                priority: Priority::TRACE,
                formatter: None,
                sink: Arc::new(NullSink::new()),
                filter: Arc::from(Vec::new()),
                scope: Scope::empty(),
                depth: 0,
            })
            .clone()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn filter(&self) -> &[String] {
        &self.filter
    }

    pub fn is_discarding(&self) -> bool {
        self.sink.is_discarding()
    }

    /// Same Log bound to another scope; a nil scope gives the discarding Log.
    pub fn scoped_log(&self, scope: impl Into<Scope>) -> Log {
        let scope = scope.into();
        if scope.is_nil() {
            return Log::discard();
        }

        Log {
            scope,
            ..self.clone()
        }
    }

    /// Same Log, for use `n` more wrapper frames away from the real caller.
    ///
    /// The call site is then taken from that caller's frame, found by walking
    /// the stack. Wrappers marked `#[track_caller]` need no offset.
    pub fn offset(&self, n: usize) -> Log {
        Log {
            depth: self.depth + n,
            ..self.clone()
        }
    }

    #[track_caller]
    pub fn print(&self, message: &str, fields: &[Value]) -> eyre::Result<()> {
        self.emit(CallSite::caller(), message, fields, &self.scope)
    }

    pub fn print_at(&self, site: CallSite<'_>, message: &str, fields: &[Value]) -> eyre::Result<()> {
        self.emit(site, message, fields, &self.scope)
    }

    /// Print marking the outcome as still pending, whatever the bound scope.
    #[track_caller]
    pub fn print_ellipsis(&self, message: &str, fields: &[Value]) -> eyre::Result<()> {
        self.emit(CallSite::caller(), message, fields, &Scope::ellipsis())
    }

    /// Print, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Value]) -> ! {
        let _ = self.emit(CallSite::caller(), message, fields, &self.scope);
        self.sink.flush();
        std::process::exit(1)
    }

    /// Writes `line` as is, bypassing the formatter.
    pub fn output(&self, site: CallSite<'_>, line: &str) -> eyre::Result<()> {
        self.dispatch(site, || line.to_string())
    }

    #[track_caller]
    pub fn print_fmt(&self, args: fmt::Arguments<'_>) -> eyre::Result<()> {
        self.dispatch(CallSite::caller(), || args.to_string())
    }

    fn emit(
        &self,
        site: CallSite<'_>,
        message: &str,
        fields: &[Value],
        scope: &Scope,
    ) -> eyre::Result<()> {
        self.dispatch(site, || match &self.formatter {
            Some(formatter) => formatter.format(message, fields, scope),
            None => message.to_string(),
        })
    }

    /// Resolves the call site through `depth`, applies the filter, then
    /// renders and writes.
    fn dispatch(&self, site: CallSite<'_>, render: impl FnOnce() -> String) -> eyre::Result<()> {
        if self.sink.is_discarding() {
            return Ok(());
        }

        let resolved = match self.depth {
            0 => None,
            depth => site.resolve_above(depth),
        };
        let site = match &resolved {
            Some((file, line)) => CallSite::new(file, *line),
            None => site,
        };

        if !self.filter.is_empty() && !site.matches_any(&self.filter) {
            return Ok(());
        }

        let line = render();
        self.sink.write_log(&Record {
            priority: self.priority,
            site,
            line: &line,
        })
    }
}

impl fmt::Debug for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Log")
            .field("priority", &self.priority)
            .field("discarding", &self.is_discarding())
            .field("filter", &self.filter)
            .field("scope", &self.scope)
            .field("depth", &self.depth)
            .finish()
    }
}

struct Inner {
    facility: Arc<dyn Facility>,
    level: Priority,
    formatter: Arc<dyn LogFormatter>,
    logs: [Log; Priority::COUNT],
}

/// One Log per rank plus the active level and formatter.
///
/// Cloning is cheap and every clone shares the same Logs.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Only the Trace Log honours `filter`.
    pub fn new(
        facility: Arc<dyn Facility>,
        level: Priority,
        formatter: Arc<dyn LogFormatter>,
        filter: Vec<String>,
    ) -> eyre::Result<Self> {
        Builder::new()
            .with_facility(facility)
            .with_level(level)
            .with_formatter(formatter)
            .with_filter(filter)
            .build()
    }

    /// Logger that discards everything.
    pub fn disabled() -> Self {
        static DISABLED: OnceLock<Logger> = OnceLock::new();

        DISABLED
            .get_or_init(|| {
                let discard = Log::discard();
                Logger {
                    inner: Arc::new(Inner {
                        facility: Arc::new(NullFacility),
                        level: Priority::new(-1),
                        formatter: Arc::new(SimpleFormatter),
                        logs: std::array::from_fn(|_| discard.clone()),
                    }),
                }
            })
            .clone()
    }

    pub fn level(&self) -> Priority {
        self.inner.level
    }

    pub fn formatter(&self) -> Arc<dyn LogFormatter> {
        self.inner.formatter.clone()
    }

    pub fn facility(&self) -> Arc<dyn Facility> {
        self.inner.facility.clone()
    }

    pub fn reopen(&self) -> eyre::Result<()> {
        self.inner.facility.reopen()
    }

    pub fn log(&self, priority: Priority) -> Log {
        self.inner.logs[priority.index()].clone()
    }

    pub fn info(&self) -> Log {
        self.log(Priority::INFO)
    }

    pub fn notice(&self) -> Log {
        self.log(Priority::NOTICE)
    }

    pub fn warning(&self) -> Log {
        self.log(Priority::WARN)
    }

    pub fn error(&self) -> Log {
        self.log(Priority::ERROR)
    }

    /// Trace Log when `detail` is enabled by the level, the discarding Log
    /// otherwise.
    pub fn trace(&self, detail: i32) -> Log {
        if Priority::trace(detail) <= self.inner.level {
            self.log(Priority::TRACE)
        } else {
            Log::discard()
        }
    }

    /// Selector that writes nothing for a nil scope.
    pub fn on(&self, scope: impl Into<Scope>) -> Selector {
        Selector::new(self.clone(), scope.into())
    }

    /// Selector that reports a nil scope as success.
    pub fn with(&self, scope: impl Into<Scope>) -> Selector {
        let scope = scope.into();
        let scope = if scope.is_nil() { Scope::success() } else { scope };
        Selector::new(self.clone(), scope)
    }

    pub fn success(&self) -> Selector {
        Selector::new(self.clone(), Scope::success())
    }

    /// Installs this Logger as the `log` crate backend.
    pub fn init(self) -> eyre::Result<()> {
        log::set_max_level(self.level().into());
        log::set_boxed_logger(Box::new(self)).context("Failed registering boxed logger")?;

        Ok(())
    }

    fn log_for(&self, priority: Priority) -> Log {
        if priority >= Priority::TRACE {
            self.trace(priority.value() - Priority::TRACE.value() + 1)
        } else {
            self.log(priority)
        }
    }
}

impl Accessor for Logger {
    fn log(&self, priority: Priority) -> Log {
        Logger::log(self, priority)
    }

    fn trace(&self, detail: i32) -> Log {
        Logger::trace(self, detail)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.inner.level)
            .field("logs", &self.inner.logs)
            .finish()
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Priority::from(metadata.level()) <= self.level()
    }

    fn log(&self, record: &log::Record) {
        if !log::Log::enabled(self, record.metadata()) {
            return;
        }

        let site = CallSite::new(record.file().unwrap_or("<unknown>"), record.line().unwrap_or(0));
        let message = record.args().to_string();
        let _ = self
            .log_for(Priority::from(record.level()))
            .print_at(site, &message, &[]);
    }

    fn flush(&self) {
        let mut seen: Vec<*const ()> = Vec::with_capacity(Priority::COUNT);
        for log in &self.inner.logs {
            let ptr = Arc::as_ptr(&log.sink) as *const ();
            if !seen.contains(&ptr) {
                seen.push(ptr);
                log.sink.flush();
            }
        }
    }
}

pub struct Builder {
    facility: Option<Arc<dyn Facility>>,
    formatter: Option<Arc<dyn LogFormatter>>,
    level: Priority,
    filter: Vec<String>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            facility: None,
            formatter: None,
            level: Priority::INFO,
            filter: Vec::new(),
        }
    }

    pub fn with_level(self, level: Priority) -> Self {
        Self { level, ..self }
    }

    pub fn with_facility(self, facility: Arc<dyn Facility>) -> Self {
        Self {
            facility: Some(facility),
            ..self
        }
    }

    pub fn with_formatter(self, formatter: Arc<dyn LogFormatter>) -> Self {
        Self {
            formatter: Some(formatter),
            ..self
        }
    }

    /// Source-file suffixes trace output is restricted to.
    pub fn with_filter(self, filter: Vec<String>) -> Self {
        Self { filter, ..self }
    }

    pub fn build(self) -> eyre::Result<Logger> {
        let facility = self.facility.ok_or_else(|| eyre::eyre!("no facility"))?;
        let formatter = self.formatter.ok_or_else(|| eyre::eyre!("no formatter"))?;

        let sinks = facility.open_logs(self.level)?;
        let filter: Arc<[String]> = Arc::from(self.filter);
        let no_filter: Arc<[String]> = Arc::from(Vec::new());

        let logs = Priority::ALL.map(|priority| {
            let filter = if priority == Priority::TRACE {
                filter.clone()
            } else {
                no_filter.clone()
            };
            Log::new(priority, formatter.clone(), sinks.get(priority).clone(), filter)
        });

        Ok(Logger {
            inner: Arc::new(Inner {
                facility,
                level: self.level,
                formatter,
                logs,
            }),
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
