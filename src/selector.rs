use crate::{
    logger::{Accessor, Log, Logger},
    priority::Priority,
    scope::Scope,
    sinks::CallSite,
    value::Value,
};

/// Routes one outcome to the Notice Log when its scope is a success and to
/// the Error Log otherwise.
///
/// ```
/// use std::sync::Arc;
/// use scopelog::{Cause, Logger, MemoryFacility, Priority, SimpleFormatter};
///
/// let facility = MemoryFacility::new();
/// let logger = Logger::new(Arc::new(facility.clone()), Priority::INFO, Arc::new(SimpleFormatter), vec![]).unwrap();
///
/// let outcome: Result<(), std::io::Error> = Ok(());
/// logger.with(outcome.err().map(Cause::from)).print("flushed", &[]).unwrap();
/// logger.on(Cause::msg("disk full")).print("flushed", &[]).unwrap();
///
/// assert_eq!(facility.sink().texts(), vec!["flushed - success", "flushed - error=disk full"]);
/// ```
#[derive(Debug, Clone)]
pub struct Selector {
    logger: Logger,
    scope: Scope,
}

impl Selector {
    pub fn new(logger: Logger, scope: Scope) -> Self {
        Self { logger, scope }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_success(&self) -> bool {
        self.scope.is_success()
    }

    /// The Log a print would go through right now.
    pub fn scoped_log(&self) -> Log {
        let priority = if self.is_success() {
            Priority::NOTICE
        } else {
            Priority::ERROR
        };

        self.logger.log(priority).scoped_log(self.scope.clone())
    }

    #[track_caller]
    pub fn print(&self, message: &str, fields: &[Value]) -> eyre::Result<()> {
        self.scoped_log().print_at(CallSite::caller(), message, fields)
    }

    pub fn print_at(&self, site: CallSite<'_>, message: &str, fields: &[Value]) -> eyre::Result<()> {
        self.scoped_log().print_at(site, message, fields)
    }

    /// Print, then exit the process unless the scope is a success.
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Value]) {
        let log = self.scoped_log();
        if self.is_success() {
            let _ = log.print_at(CallSite::caller(), message, fields);
            return;
        }

        log.fatal(message, fields)
    }

    pub fn log(&self, priority: Priority) -> Log {
        self.logger.log(priority).scoped_log(self.scope.clone())
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

    pub fn trace(&self, detail: i32) -> Log {
        let log = self.logger.trace(detail);
        if log.is_discarding() {
            return log;
        }
        log.scoped_log(self.scope.clone())
    }
}

impl Accessor for Selector {
    fn log(&self, priority: Priority) -> Log {
        Selector::log(self, priority)
    }

    fn trace(&self, detail: i32) -> Log {
        Selector::trace(self, detail)
    }
}
