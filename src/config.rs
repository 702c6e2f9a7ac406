use std::sync::Arc;

use clap::{Args, ValueEnum};

use crate::{
    facility::{native_facility, Facility, StreamFacility},
    formatters::{JsonFormatter, LogFormatter, SimpleFormatter},
    priority::Priority,
};

/// Plain values the shared facility and logger are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// One of `error`, `warn`, `notice`, `info`.
    pub level: String,
    /// Trace verbosity; anything above zero overrides `level`.
    pub trace: u32,
    /// Comma separated source-file suffixes trace output is restricted to.
    pub trace_filter: String,
    /// One of `simple`, `json`, `json-pretty`.
    pub format: String,
    /// `stdout`, `stderr`, `syslog` or a file path.
    pub destination: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            trace: 0,
            trace_filter: String::new(),
            format: "simple".to_string(),
            destination: "stderr".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn level(&self) -> Priority {
        if self.trace > 0 {
            let detail = i32::try_from(self.trace).unwrap_or(i32::MAX);
            return Priority::trace(detail);
        }

        match self.level.as_str() {
            "error" => Priority::ERROR,
            "warn" => Priority::WARN,
            "notice" => Priority::NOTICE,
            _ => Priority::INFO,
        }
    }

    pub fn filter(&self) -> Vec<String> {
        self.trace_filter
            .split(',')
            .map(str::trim)
            .filter(|module| !module.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn formatter(&self) -> Arc<dyn LogFormatter> {
        match self.format.as_str() {
            "json" => Arc::new(JsonFormatter::compact()),
            "json-pretty" => Arc::new(JsonFormatter::pretty()),
            _ => Arc::new(SimpleFormatter),
        }
    }

    pub fn facility(&self) -> eyre::Result<Arc<dyn Facility>> {
        match self.destination.as_str() {
            "stdout" => Ok(Arc::new(StreamFacility::stdout())),
            "stderr" => Ok(Arc::new(StreamFacility::stderr())),
            "syslog" => native_facility(),
            path => Ok(Arc::new(StreamFacility::file(path))),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelName {
    Error,
    Warn,
    Notice,
    Info,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatName {
    Simple,
    Json,
    JsonPretty,
}

/// Logging flags, meant to be flattened into a host's command line.
#[derive(Args, Clone, Debug)]
pub struct RuntimeArgs {
    #[arg(
        long = "loglevel",
        value_enum,
        value_name = "LEVEL",
        default_value_t = LevelName::Info,
        help = "Set logging level."
    )]
    pub level: LevelName,

    #[arg(
        long,
        value_name = "VERBOSITY",
        default_value_t = 0,
        help = "Enable trace logging with the given verbosity."
    )]
    pub trace: u32,

    #[arg(
        long = "trace-filter",
        value_name = "MODULES",
        default_value = "",
        help = "Only enable trace logging for source files ending with one of these comma separated suffixes."
    )]
    pub trace_filter: String,

    #[arg(
        long = "logfmt",
        value_enum,
        value_name = "FORMAT",
        default_value_t = FormatName::Simple,
        help = "Set logging format."
    )]
    pub format: FormatName,

    #[arg(
        long = "log",
        value_name = "DESTINATION",
        default_value = "stderr",
        help = "Set log output to a file name or one of \"stdout\", \"stderr\" or \"syslog\"."
    )]
    pub destination: String,
}

impl From<RuntimeArgs> for RuntimeConfig {
    fn from(args: RuntimeArgs) -> Self {
        let level = match args.level {
            LevelName::Error => "error",
            LevelName::Warn => "warn",
            LevelName::Notice => "notice",
            LevelName::Info => "info",
        };
        let format = match args.format {
            FormatName::Simple => "simple",
            FormatName::Json => "json",
            FormatName::JsonPretty => "json-pretty",
        };

        Self {
            level: level.to_string(),
            trace: args.trace,
            trace_filter: args.trace_filter,
            format: format.to_string(),
            destination: args.destination,
        }
    }
}
