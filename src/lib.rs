//! Leveled, structured logging with conditional dispatch.
//!
//! A [`Logger`] owns one [`Log`] per [`Priority`]. Logs format a message and
//! an alternating key/value field list with a [`LogFormatter`] and write it
//! to the sink a [`Facility`] opened for that rank.
//!
//! The error channel doubles as the outcome channel: `on`/`with` bind a
//! [`Scope`] of [`Cause`]s and return a [`Selector`], which prints at Notice
//! when the scope is a success and at Error otherwise.
//!
//! ```
//! use std::sync::Arc;
//! use scopelog::{fields, Cause, Logger, MemoryFacility, Priority, SimpleFormatter};
//!
//! let facility = MemoryFacility::new();
//! let logger = Logger::new(Arc::new(facility.clone()), Priority::INFO, Arc::new(SimpleFormatter), vec![]).unwrap();
//!
//! logger.info().print("starting", &fields!["workers", 4]).unwrap();
//! logger.with(None).print("flushed", &[]).unwrap();
//! logger.on(Cause::msg("disk full")).print("flushed", &[]).unwrap();
//!
//! assert_eq!(
//!     facility.sink().texts(),
//!     vec!["starting workers=4", "flushed - success", "flushed - error=disk full"]
//! );
//! ```
//!
//! The [`runtime`] module keeps a process-wide logger built from a
//! [`RuntimeConfig`], reachable through the free functions re-exported here.

mod config;
pub mod facility;
mod formatters;
mod logger;
#[macro_use]
mod macros;
mod priority;
pub mod runtime;
mod scope;
mod selector;
mod sinks;
mod value;

pub use config::{FormatName, LevelName, RuntimeArgs, RuntimeConfig};
#[cfg(windows)]
pub use facility::EventlogFacility;
#[cfg(unix)]
pub use facility::SyslogFacility;
pub use facility::{
    native_facility, Facility, MemoryFacility, NullFacility, SinkSet, StreamFacility,
};
pub use formatters::{JsonFormatter, LogFormatter, SimpleFormatter};
pub use logger::{Accessor, Builder, Log, Logger};
pub use priority::Priority;
pub use runtime::{
    configure, error, info, notice, on, reopen, reset, shared_facility, shared_logger, success,
    trace, warning, with, Runtime,
};
pub use scope::{Cause, Scope};
pub use selector::Selector;
pub use sinks::{
    CallSite, CapturedLine, LineWriter, LogSink, MemorySink, NullSink, Record, SinkConfig,
    StampedSink,
};
pub use value::Value;
