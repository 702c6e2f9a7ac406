mod file;
mod memory;

#[cfg(windows)]
mod eventlog;
#[cfg(unix)]
mod syslog;

use std::sync::Arc;

use crate::{
    priority::Priority,
    sinks::{LogSink, NullSink},
};

#[cfg(windows)]
pub use eventlog::EventlogFacility;
pub use file::StreamFacility;
pub use memory::MemoryFacility;
#[cfg(unix)]
pub use self::syslog::SyslogFacility;

/// An output backend.
///
/// `open_logs` hands out one sink per rank; ranks above the requested level
/// receive a discarding sink. `reopen` is the hook for external log rotation.
pub trait Facility: Sync + Send {
    fn open_logs(&self, level: Priority) -> eyre::Result<SinkSet>;

    fn reopen(&self) -> eyre::Result<()>;
}

/// Exactly one sink for each of the five ranks.
#[derive(Clone)]
pub struct SinkSet {
    sinks: [Arc<dyn LogSink>; Priority::COUNT],
}

impl SinkSet {
    /// Builds the set from `open`, called for every rank not above `level`.
    pub fn for_level<F>(level: Priority, mut open: F) -> eyre::Result<Self>
    where
        F: FnMut(Priority) -> eyre::Result<Arc<dyn LogSink>>,
    {
        let discard: Arc<dyn LogSink> = Arc::new(NullSink::new());
        let mut sinks: [Arc<dyn LogSink>; Priority::COUNT] =
            std::array::from_fn(|_| discard.clone());

        for priority in Priority::ALL {
            if priority <= level {
                sinks[priority.index()] = open(priority)?;
            }
        }

        Ok(Self { sinks })
    }

    pub fn discarding() -> Self {
        let discard: Arc<dyn LogSink> = Arc::new(NullSink::new());
        Self {
            sinks: std::array::from_fn(|_| discard.clone()),
        }
    }

    pub fn get(&self, priority: Priority) -> &Arc<dyn LogSink> {
        &self.sinks[priority.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Priority, &Arc<dyn LogSink>)> {
        Priority::ALL.into_iter().zip(self.sinks.iter())
    }
}

/// Facility whose sinks all discard.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFacility;

impl Facility for NullFacility {
    fn open_logs(&self, _level: Priority) -> eyre::Result<SinkSet> {
        Ok(SinkSet::discarding())
    }

    fn reopen(&self) -> eyre::Result<()> {
        Ok(())
    }
}

/// Facility behind the `syslog` destination on this platform.
pub fn native_facility() -> eyre::Result<Arc<dyn Facility>> {
    #[cfg(unix)]
    {
        Ok(Arc::new(SyslogFacility::new()?))
    }

    #[cfg(windows)]
    {
        Ok(Arc::new(EventlogFacility::new(env!("CARGO_PKG_NAME"))?))
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(eyre::eyre!("not implemented"))
    }
}
