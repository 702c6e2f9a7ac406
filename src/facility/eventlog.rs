use std::{ffi::OsStr, os::windows::ffi::OsStrExt, ptr, sync::Arc};

use windows_sys::Win32::{
    Foundation::HANDLE,
    System::EventLog::{
        DeregisterEventSource, RegisterEventSourceW, ReportEventW, EVENTLOG_ERROR_TYPE,
        EVENTLOG_INFORMATION_TYPE, EVENTLOG_WARNING_TYPE, REPORT_EVENT_TYPE,
    },
};

use super::{Facility, SinkSet};
use crate::{
    priority::Priority,
    sinks::{LineWriter, LogSink, SinkConfig, StampedSink},
};

impl Priority {
    pub fn eventlog_type(self) -> REPORT_EVENT_TYPE {
        match self.bound() {
            Priority::ERROR => EVENTLOG_ERROR_TYPE,
            Priority::WARN => EVENTLOG_WARNING_TYPE,
            _ => EVENTLOG_INFORMATION_TYPE,
        }
    }
}

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

struct EventSource {
    handle: HANDLE,
}

// SAFETY: an event source handle may be used from any thread.
unsafe impl Send for EventSource {}
unsafe impl Sync for EventSource {}

impl Drop for EventSource {
    fn drop(&mut self) {
        // SAFETY: the handle came from RegisterEventSourceW and is released once.
        unsafe {
            DeregisterEventSource(self.handle);
        }
    }
}

/// Reports every rank to the Windows event log under one event source.
pub struct EventlogFacility {
    source: Arc<EventSource>,
}

impl EventlogFacility {
    pub fn new(source_name: &str) -> eyre::Result<Self> {
        let name = wide(source_name);
        // SAFETY: `name` is NUL terminated and outlives the call.
        let handle = unsafe { RegisterEventSourceW(ptr::null(), name.as_ptr()) };
        if handle == 0 as HANDLE {
            return Err(eyre::eyre!(
                "Failed registering event source {}: {}",
                source_name,
                std::io::Error::last_os_error()
            ));
        }

        Ok(Self {
            source: Arc::new(EventSource { handle }),
        })
    }
}

impl Facility for EventlogFacility {
    fn open_logs(&self, level: Priority) -> eyre::Result<SinkSet> {
        SinkSet::for_level(level, |priority| {
            let writer = Arc::new(EventWriter {
                source: self.source.clone(),
                event_type: priority.eventlog_type(),
            });
            let sink = StampedSink::new(writer, priority, SinkConfig::new().without_timestamp())
                .with_site(priority >= Priority::TRACE);
            Ok(Arc::new(sink) as Arc<dyn LogSink>)
        })
    }

    fn reopen(&self) -> eyre::Result<()> {
        Ok(())
    }
}

struct EventWriter {
    source: Arc<EventSource>,
    event_type: REPORT_EVENT_TYPE,
}

impl LineWriter for EventWriter {
    fn write_line(&self, buf: &[u8]) -> eyre::Result<()> {
        let message = String::from_utf8_lossy(buf);
        let message = wide(message.trim_end_matches('\n'));
        let strings = [message.as_ptr()];

        // SAFETY: the handle is live while `source` is; `strings` points at one
        // NUL terminated buffer that outlives the call.
        let ok = unsafe {
            ReportEventW(
                self.source.handle,
                self.event_type,
                0,
                0,
                ptr::null_mut(),
                1,
                0,
                strings.as_ptr(),
                ptr::null(),
            )
        };

        if ok == 0 {
            return Err(eyre::eyre!(
                "Failed writing to event log: {}",
                std::io::Error::last_os_error()
            ));
        }

        Ok(())
    }
}
