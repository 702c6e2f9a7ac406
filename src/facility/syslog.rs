use std::sync::{Arc, Mutex};

use syslog::{Formatter3164, Logger, LoggerBackend, Severity};

use super::{Facility, SinkSet};
use crate::{
    priority::Priority,
    sinks::{LineWriter, LogSink, SinkConfig, StampedSink},
};

type SyslogLogger = Logger<LoggerBackend, Formatter3164>;

impl Priority {
    pub fn syslog_severity(self) -> Severity {
        match self.bound() {
            Priority::ERROR => Severity::LOG_ERR,
            Priority::WARN => Severity::LOG_WARNING,
            Priority::NOTICE => Severity::LOG_NOTICE,
            Priority::INFO => Severity::LOG_INFO,
            _ => Severity::LOG_DEBUG,
        }
    }
}

/// Sends every rank to the local syslog daemon (RFC 3164, `LOG_USER`).
///
/// Syslog stamps time and host itself, so lines only carry the rank tag.
pub struct SyslogFacility {
    logger: Arc<Mutex<SyslogLogger>>,
}

impl SyslogFacility {
    pub fn new() -> eyre::Result<Self> {
        let formatter = Formatter3164 {
            facility: syslog::Facility::LOG_USER,
            hostname: None,
            process: env!("CARGO_PKG_NAME").to_owned(),
            pid: std::process::id(),
        };

        let logger = syslog::unix(formatter)
            .map_err(|e| eyre::eyre!("Failed connecting to syslog: {}", e))?;

        Ok(Self {
            logger: Arc::new(Mutex::new(logger)),
        })
    }
}

impl Facility for SyslogFacility {
    fn open_logs(&self, level: Priority) -> eyre::Result<SinkSet> {
        SinkSet::for_level(level, |priority| {
            let writer = Arc::new(SyslogWriter {
                logger: self.logger.clone(),
                severity: priority.syslog_severity(),
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

struct SyslogWriter {
    logger: Arc<Mutex<SyslogLogger>>,
    severity: Severity,
}

impl LineWriter for SyslogWriter {
    fn write_line(&self, buf: &[u8]) -> eyre::Result<()> {
        let message = String::from_utf8_lossy(buf);
        let message = message.trim_end_matches('\n');

        let mut logger = self.logger.lock().map_err(|e| eyre::eyre!(e.to_string()))?;
        let result = match self.severity {
            Severity::LOG_ERR => logger.err(message),
            Severity::LOG_WARNING => logger.warning(message),
            Severity::LOG_NOTICE => logger.notice(message),
            Severity::LOG_INFO => logger.info(message),
            _ => logger.debug(message),
        };

        result.map_err(|e| eyre::eyre!("Failed writing to syslog: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syslog_severity_mapping() {
        assert_eq!(Priority::ERROR.syslog_severity() as u32, Severity::LOG_ERR as u32);
        assert_eq!(Priority::WARN.syslog_severity() as u32, Severity::LOG_WARNING as u32);
        assert_eq!(Priority::NOTICE.syslog_severity() as u32, Severity::LOG_NOTICE as u32);
        assert_eq!(Priority::INFO.syslog_severity() as u32, Severity::LOG_INFO as u32);
        assert_eq!(Priority::trace(3).syslog_severity() as u32, Severity::LOG_DEBUG as u32);
        assert_eq!(Priority::new(-1).syslog_severity() as u32, Severity::LOG_ERR as u32);
    }
}
