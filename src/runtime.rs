//! Process-wide facility and logger.
//!
//! Both are built lazily, at most once each, from the current
//! [`RuntimeConfig`]. A construction failure leaves the slot empty and is
//! reported through `tracing`; the shared entry points then fall back to a
//! Logger that discards everything, so a bad destination never takes the
//! host process down. [`reset`] empties both slots.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};

use crate::{
    config::RuntimeConfig,
    facility::Facility,
    logger::{Log, Logger},
    scope::Scope,
    selector::Selector,
};

#[derive(Default)]
pub struct Runtime {
    config: RwLock<RuntimeConfig>,
    facility: Mutex<Option<Arc<dyn Facility>>>,
    logger: Mutex<Option<Logger>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config: RwLock::new(config),
            ..Self::default()
        }
    }

    pub fn global() -> &'static Runtime {
        static RUNTIME: OnceLock<Runtime> = OnceLock::new();
        RUNTIME.get_or_init(Runtime::default)
    }

    pub fn config(&self) -> RuntimeConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Takes effect for singletons built after this call.
    pub fn configure(&self, config: RuntimeConfig) {
        match self.config.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    pub fn facility(&self) -> Option<Arc<dyn Facility>> {
        let mut facility = lock(&self.facility);
        if facility.is_none() {
            let config = self.config();
            match config.facility() {
                Ok(built) => *facility = Some(built),
                Err(err) => {
                    tracing::warn!(
                        target: "scopelog",
                        destination = %config.destination,
                        "failed creating shared log facility: {:#}",
                        err
                    );
                }
            }
        }
        facility.clone()
    }

    pub fn logger(&self) -> Option<Logger> {
        let mut logger = lock(&self.logger);
        if logger.is_none() {
            let facility = self.facility()?;
            let config = self.config();
            let built = Logger::builder()
                .with_facility(facility)
                .with_level(config.level())
                .with_formatter(config.formatter())
                .with_filter(config.filter())
                .build();

            match built {
                Ok(built) => *logger = Some(built),
                Err(err) => {
                    tracing::warn!(
                        target: "scopelog",
                        destination = %config.destination,
                        "failed creating shared logger: {:#}",
                        err
                    );
                }
            }
        }
        logger.clone()
    }

    /// Shared logger, or a discarding one when it could not be built.
    pub fn logger_or_disabled(&self) -> Logger {
        self.logger().unwrap_or_else(Logger::disabled)
    }

    /// Drops both singletons; the next use builds them again.
    pub fn reset(&self) {
        // logger first: it holds a reference to the facility
        lock(&self.logger).take();
        lock(&self.facility).take();
    }
}

pub fn configure(config: RuntimeConfig) {
    Runtime::global().configure(config)
}

pub fn reset() {
    Runtime::global().reset()
}

pub fn shared_facility() -> Option<Arc<dyn Facility>> {
    Runtime::global().facility()
}

pub fn shared_logger() -> Option<Logger> {
    Runtime::global().logger()
}

/// Reopens the shared facility, e.g. on `SIGHUP` after log rotation.
pub fn reopen() -> eyre::Result<()> {
    match shared_facility() {
        Some(facility) => facility.reopen(),
        None => Ok(()),
    }
}

pub fn info() -> Log {
    Runtime::global().logger_or_disabled().info()
}

pub fn notice() -> Log {
    Runtime::global().logger_or_disabled().notice()
}

pub fn warning() -> Log {
    Runtime::global().logger_or_disabled().warning()
}

pub fn error() -> Log {
    Runtime::global().logger_or_disabled().error()
}

pub fn trace(detail: i32) -> Log {
    Runtime::global().logger_or_disabled().trace(detail)
}

pub fn on(scope: impl Into<Scope>) -> Selector {
    Runtime::global().logger_or_disabled().on(scope)
}

pub fn with(scope: impl Into<Scope>) -> Selector {
    Runtime::global().logger_or_disabled().with(scope)
}

pub fn success() -> Selector {
    Runtime::global().logger_or_disabled().success()
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::priority::Priority;

    fn file_config(path: &std::path::Path) -> RuntimeConfig {
        RuntimeConfig {
            destination: path.to_string_lossy().into_owned(),
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn test_singletons_are_built_once() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new(file_config(&dir.path().join("app.log")));

        let a = runtime.facility().unwrap();
        let b = runtime.facility().unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let first = runtime.logger().unwrap();
        let second = runtime.logger().unwrap();
        assert!(first.info().print("x", &[]).is_ok());
        assert!(Arc::ptr_eq(&first.facility(), &second.facility()));
    }

    #[test]
    fn test_concurrent_first_use_sees_one_instance() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Arc::new(Runtime::new(file_config(&dir.path().join("app.log"))));

        let facilities: Vec<_> = (0..8)
            .map(|_| {
                let runtime = runtime.clone();
                thread::spawn(move || runtime.logger().unwrap().facility())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        for facility in &facilities {
            assert!(Arc::ptr_eq(facility, &facilities[0]));
        }
    }

    #[test]
    fn test_construction_failure_degrades_to_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("app.log");
        let runtime = Runtime::new(file_config(&missing));

        // the file facility itself is lazy, opening happens in the logger
        assert!(runtime.facility().is_some());
        assert!(runtime.logger().is_none());

        let logger = runtime.logger_or_disabled();
        assert!(logger.error().is_discarding());
        assert!(logger.on(crate::Cause::msg("x")).print("m", &[]).is_ok());
    }

    #[test]
    fn test_reset_rebuilds_from_new_config() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new(file_config(&dir.path().join("a.log")));
        assert_eq!(runtime.logger().unwrap().level(), Priority::INFO);

        runtime.configure(RuntimeConfig {
            level: "error".to_string(),
            ..file_config(&dir.path().join("b.log"))
        });
        assert_eq!(runtime.logger().unwrap().level(), Priority::INFO);

        runtime.reset();
        assert_eq!(runtime.logger().unwrap().level(), Priority::ERROR);
        assert!(dir.path().join("b.log").exists());
    }
}
