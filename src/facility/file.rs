use std::{
    fs::{File, OpenOptions},
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use eyre::Context;

use super::{Facility, SinkSet};
use crate::{
    priority::Priority,
    sinks::{LineWriter, LogSink, SinkConfig, StampedSink},
};

enum Destination {
    Stdout,
    Stderr,
    File(PathBuf),
}

struct Target {
    destination: Destination,
    file: RwLock<Option<File>>,
}

/// Writes to stdout, stderr or a file opened in append mode.
///
/// A file is opened lazily by the first `open_logs`. `reopen` swaps the
/// handle under an exclusive lock, so a write never sees a closed or half
/// swapped file; external rotation (rename, then signal) works as expected.
pub struct StreamFacility {
    target: Arc<Target>,
    config: SinkConfig,
}

impl StreamFacility {
    pub fn stdout() -> Self {
        let use_ansi = std::io::stdout().is_terminal();
        Self::with_destination(Destination::Stdout, SinkConfig::new().with_ansi(use_ansi))
    }

    pub fn stderr() -> Self {
        let use_ansi = std::io::stderr().is_terminal();
        Self::with_destination(Destination::Stderr, SinkConfig::new().with_ansi(use_ansi))
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_destination(Destination::File(path.into()), SinkConfig::new())
    }

    fn with_destination(destination: Destination, config: SinkConfig) -> Self {
        Self {
            target: Arc::new(Target {
                destination,
                file: RwLock::new(None),
            }),
            config,
        }
    }

    pub fn with_config(self, config: SinkConfig) -> Self {
        Self { config, ..self }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.target.destination {
            Destination::File(path) => Some(path),
            _ => None,
        }
    }

    fn open_file(path: &Path) -> eyre::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o640);
        }

        options
            .open(path)
            .with_context(|| format!("Failed opening or creating log file {}", path.display()))
    }
}

impl Facility for StreamFacility {
    fn open_logs(&self, level: Priority) -> eyre::Result<SinkSet> {
        if let Destination::File(path) = &self.target.destination {
            let mut file = self
                .target
                .file
                .write()
                .map_err(|e| eyre::eyre!(e.to_string()))?;
            if file.is_none() {
                *file = Some(Self::open_file(path)?);
            }
        }

        SinkSet::for_level(level, |priority| {
            let sink = StampedSink::new(self.target.clone(), priority, self.config.clone())
                .with_site(priority >= Priority::TRACE);
            Ok(Arc::new(sink) as Arc<dyn LogSink>)
        })
    }

    fn reopen(&self) -> eyre::Result<()> {
        let Destination::File(path) = &self.target.destination else {
            return Ok(());
        };

        let mut file = self
            .target
            .file
            .write()
            .map_err(|e| eyre::eyre!(e.to_string()))?;

        let Some(old) = file.take() else {
            return Err(eyre::eyre!("unable to reopen file: {}", path.display()));
        };

        match Self::open_file(path) {
            Ok(new) => {
                // NOTE: a failed sync must not keep the fresh handle from being used
                let _ = old.sync_all();
                *file = Some(new);
                Ok(())
            }
            Err(err) => {
                *file = Some(old);
                Err(err)
            }
        }
    }
}

impl LineWriter for Target {
    fn write_line(&self, buf: &[u8]) -> eyre::Result<()> {
        match &self.destination {
            Destination::Stdout => std::io::stdout()
                .lock()
                .write_all(buf)
                .context("Failed writing to stdout"),
            Destination::Stderr => std::io::stderr()
                .lock()
                .write_all(buf)
                .context("Failed writing to stderr"),
            Destination::File(path) => {
                let file = self.file.read().map_err(|e| eyre::eyre!(e.to_string()))?;
                match file.as_ref() {
                    Some(mut file) => file
                        .write_all(buf)
                        .with_context(|| format!("Failed writing to {}", path.display())),
                    None => Err(eyre::eyre!("not open: {}", path.display())),
                }
            }
        }
    }

    fn flush(&self) {
        match &self.destination {
            Destination::Stdout => {
                let _ = std::io::stdout().flush();
            }
            Destination::Stderr => {
                let _ = std::io::stderr().flush();
            }
            Destination::File(_) => {
                if let Ok(file) = self.file.read() {
                    if let Some(mut file) = file.as_ref() {
                        let _ = file.flush();
                    }
                }
            }
        }
    }
}
