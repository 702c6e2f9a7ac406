use std::fmt;

/// Logging level expressed as a number.
///
/// The five named ranks run from the most restrictive (`ERROR`) to the most
/// verbose (`TRACE`). Values above `TRACE` select trace detail levels: a
/// level of `TRACE + (k - 1)` enables trace details `1..=k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i32);

const TAGS: [&str; Priority::COUNT] = ["ERROR ", "WARNING ", "NOTICE ", "INFO ", "TRACE "];

impl Priority {
    pub const ERROR: Priority = Priority(0);
    pub const WARN: Priority = Priority(1);
    pub const NOTICE: Priority = Priority(2);
    pub const INFO: Priority = Priority(3);
    pub const TRACE: Priority = Priority(4);

    /// Number of named ranks.
    pub const COUNT: usize = 5;

    /// All named ranks, most severe first.
    pub const ALL: [Priority; Priority::COUNT] = [
        Priority::ERROR,
        Priority::WARN,
        Priority::NOTICE,
        Priority::INFO,
        Priority::TRACE,
    ];

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Level enabling trace output up to `detail`.
    ///
    /// `trace(1)` is `TRACE`, `trace(3)` is `TRACE + 2`.
    pub const fn trace(detail: i32) -> Self {
        Self(Priority::TRACE.0.saturating_add(detail.saturating_sub(1)))
    }

    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Clamp into `[ERROR, TRACE]`.
    pub const fn bound(self) -> Self {
        if self.0 < Priority::ERROR.0 {
            Priority::ERROR
        } else if self.0 > Priority::TRACE.0 {
            Priority::TRACE
        } else {
            self
        }
    }

    /// Position of the clamped rank, `0` for `ERROR` through `4` for `TRACE`.
    #[inline]
    pub const fn index(self) -> usize {
        self.bound().0 as usize
    }

    /// Fixed label of the clamped rank, including its trailing space.
    pub const fn tag(self) -> &'static str {
        TAGS[self.index()]
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::INFO
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().trim_end())
    }
}

impl From<log::Level> for Priority {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Priority::ERROR,
            log::Level::Warn => Priority::WARN,
            log::Level::Info => Priority::INFO,
            log::Level::Debug => Priority::trace(1),
            log::Level::Trace => Priority::trace(2),
        }
    }
}

impl From<Priority> for log::LevelFilter {
    fn from(priority: Priority) -> Self {
        match priority.value() {
            i32::MIN..=-1 => log::LevelFilter::Off,
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            // log has no notice level
            2 | 3 => log::LevelFilter::Info,
            4 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
