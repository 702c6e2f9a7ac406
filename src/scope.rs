use std::{error::Error as StdError, fmt, sync::Arc};

/// An entry of the error channel.
///
/// Besides real failures the channel carries two markers: `Success` for
/// "nothing went wrong" and `Ellipsis` for an outcome that is still pending.
#[derive(Clone)]
pub enum Cause {
    Success,
    Ellipsis,
    Failure(Arc<dyn StdError + Send + Sync + 'static>),
}

impl Cause {
    /// Failure carrying only a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Cause::Failure(Arc::new(Message(message.to_string())))
    }

    pub fn report(report: eyre::Report) -> Self {
        let err: Box<dyn StdError + Send + Sync + 'static> = report.into();
        Cause::Failure(Arc::from(err))
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Cause::Success | Cause::Ellipsis)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Cause::Failure(_))
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Success => f.write_str("success"),
            Cause::Ellipsis => f.write_str("..."),
            Cause::Failure(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Success => f.write_str("Success"),
            Cause::Ellipsis => f.write_str("Ellipsis"),
            Cause::Failure(err) => f.debug_tuple("Failure").field(&err.to_string()).finish(),
        }
    }
}

impl<E> From<E> for Cause
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Cause::Failure(Arc::new(err))
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

/// Ordered list of causes bound to a log call. `None` entries stand for a
/// nil error.
#[derive(Clone, Debug, Default)]
pub struct Scope(Vec<Option<Cause>>);

impl Scope {
    pub fn new(causes: Vec<Option<Cause>>) -> Self {
        Self(causes)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn success() -> Self {
        Self(vec![Some(Cause::Success)])
    }

    pub fn ellipsis() -> Self {
        Self(vec![Some(Cause::Ellipsis)])
    }

    /// Scope from the error side of a result; an `Ok` result is a nil error.
    pub fn of<T, E>(result: &Result<T, E>) -> Self
    where
        E: fmt::Display,
    {
        match result {
            Ok(_) => Self(vec![None]),
            Err(err) => Self(vec![Some(Cause::msg(err))]),
        }
    }

    pub fn causes(&self) -> &[Option<Cause>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the scope holds nothing but possibly a single nil error.
    pub fn is_nil(&self) -> bool {
        matches!(self.0.as_slice(), [] | [None])
    }

    /// True when the scope does not describe a failure: it is empty, or its
    /// single entry is nil or a marker.
    pub fn is_success(&self) -> bool {
        match self.0.as_slice() {
            [] | [None] => true,
            [Some(cause)] => cause.is_sentinel(),
            _ => false,
        }
    }

    pub fn push(&mut self, cause: impl Into<Option<Cause>>) {
        self.0.push(cause.into());
    }
}

impl From<Cause> for Scope {
    fn from(cause: Cause) -> Self {
        Self(vec![Some(cause)])
    }
}

impl From<Option<Cause>> for Scope {
    fn from(cause: Option<Cause>) -> Self {
        Self(vec![cause])
    }
}

impl From<Vec<Cause>> for Scope {
    fn from(causes: Vec<Cause>) -> Self {
        Self(causes.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<Cause>>> for Scope {
    fn from(causes: Vec<Option<Cause>>) -> Self {
        Self(causes)
    }
}

impl<const N: usize> From<[Option<Cause>; N]> for Scope {
    fn from(causes: [Option<Cause>; N]) -> Self {
        Self(causes.into())
    }
}

impl<const N: usize> From<[Cause; N]> for Scope {
    fn from(causes: [Cause; N]) -> Self {
        Self(causes.into_iter().map(Some).collect())
    }
}

impl From<()> for Scope {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl FromIterator<Option<Cause>> for Scope {
    fn from_iter<I: IntoIterator<Item = Option<Cause>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
