//! Handoff default `Error`
use std::error;
use std::fmt::{self, Debug, Display};

/// Result type: `std::result::Result<T, Error>`
pub type Result<T> = std::result::Result<T, Error>;


/// Wrapping error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The queue is closed and every message has been taken
    Closed,

    /// The queue was empty (non-blocking pop)
    Empty,

    /// The queue was at capacity (non-blocking push)
    Full,

    /// The deadline passed before the operation could complete
    Timeout,

    /// A bounded queue has to hold at least one message
    ZeroCapacity,

    /// Index outside of a `FixedArray`
    OutOfBounds {
        /// Requested index
        index: usize,
        /// Length of the array
        len: usize,
    },

    /// The stress harness was given a configuration it can not run
    InvalidConfig(&'static str),

    /// A worker thread panicked
    WorkerPanicked,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Closed => write!(f, "queue is closed"),
            Error::Empty => write!(f, "queue is empty"),
            Error::Full => write!(f, "queue is full"),
            Error::Timeout => write!(f, "timed out"),
            Error::ZeroCapacity => write!(f, "bounded queue needs a capacity of at least one"),
            Error::OutOfBounds { index, len } => {
                write!(f, "index {} out of bounds for length {}", index, len)
            }
            Error::InvalidConfig(reason) => write!(f, "invalid config: {}", reason),
            Error::WorkerPanicked => write!(f, "worker thread panicked"),
        }
    }
}

impl error::Error for Error {}


// -----------------------------------------------------------------------------
// 		- Push error -
// -----------------------------------------------------------------------------
/// A failed push.
/// The message is handed back to the caller.
#[derive(Clone, PartialEq, Eq)]
pub enum PushError<T> {
    /// The queue is at capacity
    Full(T),

    /// No space became available before the deadline
    Timeout(T),

    /// The queue is closed
    Closed(T),
}

impl<T> PushError<T> {
    /// Take back the message that could not be pushed
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(val) | PushError::Timeout(val) | PushError::Closed(val) => val,
        }
    }

    /// `true` if the push failed because the queue is closed
    pub fn is_closed(&self) -> bool {
        match self {
            PushError::Closed(_) => true,
            _ => false,
        }
    }
}

// The message is left out so `T` doesn't have to be `Debug`
impl<T> Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PushError::Full(_) => write!(f, "Full(..)"),
            PushError::Timeout(_) => write!(f, "Timeout(..)"),
            PushError::Closed(_) => write!(f, "Closed(..)"),
        }
    }
}

impl<T> Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&Error::from(self), f)
    }
}

impl<T> error::Error for PushError<T> {}


// -----------------------------------------------------------------------------
// 		- Push error -> Error -
// -----------------------------------------------------------------------------
impl<T> From<&PushError<T>> for Error {
    fn from(err: &PushError<T>) -> Error {
        match err {
            PushError::Full(_) => Error::Full,
            PushError::Timeout(_) => Error::Timeout,
            PushError::Closed(_) => Error::Closed,
        }
    }
}

impl<T> From<PushError<T>> for Error {
    fn from(err: PushError<T>) -> Error {
        Error::from(&err)
    }
}
