use std::error;
use std::fmt;

use crate::CallbackError;

/// All the ways building a [`crate::Soup`] can fail.
///
/// HTML syntax errors are not among them: the tokenizer recovers from those on its own. What is
/// left are failures of the underlying reader (type parameter `E`, an uninhabited type for
/// in-memory strings) and failures of user-supplied callbacks.
pub enum Error<E> {
    /// The reader failed to produce more input.
    Read(E),

    /// A [`crate::TagObserver`] returned an error. The parse was aborted at the tag that was
    /// being opened.
    Callback(CallbackError),
}

impl<E> From<CallbackError> for Error<E> {
    fn from(e: CallbackError) -> Self {
        Error::Callback(e)
    }
}

impl<E: fmt::Debug> fmt::Debug for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Read(ref e) => f.debug_tuple("Read").field(e).finish(),
            Error::Callback(ref e) => f.debug_tuple("Callback").field(e).finish(),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Read(ref e) => write!(f, "failed to read input: {}", e),
            Error::Callback(ref e) => write!(f, "tag callback failed: {}", e),
        }
    }
}

impl<E: error::Error + 'static> error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Read(ref e) => Some(e),
            Error::Callback(ref e) => Some(&**e),
        }
    }
}
