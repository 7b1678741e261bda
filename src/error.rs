//! Unified error type.

use std::error::Error as StdError;
use std::fmt;

/// A boxed, thread-safe dynamic error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The error type returned by handlers and delivered to the
/// [`ErrorReporter`](crate::ErrorReporter).
///
/// An `Error` is either a plain message or a wrapped error value. Wrapped
/// values keep their concrete type, so reporters further down the pipeline
/// can [`downcast_ref`](Error::downcast_ref) them back.
#[derive(Debug)]
pub struct Error(Repr);

#[derive(Debug)]
enum Repr {
    Message(String),
    Source(BoxError),
}

impl Error {
    /// An error carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(Repr::Message(message.into()))
    }

    /// Wraps any error value, keeping its type.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Repr::Source(Box::new(err)))
    }

    /// Wraps an already boxed error without re-allocating it.
    pub fn from_boxed(err: BoxError) -> Self {
        Self(Repr::Source(err))
    }

    /// Returns `true` if this error is a plain message rather than a wrapped
    /// error value.
    pub fn is_message(&self) -> bool {
        matches!(self.0, Repr::Message(_))
    }

    /// Borrows the wrapped error as `E`, if that is its concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match &self.0 {
            Repr::Source(err) => err.downcast_ref::<E>(),
            Repr::Message(_) => None,
        }
    }

    /// Panics with `self` as the payload.
    ///
    /// Under [`Recover`](crate::middleware::Recover) the payload reaches the
    /// reporter as this exact `Error`, not a re-wrapped message.
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Message(message) => f.write_str(message),
            Repr::Source(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.0 {
            Repr::Source(err) => err.source(),
            Repr::Message(_) => None,
        }
    }
}

impl From<BoxError> for Error {
    fn from(err: BoxError) -> Self {
        Self::from_boxed(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(e)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Exhausted(&'static str);

    impl fmt::Display for Exhausted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "exhausted: {}", self.0)
        }
    }

    impl StdError for Exhausted {}

    #[test]
    fn message_displays_verbatim() {
        let err = Error::msg("boom");
        assert!(err.is_message());
        assert_eq!(err.to_string(), "boom");
        assert!(err.downcast_ref::<Exhausted>().is_none());
    }

    #[test]
    fn wrapped_error_keeps_its_type() {
        let err = Error::new(Exhausted("pool"));
        assert!(!err.is_message());
        assert_eq!(err.to_string(), "exhausted: pool");
        assert_eq!(err.downcast_ref::<Exhausted>(), Some(&Exhausted("pool")));
    }

    #[test]
    fn boxed_error_is_not_reallocated() {
        let boxed: BoxError = Box::new(Exhausted("pool"));
        let addr = std::ptr::from_ref(&*boxed).cast::<()>();
        let err = Error::from(boxed);
        let inner = err.downcast_ref::<Exhausted>().expect("wrapped type");
        assert_eq!(std::ptr::from_ref(inner).cast::<()>(), addr);
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::other("disk").into();
        assert_eq!(err.to_string(), "disk");
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
