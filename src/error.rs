//! Unified error type for all codec operations.

use std::cell::RefCell;

/// Things that can go wrong when encoding or decoding a context.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad input to the codec itself (top-level null value, malformed locale).
    InvalidArgument(String),
    /// The document does not match the envelope or parameter wire shape.
    Schema(String),
    /// An `@class` or parameter `type` tag is not in the registry.
    ClassNotFound(String),
    /// The conversion service rejected a scalar coercion.
    Conversion(String),
    /// Byte sink or source failure.
    Io(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::Schema(msg) => write!(f, "schema error: {msg}"),
            Error::ClassNotFound(msg) => write!(f, "unknown type tag: {msg}"),
            Error::Conversion(msg) => write!(f, "conversion error: {msg}"),
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else {
            Error::Schema(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Carries a typed [`Error`] across the serde boundary.
///
/// serde collapses custom failures raised inside `Serialize`/`DeserializeSeed`
/// impls into engine errors, which would lose the taxonomy. Codec internals
/// park the original error here and raise a placeholder; the facade takes the
/// parked error back out before surfacing anything to the caller.
pub(crate) struct ErrorSlot {
    parked: RefCell<Option<Error>>,
}

impl ErrorSlot {
    pub(crate) fn new() -> Self {
        Self {
            parked: RefCell::new(None),
        }
    }

    /// Park `err` and produce a deserializer error to unwind with.
    pub(crate) fn park_de<E: serde::de::Error>(&self, err: Error) -> E {
        let msg = err.to_string();
        *self.parked.borrow_mut() = Some(err);
        E::custom(msg)
    }

    /// Park `err` and produce a serializer error to unwind with.
    pub(crate) fn park_ser<E: serde::ser::Error>(&self, err: Error) -> E {
        let msg = err.to_string();
        *self.parked.borrow_mut() = Some(err);
        E::custom(msg)
    }

    /// The parked error if one exists, otherwise `fallback` reclassified.
    pub(crate) fn resolve(&self, fallback: serde_json::Error) -> Error {
        self.parked
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Error::from(fallback))
    }
}
