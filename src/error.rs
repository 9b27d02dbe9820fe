//! Error types for memberpoint
//!
//! Every repository operation returns [`Result`]. Faults (connection lost,
//! command rejected, script failure) are `Err`; logical absence is carried
//! in the `Ok` value and is never an error.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for store faults
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    // -------------------------------------------------------------------------
    // Server Errors
    // -------------------------------------------------------------------------
    #[error("Server error: {0}")]
    Server(String),

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("Script error: {0}")]
    Script(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for faults raised by the transport rather than by the server
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// =============================================================================
// Sentinel Pairs
// =============================================================================

/// The value a result slot holds when the operation faulted
///
/// Consumers that branch on an `(error, value)` pair instead of a `Result`
/// get `false`, `-1`, an empty collection or `None` alongside the error.
pub trait Sentinel {
    fn sentinel() -> Self;
}

impl Sentinel for bool {
    fn sentinel() -> Self {
        false
    }
}

impl Sentinel for i64 {
    fn sentinel() -> Self {
        -1
    }
}

impl Sentinel for f64 {
    fn sentinel() -> Self {
        -1.0
    }
}

impl Sentinel for () {
    fn sentinel() -> Self {}
}

impl<T> Sentinel for Option<T> {
    fn sentinel() -> Self {
        None
    }
}

impl<T> Sentinel for Vec<T> {
    fn sentinel() -> Self {
        Vec::new()
    }
}

impl<K: Ord, V> Sentinel for std::collections::BTreeMap<K, V> {
    fn sentinel() -> Self {
        std::collections::BTreeMap::new()
    }
}

/// Split a result into an `(error, value)` pair
pub trait IntoPair<T> {
    fn into_pair(self) -> (Option<Error>, T);
}

impl<T: Sentinel> IntoPair<T> for Result<T> {
    fn into_pair(self) -> (Option<Error>, T) {
        match self {
            Ok(value) => (None, value),
            Err(e) => (Some(e), T::sentinel()),
        }
    }
}
