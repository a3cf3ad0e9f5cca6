use thiserror::Error;

/// Fault raised by the transport collaborator: connect, request submission,
/// or a read from the response body stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Fault raised by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SlotError(pub String);

/// What went wrong during the availability check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    /// The endpoint answered with something other than 200 or 404.
    #[error("HTTP status {0}")]
    Status(u16),
    /// Connection refused, timeout, DNS failure and friends.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Why an update session ended in `Failed`. Every variant is recovered
/// locally: the session is logged and discarded, and the scheduler starts a
/// fresh one on the next eligible tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("network association unavailable")]
    NetworkUnavailable,
    #[error("update check failed: {0}")]
    CheckFailed(#[from] CheckFailure),
    #[error("inactive slot refused the reservation")]
    InsufficientSpace,
    #[error("stream write failed: {0}")]
    StreamWrite(String),
    #[error("stream ended after {written} of {expected} declared bytes")]
    ShortWrite { written: u64, expected: u64 },
    #[error("image finalize failed: {0}")]
    Finalize(String),
}

/// Telemetry failures are independent of the update path; they are logged
/// and the report is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("telemetry report failed: {0}")]
pub struct ReportError(pub String);
