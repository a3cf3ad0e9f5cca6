//! Firmware update session: one attempt at checking for, streaming in, and
//! activating a new image.
//!
//! The session is linear: the transport exposes a forward-only byte stream,
//! so once bytes are consumed they cannot be re-read. Any mid-stream failure
//! discards the whole attempt instead of resuming, and the scheduler starts
//! a fresh session on the next eligible tick.

use log::{info, warn};

use crate::error::{CheckFailure, SlotError, TransportError, UpdateError};

/// Read buffer size for streaming the image body into the slot.
const CHUNK_SIZE: usize = 4096;

/// What the update endpoint said when asked for an image.
pub enum CheckOutcome<B> {
    /// HTTP 404: nothing staged for this device.
    NoUpdate,
    /// HTTP 200 with a readable body. `declared_len` is the Content-Length
    /// when the server sent a usable one; a missing or negative value means
    /// the image size is unknown up front.
    Available { declared_len: Option<u64>, body: B },
    /// Any other status.
    Rejected(u16),
}

/// Transport collaborator: issues the availability GET.
pub trait UpdateSource {
    type Body: ImageStream;

    fn check_for_update(&mut self) -> Result<CheckOutcome<Self::Body>, TransportError>;
}

/// Forward-only byte stream of the image body. `Ok(0)` means exhausted.
pub trait ImageStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

/// Storage collaborator: the inactive firmware slot.
///
/// A reservation must precede any write, and exactly one `finalize` or
/// `abort` must follow it. An aborted reservation leaves the slot safe to
/// reserve again on a later attempt.
pub trait FirmwareSlot {
    /// Ask for capacity. `hint` is the declared image size when known.
    /// `Ok(false)` means the slot cannot hold the image.
    fn reserve(&mut self, hint: Option<u64>) -> Result<bool, SlotError>;

    /// Write part of a chunk; returns how many bytes were accepted.
    fn write_chunk(&mut self, data: &[u8]) -> Result<usize, SlotError>;

    /// Validate the written image and mark the slot bootable. `written` is
    /// the byte count actually streamed in, which may differ from the
    /// declared size when the server omitted Content-Length.
    fn finalize(&mut self, written: u64) -> Result<(), SlotError>;

    /// Release the reservation without marking anything valid.
    fn abort(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Checking,
    Downloading,
    Finalizing,
    Succeeded,
    NoUpdateAvailable,
    Failed(UpdateError),
}

/// How a session concluded, from the scheduler loop's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A new image is staged and validated; the device must restart to run
    /// it. The restart is the caller's job and must happen exactly once.
    UpdateApplied,
    NoUpdate,
    Failed(UpdateError),
}

impl SessionOutcome {
    pub fn requires_restart(&self) -> bool {
        matches!(self, SessionOutcome::UpdateApplied)
    }
}

/// One firmware update attempt. Created per scheduled check, driven to a
/// terminal state by [`UpdateSession::run`], then discarded.
pub struct UpdateSession {
    expected_size: Option<u64>,
    bytes_written: u64,
    state: SessionState,
}

impl Default for UpdateSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateSession {
    pub fn new() -> Self {
        Self {
            expected_size: None,
            bytes_written: 0,
            state: SessionState::Checking,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    /// Drive the session from `Checking` to a terminal state.
    pub fn run<S, F>(&mut self, source: &mut S, slot: &mut F) -> SessionOutcome
    where
        S: UpdateSource,
        F: FirmwareSlot,
    {
        let body = match source.check_for_update() {
            Ok(CheckOutcome::NoUpdate) => {
                info!("no update staged on the collector");
                self.state = SessionState::NoUpdateAvailable;
                return SessionOutcome::NoUpdate;
            }
            Ok(CheckOutcome::Available { declared_len, body }) => {
                match declared_len {
                    Some(len) => info!("update available, {} bytes declared", len),
                    None => warn!("update available with unknown length, trusting the stream"),
                }
                self.expected_size = declared_len;
                self.state = SessionState::Downloading;
                body
            }
            Ok(CheckOutcome::Rejected(status)) => {
                return self.fail(CheckFailure::Status(status).into());
            }
            Err(fault) => {
                return self.fail(CheckFailure::Transport(fault).into());
            }
        };

        self.download(body, slot)
    }

    fn download<B, F>(&mut self, mut body: B, slot: &mut F) -> SessionOutcome
    where
        B: ImageStream,
        F: FirmwareSlot,
    {
        match slot.reserve(self.expected_size) {
            Ok(true) => {}
            Ok(false) => return self.fail(UpdateError::InsufficientSpace),
            Err(fault) => {
                warn!("slot reservation fault: {}", fault);
                return self.fail(UpdateError::InsufficientSpace);
            }
        }

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut last_logged_decile = 0;
        loop {
            let n = match body.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(fault) => {
                    slot.abort();
                    return self.fail(UpdateError::StreamWrite(format!("read: {fault}")));
                }
            };

            let mut chunk = &buf[..n];
            while !chunk.is_empty() {
                match slot.write_chunk(chunk) {
                    Ok(accepted) if accepted > 0 => {
                        self.bytes_written += accepted as u64;
                        chunk = &chunk[accepted..];
                    }
                    Ok(_) => {
                        slot.abort();
                        return self
                            .fail(UpdateError::StreamWrite("slot accepted no bytes".into()));
                    }
                    Err(fault) => {
                        slot.abort();
                        return self.fail(UpdateError::StreamWrite(format!("write: {fault}")));
                    }
                }
            }

            if let Some(expected) = self.expected_size.filter(|&e| e > 0) {
                let decile = (self.bytes_written * 10 / expected).min(10);
                if decile > last_logged_decile {
                    last_logged_decile = decile;
                    info!("download progress: {}%", decile * 10);
                }
            }
        }

        if let Some(expected) = self.expected_size {
            if self.bytes_written != expected {
                slot.abort();
                return self.fail(UpdateError::ShortWrite {
                    written: self.bytes_written,
                    expected,
                });
            }
        }

        self.state = SessionState::Finalizing;
        match slot.finalize(self.bytes_written) {
            Ok(()) => {
                info!(
                    "image finalized after {} bytes, restart required to activate",
                    self.bytes_written
                );
                self.state = SessionState::Succeeded;
                SessionOutcome::UpdateApplied
            }
            Err(fault) => self.fail(UpdateError::Finalize(fault.to_string())),
        }
    }

    fn fail(&mut self, err: UpdateError) -> SessionOutcome {
        warn!("update session failed: {}", err);
        self.state = SessionState::Failed(err.clone());
        SessionOutcome::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_session_starts_in_checking() {
        let session = UpdateSession::new();
        assert_eq!(*session.state(), SessionState::Checking);
        assert_eq!(session.bytes_written(), 0);
        assert_eq!(session.expected_size(), None);
    }

    #[test]
    fn only_an_applied_update_demands_a_restart() {
        assert!(SessionOutcome::UpdateApplied.requires_restart());
        assert!(!SessionOutcome::NoUpdate.requires_restart());
        assert!(!SessionOutcome::Failed(UpdateError::InsufficientSpace).requires_restart());
    }
}
