//! Protocol error types.

use thiserror::Error;

use crate::header::MessageType;

/// Errors that can occur when encoding or decoding controller payloads.
///
/// An uplink whose opcode/type pair is not known is not an error; the decoder
/// returns `Ok(None)` for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Selected channels would not fit in one sensor data uplink.
    #[error("selected channels need {total} bytes, maximum is {max}; reduce the channel selection")]
    PayloadTooLarge {
        /// Summed width of the selected channels.
        total: usize,
        /// Device-side budget.
        max: usize,
    },

    /// Message body is shorter than its layout requires.
    #[error("{what} too short: expected at least {expected} bytes, got {actual}")]
    Truncated {
        /// The structure being decoded.
        what: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Length actually available.
        actual: usize,
    },

    /// Frame header names a different message than the decoder handles.
    #[error("expected {expected} frame, got opcode 0x{opcode:02X} ({message_type:?})")]
    UnexpectedMessage {
        /// The message the decoder was asked for.
        expected: &'static str,
        /// Opcode found in the header.
        opcode: u8,
        /// Direction found in the header.
        message_type: MessageType,
    },

    /// Transport text is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

impl ProtocolError {
    /// Fail unless `data` holds at least `expected` bytes.
    pub(crate) fn check_len(
        what: &'static str,
        data: &[u8],
        expected: usize,
    ) -> Result<(), ProtocolError> {
        if data.len() < expected {
            return Err(ProtocolError::Truncated {
                what,
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }

    /// True for errors caused by a malformed uplink rather than bad input to an encoder.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::Truncated { .. }
                | ProtocolError::UnexpectedMessage { .. }
                | ProtocolError::InvalidBase64(_)
        )
    }
}

/// Result type alias for codec operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
