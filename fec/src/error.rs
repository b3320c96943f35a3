//! Error types surfaced at the crate boundary.
//!
//! Three kinds are distinguished, matching the three failure classes a
//! caller can observe: a bad construction parameter, a bad per-call
//! argument, and a decoder that legitimately ran out of correction budget.

use fec_error::FecTraceableError;
use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum FecError {
    /// A construction parameter was out of range or otherwise invalid.
    #[error("construction failed: {0}")]
    Construction(String),

    /// A per-call argument was invalid (zero length, size mismatch, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The decoder ran to completion but could not correct the codeword.
    ///
    /// This is a normal outcome, not a bug: the channel introduced more
    /// errors than the code's parameters can guarantee to fix.
    #[error("decode refused: {0}")]
    DecodeRefused(String),
}

impl FecTraceableError for FecError {
    fn category(&self) -> i32 {
        match self {
            FecError::Construction(_) => -1,
            FecError::InvalidArgument(_) => -2,
            FecError::DecodeRefused(_) => -3,
        }
    }
}

pub type Result<T> = std::result::Result<T, FecError>;
