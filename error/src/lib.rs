//! Shared error marker trait used across the workspace's crates.
//!
//! Each crate defines its own `thiserror`-derived error enum and implements
//! this trait on it, so call sites that cross crate boundaries can bound on
//! `FecTraceableError` instead of the concrete error type.

use std::error::Error;
use std::fmt::Debug;

/// Marker trait for this workspace's error types.
///
/// Implementors are plain `std::error::Error` types; the trait itself adds
/// no required methods beyond a stable numeric `category` used for FFI
/// boundaries and log correlation.
pub trait FecTraceableError: Error + Debug {
    /// A small stable integer identifying the broad class of failure.
    /// Negative by convention, mirroring the C library's `-1`/`-2`-style
    /// error codes at its FFI boundary.
    fn category(&self) -> i32 {
        -1
    }
}
