//! Error and status codes shared by every module in this crate.
//!
//! The status set mirrors the five-way split a constrained bignum backend
//! can actually produce: allocation failure, malformed input, an
//! undersized output buffer, numeric overflow of a fixed-width field, and
//! giving up on a bounded iterative search. Everything else is success.

use core::fmt;

/// The result type used throughout `ecc-lab-core`.
pub type Result<T> = core::result::Result<T, Error>;

/// A classification of what went wrong, matching the original firmware's
/// status byte one-to-one so the device layer can translate directly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Allocation failed. On a host build this is vanishingly rare, but the
    /// variant is kept so the status space matches the embedded original.
    Oom,
    /// The input did not parse, or violated a precondition (e.g. a width
    /// outside `2..=8` given to a recoder).
    InvalidInput,
    /// A caller-provided buffer was too small for the requested encoding.
    BufferTooSmall,
    /// A fixed-width quantity could not represent the result.
    Overflow,
    /// A bounded loop (e.g. rejection sampling) exhausted its iteration
    /// budget without converging.
    MaxIterations,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::Oom => "allocation failure",
            Error::InvalidInput => "invalid input",
            Error::BufferTooSmall => "buffer too small",
            Error::Overflow => "overflow",
            Error::MaxIterations => "maximum iterations exceeded",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}
