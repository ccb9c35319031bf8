// This file implements the error taxonomy shared by the engine, the wire codec and the registry

use std::time::Duration;
use thiserror::Error;


/// Errors surfaced by key generation, signing, decoding and suite dispatch.
///
/// A failed verification is not an error for the core [`crate::traits::Verifier`],
/// which returns `false`; only the envelope-level [`crate::suite::Suite::verify`]
/// reports it as [`Error::VerificationFailed`].
#[derive(Debug, Error)]
pub enum Error {
    /// No worker found an accepting signature before the profile deadline.
    #[error("signing timed out after {elapsed:?}")]
    SignTimeout {
        /// Wall-clock time spent before giving up.
        elapsed: Duration,
    },

    /// The entropy source failed.
    #[error("random number generator failed: {0}")]
    Rng(rand_core::Error),

    /// Malformed key, signature or envelope bytes.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// No suite is registered under the requested name.
    #[error("suite not found: {0}")]
    SuiteNotFound(String),

    /// Two values from differently named suites were combined.
    #[error("mismatched suite: expected {expected}, found {found}")]
    MismatchedSuite {
        /// Suite name the operation was bound to.
        expected: String,
        /// Suite name carried by the offending value.
        found: String,
    },

    /// The signature does not verify.
    #[error("signature verification failed")]
    VerificationFailed,

    /// A profile failed validation.
    #[error("invalid profile: {0}")]
    InvalidProfile(&'static str),

    /// An internal invariant was broken; indicates a bug rather than bad input.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}


/// Reasons a byte string is rejected by the wire codec. Length problems and
/// content problems are reported separately.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is not exactly the size the profile dictates.
    #[error("bad length: expected {expected} bytes, got {actual}")]
    Length {
        /// Exact number of bytes required.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },

    /// A header declares more bytes than are present.
    #[error("truncated: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required by the header.
        needed: usize,
        /// Bytes present.
        available: usize,
    },

    /// A dense coefficient is not reduced modulo its prime.
    #[error("coefficient {index} = {value} not below modulus {modulus}")]
    CoefficientOutOfRange {
        /// Flat coefficient index (component-major).
        index: usize,
        /// Decoded value.
        value: u64,
        /// Modulus of the component.
        modulus: u64,
    },

    /// A secret coefficient is not in `{-1, 0, 1}`.
    #[error("secret coefficient {index} is not ternary")]
    NotTernary {
        /// Flat coefficient index (component-major).
        index: usize,
    },

    /// The residues of one secret coefficient disagree between moduli.
    #[error("secret coefficient {index} differs between moduli")]
    InconsistentResidues {
        /// Coefficient position.
        index: usize,
    },

    /// A sparse challenge entry is `>= 2n`.
    #[error("sparse index {value} out of range")]
    SparseIndexOutOfRange {
        /// Raw 16-bit entry.
        value: u16,
    },

    /// A sparse challenge names the same position twice within a component.
    #[error("sparse position {position} repeated")]
    DuplicateSparseIndex {
        /// Repeated position.
        position: usize,
    },

    /// An envelope suite name is not valid UTF-8 or is too long.
    #[error("invalid suite name")]
    InvalidName,
}
