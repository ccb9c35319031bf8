#![deny(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]
#![warn(absolute_paths_not_starting_with_crate, elided_lifetimes_in_paths)]
#![warn(explicit_outlives_requirements, keyword_idents, macro_use_extern_crate)]
#![warn(meta_variable_misuse, non_ascii_idents, single_use_lifetimes, trivial_casts)]
#![warn(trivial_numeric_casts, unused_extern_crates, unused_import_braces, unused_lifetimes)]
#![warn(unused_macro_rules, unused_qualifications)]
#![allow(clippy::module_name_repetitions)]
//
#![doc = include_str!("../README.md")]


// Implements the GLYPH signature (GLP family) over R_q = Z_q[X]/(X^N + 1), with one or
// more NTT-friendly moduli, a registry of named suites and a self-describing wire format.

// Functionality map
//
// Profile validation                               --> params.rs
// Ring context, NTT, sampling                      --> ring.rs
// ExpandA(seed), challenge Encode(w, m)            --> hashing.rs
// KeyGen, single signing attempt, Verify           --> glyph.rs
// Parallel signing with timeout and cancellation   --> sign_pool.rs
// Dense / sparse encodings, sk/pk/sig layouts      --> encodings.rs
// Envelopes, Suite trait, Registry                 --> suite.rs
// Types are in types.rs, traits are in traits.rs, errors are in error.rs...

// Note that debug_assert! statements enforce correct program construction and are not involved
// in any operational dataflow. The ensure! statements implement dataflow validation and do not
// panic. Rejection sampling makes signing variable-time; no constant-time claims are made.

/// The `rand_core` types are re-exported so that users of glyph-sig do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

mod encodings;
mod error;
mod glyph;
mod hashing;
mod helpers;
mod params;
mod ring;
mod sign_pool;
mod types;

/// All key, signing and serialization functionality is covered by traits.
pub mod traits;

/// Named suites, envelopes and the registry.
#[cfg(feature = "default-rng")]
pub mod suite;

pub use crate::error::{DecodeError, Error};
pub use crate::params::{Profile, DEFAULT_A_SEED, DEFAULT_SIGN_TIMEOUT, GENERAL_MODULI, SMALL_MODULUS};
pub use crate::types::{Glyph, Poly, PrivateKey, PublicKey, Signature};

use crate::traits::{KeyGen, SerDes, Signer, Verifier};
use rand_chacha::rand_core::SeedableRng;
use rand_core::CryptoRngCore;


impl KeyGen for Glyph {
    type PrivateKey = PrivateKey;
    type PublicKey = PublicKey;

    fn try_keygen_with_rng(&self, rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), Error> {
        glyph::key_gen(self, rng)
    }

    fn keygen_from_seed(&self, seed: &[u8; 32]) -> Result<(PublicKey, PrivateKey), Error> {
        let mut rng = rand_chacha::ChaCha20Rng::from_seed(*seed);
        glyph::key_gen(self, &mut rng)
    }
}


impl Signer for PrivateKey {
    type PublicKey = PublicKey;
    type Signature = Signature;

    /// Signs with the worker pool; see [`Profile::workers`] and [`Profile::sign_timeout`].
    fn try_sign_with_rng(&self, rng: &mut impl CryptoRngCore, message: &[u8]) -> Result<Signature, Error> {
        sign_pool::sign(self, message, rng)
    }

    fn get_public_key(&self) -> PublicKey { glyph::public_from_private(self) }
}


impl Verifier for PublicKey {
    type Signature = Signature;

    fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        glyph::verify(self, message, signature)
    }
}


impl SerDes for PrivateKey {
    fn to_bytes(&self) -> Vec<u8> { encodings::sk_encode(self.glyph.profile(), &self.s, &self.e) }

    fn try_from_bytes(glyph: &Glyph, bytes: &[u8]) -> Result<Self, Error> {
        let (s, e) = encodings::sk_decode(glyph.profile(), bytes)?;
        Ok(glyph::private_key(glyph, s, e))
    }
}


impl SerDes for PublicKey {
    fn to_bytes(&self) -> Vec<u8> { encodings::pk_encode(self.glyph.profile(), &self.t) }

    fn try_from_bytes(glyph: &Glyph, bytes: &[u8]) -> Result<Self, Error> {
        let t = encodings::pk_decode(glyph.profile(), bytes)?;
        Ok(glyph::public_key(glyph, t))
    }
}


impl SerDes for Signature {
    fn to_bytes(&self) -> Vec<u8> {
        encodings::sig_encode(self.glyph.profile(), &self.z1, &self.z2, &self.c)
    }

    fn try_from_bytes(glyph: &Glyph, bytes: &[u8]) -> Result<Self, Error> {
        let (z1, z2, c) = encodings::sig_decode(glyph.profile(), bytes)?;
        Ok(Signature { glyph: glyph.clone(), z1, z2, c })
    }
}


/// Byte lengths of the wire encodings for a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedSizes {
    /// Private key bytes
    pub private_key: usize,
    /// Public key bytes
    pub public_key: usize,
    /// Signature bytes
    pub signature: usize,
}


impl Profile {
    /// Exact wire sizes under this profile.
    #[must_use]
    pub fn encoded_sizes(&self) -> EncodedSizes {
        EncodedSizes {
            private_key: encodings::sk_len(self),
            public_key: encodings::pk_len(self),
            signature: encodings::sig_len(self),
        }
    }
}
