// This file implements named signature suites: the self-describing envelope format, the
// object-safe `Suite` interface, the GLYPH suite adapter and the process-wide registry

use crate::error::DecodeError;
use crate::helpers::ensure;
use crate::traits::{KeyGen, SerDes, Signer, Verifier};
use crate::types::{Glyph, PrivateKey, PublicKey, Signature};
use crate::{Error, Profile};
use parking_lot::RwLock;
use rand_core::OsRng;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};


/// A suite-tagged byte payload: `LE16(len(name)) ‖ name ‖ payload`.
///
/// # Examples
/// ```rust
/// use glyph_sig::suite::Envelope;
///
/// let env = Envelope::new("glyph", vec![0xde, 0xad]).unwrap();
/// assert_eq!(env.to_bytes(), [5, 0, b'g', b'l', b'y', b'p', b'h', 0xde, 0xad]);
/// assert_eq!(Envelope::from_bytes(&env.to_bytes()).unwrap(), env);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    suite: String,
    payload: Vec<u8>,
}


impl Envelope {
    /// Wraps `payload` under `suite`.
    ///
    /// # Errors
    /// Returns [`DecodeError::InvalidName`] when the name exceeds 65535 bytes.
    pub fn new(suite: impl Into<String>, payload: Vec<u8>) -> Result<Self, Error> {
        let suite = suite.into();
        ensure!(suite.len() <= usize::from(u16::MAX), Error::Decode(DecodeError::InvalidName));
        Ok(Self { suite, payload })
    }

    /// Suite name the payload belongs to.
    #[must_use]
    pub fn suite(&self) -> &str { &self.suite }

    /// Raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Serializes the envelope.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.suite.len() + self.payload.len());
        #[allow(clippy::cast_possible_truncation)] // length checked in new()
        out.extend_from_slice(&(self.suite.len() as u16).to_le_bytes());
        out.extend_from_slice(self.suite.as_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parses an envelope; everything after the name is payload.
    ///
    /// # Errors
    /// Returns an error when the header is truncated or the name is not UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure!(bytes.len() >= 2, DecodeError::Truncated { needed: 2, available: bytes.len() });
        let name_len = usize::from(u16::from_le_bytes([bytes[0], bytes[1]]));
        let needed = 2 + name_len;
        ensure!(bytes.len() >= needed, DecodeError::Truncated { needed, available: bytes.len() });
        let suite = std::str::from_utf8(&bytes[2..needed]).map_err(|_| DecodeError::InvalidName)?;
        Ok(Self { suite: suite.to_owned(), payload: bytes[needed..].to_vec() })
    }
}


/// A named signature scheme operating on envelopes. Implementations are shared
/// across threads through the [`Registry`].
pub trait Suite: Send + Sync {
    /// Registry key and envelope tag.
    fn name(&self) -> &str;

    /// Generates a key pair, returned as `(public, private)` envelopes.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    fn keygen(&self) -> Result<(Envelope, Envelope), Error>;

    /// Signs `message` with a private key envelope.
    ///
    /// # Errors
    /// Returns an error on a foreign or malformed key, or when signing fails.
    fn sign(&self, private_key: &Envelope, message: &[u8]) -> Result<Envelope, Error>;

    /// Verifies a signature envelope against a public key envelope.
    ///
    /// # Errors
    /// Returns [`Error::VerificationFailed`] when the signature does not verify, or a
    /// decode/mismatch error on malformed input.
    fn verify(&self, public_key: &Envelope, signature: &Envelope, message: &[u8]) -> Result<(), Error>;
}


/// The GLYPH scheme under one profile, exposed as a [`Suite`].
#[derive(Clone, Debug)]
pub struct GlyphSuite {
    glyph: Glyph,
}


impl GlyphSuite {
    /// Builds the suite for `profile`; the suite name is the profile name.
    ///
    /// # Errors
    /// Returns [`Error::InvalidProfile`] when the profile fails validation.
    pub fn new(profile: Profile) -> Result<Self, Error> { Ok(Self { glyph: Glyph::new(profile)? }) }

    /// Wraps an existing context.
    #[must_use]
    pub fn from_glyph(glyph: Glyph) -> Self { Self { glyph } }

    /// The context backing this suite.
    #[must_use]
    pub fn glyph(&self) -> &Glyph { &self.glyph }

    /// Wraps a public key.
    ///
    /// # Errors
    /// Returns [`Error::MismatchedSuite`] when the key belongs to another profile.
    pub fn pack_public_key(&self, pk: &PublicKey) -> Result<Envelope, Error> {
        self.check_owner(pk.glyph())?;
        Envelope::new(self.name(), pk.to_bytes())
    }

    /// Wraps a private key.
    ///
    /// # Errors
    /// Returns [`Error::MismatchedSuite`] when the key belongs to another profile.
    pub fn pack_private_key(&self, sk: &PrivateKey) -> Result<Envelope, Error> {
        self.check_owner(sk.glyph())?;
        Envelope::new(self.name(), sk.to_bytes())
    }

    /// Wraps a signature.
    ///
    /// # Errors
    /// Returns [`Error::MismatchedSuite`] when the signature belongs to another profile.
    pub fn pack_signature(&self, sig: &Signature) -> Result<Envelope, Error> {
        self.check_owner(sig.glyph())?;
        Envelope::new(self.name(), sig.to_bytes())
    }

    /// Unwraps and decodes a public key.
    ///
    /// # Errors
    /// Returns [`Error::MismatchedSuite`] for a foreign envelope, or [`Error::Decode`].
    pub fn unpack_public_key(&self, env: &Envelope) -> Result<PublicKey, Error> {
        self.check_tag(env)?;
        PublicKey::try_from_bytes(&self.glyph, env.payload())
    }

    /// Unwraps and decodes a private key.
    ///
    /// # Errors
    /// Returns [`Error::MismatchedSuite`] for a foreign envelope, or [`Error::Decode`].
    pub fn unpack_private_key(&self, env: &Envelope) -> Result<PrivateKey, Error> {
        self.check_tag(env)?;
        PrivateKey::try_from_bytes(&self.glyph, env.payload())
    }

    /// Unwraps and decodes a signature.
    ///
    /// # Errors
    /// Returns [`Error::MismatchedSuite`] for a foreign envelope, or [`Error::Decode`].
    pub fn unpack_signature(&self, env: &Envelope) -> Result<Signature, Error> {
        self.check_tag(env)?;
        Signature::try_from_bytes(&self.glyph, env.payload())
    }

    fn check_tag(&self, env: &Envelope) -> Result<(), Error> {
        ensure!(
            env.suite() == self.name(),
            Error::MismatchedSuite { expected: self.name().to_owned(), found: env.suite().to_owned() }
        );
        Ok(())
    }

    fn check_owner(&self, glyph: &Glyph) -> Result<(), Error> {
        ensure!(
            self.glyph.same_profile(glyph),
            Error::MismatchedSuite {
                expected: self.name().to_owned(),
                found: glyph.profile().name.clone(),
            }
        );
        Ok(())
    }
}


impl Suite for GlyphSuite {
    fn name(&self) -> &str { &self.glyph.profile().name }

    fn keygen(&self) -> Result<(Envelope, Envelope), Error> {
        let (pk, sk) = self.glyph.try_keygen_with_rng(&mut OsRng)?;
        Ok((self.pack_public_key(&pk)?, self.pack_private_key(&sk)?))
    }

    fn sign(&self, private_key: &Envelope, message: &[u8]) -> Result<Envelope, Error> {
        let sk = self.unpack_private_key(private_key)?;
        let sig = sk.try_sign_with_rng(&mut OsRng, message)?;
        self.pack_signature(&sig)
    }

    fn verify(&self, public_key: &Envelope, signature: &Envelope, message: &[u8]) -> Result<(), Error> {
        let pk = self.unpack_public_key(public_key)?;
        let sig = self.unpack_signature(signature)?;
        ensure!(pk.verify(message, &sig), Error::VerificationFailed);
        Ok(())
    }
}


/// Name-keyed collection of suites, safe to share across threads.
///
/// # Examples
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use glyph_sig::suite::Registry;
///
/// let registry = Registry::with_defaults()?;
/// let (pk, sk) = registry.keygen("glyph-small")?;
/// let sig = registry.sign(&sk, b"hello")?;
/// registry.verify(&pk, &sig, b"hello")?;
/// assert!(registry.verify(&pk, &sig, b"hellp").is_err());
/// # Ok(())}
/// ```
#[derive(Default)]
pub struct Registry {
    suites: RwLock<HashMap<String, Arc<dyn Suite>>>,
}


impl Registry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registry holding [`Profile::small()`] and [`Profile::general_default()`].
    ///
    /// # Errors
    /// Propagates profile validation errors.
    pub fn with_defaults() -> Result<Self, Error> {
        let registry = Self::new();
        for profile in [Profile::small(), Profile::general_default()] {
            let _suite = registry.register(Arc::new(GlyphSuite::new(profile)?));
        }
        Ok(registry)
    }

    /// Registers `suite` under its name. If the name is taken the existing suite is kept
    /// and returned; otherwise `suite` is stored and returned.
    pub fn register(&self, suite: Arc<dyn Suite>) -> Arc<dyn Suite> {
        let mut suites = self.suites.write();
        match suites.entry(suite.name().to_owned()) {
            Entry::Occupied(existing) => {
                debug!(suite = existing.key().as_str(), "suite already registered");
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => {
                info!(suite = slot.key().as_str(), "suite registered");
                Arc::clone(slot.insert(suite))
            }
        }
    }

    /// Looks up a suite by name.
    ///
    /// # Errors
    /// Returns [`Error::SuiteNotFound`] when nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Suite>, Error> {
        self.suites.read().get(name).cloned().ok_or_else(|| Error::SuiteNotFound(name.to_owned()))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.suites.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Generates a key pair with the named suite.
    ///
    /// # Errors
    /// Returns [`Error::SuiteNotFound`] or propagates the suite's error.
    pub fn keygen(&self, name: &str) -> Result<(Envelope, Envelope), Error> { self.get(name)?.keygen() }

    /// Signs with the suite named by the private key envelope.
    ///
    /// # Errors
    /// Returns [`Error::SuiteNotFound`] or propagates the suite's error.
    pub fn sign(&self, private_key: &Envelope, message: &[u8]) -> Result<Envelope, Error> {
        self.get(private_key.suite())?.sign(private_key, message)
    }

    /// Verifies with the suite named by the public key envelope. Envelopes from
    /// different suites are rejected before any lookup.
    ///
    /// # Errors
    /// Returns [`Error::MismatchedSuite`], [`Error::SuiteNotFound`],
    /// [`Error::VerificationFailed`] or a decode error.
    pub fn verify(&self, public_key: &Envelope, signature: &Envelope, message: &[u8]) -> Result<(), Error> {
        ensure!(
            public_key.suite() == signature.suite(),
            Error::MismatchedSuite {
                expected: public_key.suite().to_owned(),
                found: signature.suite().to_owned(),
            }
        );
        self.get(public_key.suite())?.verify(public_key, signature, message)
    }
}


impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("suites", &self.names()).finish()
    }
}
