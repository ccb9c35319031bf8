use crate::hashing::expand_a;
use crate::params::Profile;
use crate::ring::Ring;
use crate::Error;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Ring element in coefficient form: one residue vector of length `N` per modulus,
/// in modulus order, every residue reduced into `[0, q)`.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub struct Poly(pub(crate) Vec<Vec<u64>>);


/// Ring element in NTT form (bit-reversed evaluation order).
#[derive(Clone, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct NttPoly(pub(crate) Vec<Vec<u64>>);


/// Shared view over both domains so coefficient-wise arithmetic is written once.
pub(crate) trait Residues {
    fn residues(&self) -> &[Vec<u64>];
    fn from_residues(r: Vec<Vec<u64>>) -> Self;
}

impl Residues for Poly {
    fn residues(&self) -> &[Vec<u64>] { &self.0 }

    fn from_residues(r: Vec<Vec<u64>>) -> Self { Self(r) }
}

impl Residues for NttPoly {
    fn residues(&self) -> &[Vec<u64>] { &self.0 }

    fn from_residues(r: Vec<Vec<u64>>) -> Self { Self(r) }
}


impl Poly {
    /// Residue vectors, one per modulus in profile order.
    #[must_use]
    pub fn residues(&self) -> &[Vec<u64>] { &self.0 }
}


/// Everything derived once per profile: the ring context and the public parameter `a`.
pub(crate) struct GlyphInner {
    pub(crate) profile: Profile,
    pub(crate) ring: Ring,
    pub(crate) a: Poly,
    pub(crate) a_hat: NttPoly,
}


/// A validated profile together with its precomputed ring context and public
/// parameter `a`. Cloning is cheap; keys and signatures each hold a clone.
/// Implements the [`crate::traits::KeyGen`] trait.
#[derive(Clone)]
pub struct Glyph(pub(crate) Arc<GlyphInner>);


impl Glyph {
    /// Validates `profile`, builds the NTT tables and expands `a` from the profile seed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidProfile`] when the profile fails validation.
    pub fn new(profile: Profile) -> Result<Self, Error> {
        profile.validate()?;
        let ring = Ring::new(profile.n, &profile.moduli)?;
        let a = expand_a(&ring, &profile.a_seed);
        let a_hat = ring.ntt(&a);
        debug!(suite = %profile.name, n = profile.n, moduli = ring.width(), "glyph context ready");
        Ok(Self(Arc::new(GlyphInner { profile, ring, a, a_hat })))
    }


    /// Context for [`Profile::small()`].
    ///
    /// # Errors
    /// Never fails for the shipped profile; the `Result` mirrors [`Glyph::new()`].
    pub fn small() -> Result<Self, Error> { Self::new(Profile::small()) }


    /// Context for [`Profile::general_default()`].
    ///
    /// # Errors
    /// Never fails for the shipped profile; the `Result` mirrors [`Glyph::new()`].
    pub fn general() -> Result<Self, Error> { Self::new(Profile::general_default()) }


    /// The profile this context was built from.
    #[must_use]
    pub fn profile(&self) -> &Profile { &self.0.profile }


    /// The public ring parameter `a`.
    #[must_use]
    pub fn a(&self) -> &Poly { &self.0.a }


    pub(crate) fn ring(&self) -> &Ring { &self.0.ring }


    pub(crate) fn a_hat(&self) -> &NttPoly { &self.0.a_hat }


    /// True when both handles describe the same scheme instance, see [`Profile::same_parameters()`].
    #[must_use]
    pub fn same_profile(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.profile.same_parameters(&other.0.profile)
    }
}


impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("suite", &self.0.profile.name)
            .field("n", &self.0.profile.n)
            .field("moduli", &self.0.profile.moduli)
            .finish_non_exhaustive()
    }
}


/// Private key: ternary `s` and `e`, plus their NTT forms for repeated signing. <br>
/// Implements the [`crate::traits::Signer`] and [`crate::traits::SerDes`] traits.
/// Secret material is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    pub(crate) glyph: Glyph,
    pub(crate) s: Poly,
    pub(crate) e: Poly,
    pub(crate) s_hat: NttPoly,
    pub(crate) e_hat: NttPoly,
}


impl PrivateKey {
    /// Context this key belongs to.
    #[must_use]
    pub fn glyph(&self) -> &Glyph { &self.glyph }
}


impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("suite", &self.glyph.profile().name).finish_non_exhaustive()
    }
}


/// Public key `t = a·s + e`, plus its NTT form. <br>
/// Implements the [`crate::traits::Verifier`] and [`crate::traits::SerDes`] traits.
#[derive(Clone)]
pub struct PublicKey {
    pub(crate) glyph: Glyph,
    pub(crate) t: Poly,
    pub(crate) t_hat: NttPoly,
}


impl PublicKey {
    /// Context this key belongs to.
    #[must_use]
    pub fn glyph(&self) -> &Glyph { &self.glyph }

    /// The key polynomial `t`.
    #[must_use]
    pub fn t(&self) -> &Poly { &self.t }
}


impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool { self.glyph.same_profile(&other.glyph) && self.t == other.t }
}

impl Eq for PublicKey {}


impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey").field("suite", &self.glyph.profile().name).finish_non_exhaustive()
    }
}


/// Signature `(z1, z2, c)`. <br>
/// Implements the [`crate::traits::SerDes`] trait.
#[derive(Clone)]
pub struct Signature {
    pub(crate) glyph: Glyph,
    pub(crate) z1: Poly,
    pub(crate) z2: Poly,
    pub(crate) c: Poly,
}


impl Signature {
    /// Context this signature belongs to.
    #[must_use]
    pub fn glyph(&self) -> &Glyph { &self.glyph }

    /// First response polynomial.
    #[must_use]
    pub fn z1(&self) -> &Poly { &self.z1 }

    /// Second response polynomial.
    #[must_use]
    pub fn z2(&self) -> &Poly { &self.z2 }

    /// Sparse challenge polynomial.
    #[must_use]
    pub fn c(&self) -> &Poly { &self.c }
}


impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.glyph.same_profile(&other.glyph)
            && self.z1 == other.z1
            && self.z2 == other.z2
            && self.c == other.c
    }
}

impl Eq for Signature {}


impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature").field("suite", &self.glyph.profile().name).finish_non_exhaustive()
    }
}
