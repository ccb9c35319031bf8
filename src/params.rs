// This file implements the parameter profiles; every component receives one explicitly

use crate::helpers::{ensure, is_prime, position_bits};
use crate::Error;
use std::num::NonZeroUsize;
use std::time::Duration;


/// Seed for the public ring parameter `a` shared by the shipped profiles.
pub const DEFAULT_A_SEED: [u8; 32] = *b"GLYPH public ring parameter a v1";

/// Wall-clock budget for a single signing call unless a profile overrides it.
pub const DEFAULT_SIGN_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// The single modulus of [`Profile::small()`]; `59393 = 29 * 2^11 + 1`.
pub const SMALL_MODULUS: u64 = 59393;

/// Default modulus list of [`Profile::general_default()`]; both are `1 mod 2^11` and below `2^30`.
pub const GENERAL_MODULI: [u64; 2] = [1_073_707_009, 1_073_698_817];

const MAX_MODULUS: u64 = 1 << 62;


/// One concrete instantiation of the scheme: ring degree, moduli, rejection bound,
/// challenge weight and the operational knobs of the signing engine.
///
/// Fields are public so that variants can be derived with struct-update syntax;
/// [`crate::Glyph::new()`] runs [`Profile::validate()`] before anything is built.
///
/// # Examples
/// ```rust
/// use glyph_sig::Profile;
/// use std::time::Duration;
///
/// let profile = Profile { sign_timeout: Duration::from_secs(30), ..Profile::small() };
/// assert!(profile.validate().is_ok());
/// assert_eq!(profile.n_bits(), 10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    /// Suite name carried in envelopes.
    pub name: String,
    /// Ring degree `N`, a power of two.
    pub n: usize,
    /// Co-prime moduli, each NTT-friendly for `N`.
    pub moduli: Vec<u64>,
    /// Rejection bound `B`.
    pub b: u64,
    /// Challenge weight `ω`.
    pub omega: usize,
    /// Budget for one signing call across all workers.
    pub sign_timeout: Duration,
    /// Worker pool size; `None` sizes the pool to the available hardware concurrency.
    pub workers: Option<NonZeroUsize>,
    /// Seed the public ring parameter `a` is expanded from.
    pub a_seed: [u8; 32],
}


impl Profile {
    /// Single-modulus profile: `N = 1024`, `q = 59393`, `B = 16383`, `ω = 16`.
    #[must_use]
    pub fn small() -> Self {
        Self {
            name: "glyph-small".into(),
            n: 1024,
            moduli: vec![SMALL_MODULUS],
            b: 16383,
            omega: 16,
            sign_timeout: DEFAULT_SIGN_TIMEOUT,
            workers: None,
            a_seed: DEFAULT_A_SEED,
        }
    }


    /// Multi-modulus profile over a caller supplied modulus list: `N = 1024`,
    /// `B = 16383`, `ω = 16`. The list is checked by [`Profile::validate()`].
    #[must_use]
    pub fn general(moduli: &[u64]) -> Self {
        Self {
            name: "glyph".into(),
            moduli: moduli.to_vec(),
            ..Self::small()
        }
    }


    /// [`Profile::general()`] over [`GENERAL_MODULI`].
    #[must_use]
    pub fn general_default() -> Self { Self::general(&GENERAL_MODULI) }


    /// Bits needed to address `N` positions, `ceil(log2 N)`.
    #[must_use]
    pub fn n_bits(&self) -> u32 { position_bits(self.n) }


    /// Divisor of the commitment compression, `2(B − ω) + 1`. Saturates on a profile
    /// that has not passed [`Profile::validate()`].
    #[must_use]
    pub fn kfloor_divisor(&self) -> u64 { self.z_bound().saturating_mul(2).saturating_add(1) }


    /// Largest centered magnitude a signature response may have, `B − ω`; zero when `ω ≥ B`.
    #[must_use]
    pub fn z_bound(&self) -> u64 { self.b.saturating_sub(self.omega as u64) }


    /// True when both profiles describe the same scheme instance: suite name, ring,
    /// bounds and the seed of `a`. The signing knobs `sign_timeout` and `workers` are ignored.
    #[must_use]
    pub fn same_parameters(&self, other: &Self) -> bool {
        self.name == other.name
            && self.n == other.n
            && self.moduli == other.moduli
            && self.b == other.b
            && self.omega == other.omega
            && self.a_seed == other.a_seed
    }


    /// Number of nonzero challenge coefficients per modulus component.
    #[must_use]
    pub fn challenge_weight(&self) -> usize { self.omega.min(self.n) }


    /// Resolved worker pool size.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }


    /// Checks every constraint the algorithms rely on.
    ///
    /// # Errors
    /// Returns [`Error::InvalidProfile`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), Error> {
        ensure!(!self.name.is_empty(), Error::InvalidProfile("empty suite name"));
        ensure!(self.name.len() <= usize::from(u16::MAX), Error::InvalidProfile("suite name too long"));
        ensure!(self.n.is_power_of_two() && self.n >= 2, Error::InvalidProfile("n must be a power of two"));
        ensure!(self.n <= 1 << 15, Error::InvalidProfile("n too large for 16-bit sparse indices"));
        ensure!(!self.moduli.is_empty(), Error::InvalidProfile("no moduli"));
        ensure!(self.omega > 0, Error::InvalidProfile("omega must be positive"));
        ensure!((self.omega as u64) < self.b, Error::InvalidProfile("omega must be below b"));
        ensure!(self.b < MAX_MODULUS / 2, Error::InvalidProfile("b must be below q/2"));

        let two_n = 2 * self.n as u64;
        for (i, &q) in self.moduli.iter().enumerate() {
            ensure!(q < MAX_MODULUS, Error::InvalidProfile("modulus too large"));
            ensure!(is_prime(q), Error::InvalidProfile("modulus not prime"));
            ensure!(q % two_n == 1, Error::InvalidProfile("modulus not 1 mod 2n"));
            ensure!(2 * self.b < q, Error::InvalidProfile("b must be below q/2"));
            ensure!(
                (q - 1) / self.kfloor_divisor() <= u64::from(u16::MAX),
                Error::InvalidProfile("compressed commitment exceeds 16 bits")
            );
            ensure!(!self.moduli[..i].contains(&q), Error::InvalidProfile("repeated modulus"));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(Profile::small().validate().is_ok());
        assert!(Profile::general_default().validate().is_ok());
        assert_eq!(Profile::small().kfloor_divisor(), 32735);
        assert_eq!(Profile::small().z_bound(), 16367);
        assert_eq!(Profile::general_default().moduli.len(), 2);
    }

    #[test]
    fn test_rejects_bad_profiles() {
        let not_prime = Profile::general(&[2049 * 2049]); // 1 mod 2048 but composite
        assert!(matches!(not_prime.validate(), Err(Error::InvalidProfile("modulus not prime"))));
        let not_ntt_friendly = Profile::general(&[65521]);
        assert!(matches!(
            not_ntt_friendly.validate(),
            Err(Error::InvalidProfile("modulus not 1 mod 2n"))
        ));
        assert!(Profile::general(&[65537]).validate().is_ok());
        let repeated = Profile::general(&[SMALL_MODULUS, SMALL_MODULUS]);
        assert!(matches!(repeated.validate(), Err(Error::InvalidProfile("repeated modulus"))));
        let odd_n = Profile { n: 1000, ..Profile::small() };
        assert!(odd_n.validate().is_err());
        let big_omega = Profile { omega: 16383, ..Profile::small() };
        assert!(big_omega.validate().is_err());
        let wide = Profile::general(&[(1 << 40) - 2048 * 3 + 1]);
        assert!(wide.validate().is_err());
        let empty = Profile::general(&[]);
        assert!(matches!(empty.validate(), Err(Error::InvalidProfile("no moduli"))));
    }

    #[test]
    fn test_huge_bound_is_rejected_not_overflowed() {
        let huge = Profile { b: (1 << 63) + 10, ..Profile::small() };
        assert!(matches!(huge.validate(), Err(Error::InvalidProfile("b must be below q/2"))));
        let max = Profile { b: u64::MAX, ..Profile::small() };
        assert!(max.validate().is_err());
        assert_eq!(max.kfloor_divisor(), u64::MAX);
    }

    #[test]
    fn test_derived_bounds_saturate_before_validation() {
        let inverted = Profile { b: 10, omega: 16, ..Profile::small() };
        assert_eq!(inverted.z_bound(), 0);
        assert_eq!(inverted.kfloor_divisor(), 1);
        assert!(matches!(inverted.validate(), Err(Error::InvalidProfile("omega must be below b"))));
    }

    #[test]
    fn test_same_parameters_ignores_signing_knobs() {
        let tuned = Profile {
            sign_timeout: Duration::from_secs(1),
            workers: NonZeroUsize::new(2),
            ..Profile::small()
        };
        assert!(tuned.same_parameters(&Profile::small()));
        assert_ne!(tuned, Profile::small());
        assert!(!Profile { omega: 17, ..Profile::small() }.same_parameters(&Profile::small()));
        assert!(!Profile { a_seed: [0u8; 32], ..Profile::small() }.same_parameters(&Profile::small()));
        assert!(!Profile::general_default().same_parameters(&Profile::small()));
    }

    #[test]
    fn test_worker_override() {
        let p = Profile { workers: NonZeroUsize::new(3), ..Profile::small() };
        assert_eq!(p.worker_count(), 3);
        assert!(Profile::small().worker_count() >= 1);
    }
}
