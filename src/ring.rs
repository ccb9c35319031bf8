// This file implements the ring Z_q[X]/(X^N + 1) over one or more NTT-friendly primes:
// allocation, forward/inverse NTT, coefficient-wise arithmetic and random sampling

use crate::helpers::{
    add_mod, bit_length, bit_reverse, centered_abs, from_signed, mul_mod, pow_mod, position_bits,
    sub_mod,
};
use crate::types::{NttPoly, Poly, Residues};
use crate::Error;
use rand_core::CryptoRngCore;


/// Per-modulus twiddle factors; `zetas[i] = ψ^brv(i)` with `ψ` a primitive `2N`-th root of unity.
#[derive(Clone, Debug)]
struct NttTable {
    q: u64,
    zetas: Vec<u64>,
    n_inv: u64,
}


/// Ring arithmetic context for one parameter profile. Every polynomial it hands
/// out has one residue vector of length `n` per modulus, in modulus order.
#[derive(Clone, Debug)]
pub(crate) struct Ring {
    n: usize,
    tables: Vec<NttTable>,
}


impl Ring {
    /// Builds the NTT tables. The caller guarantees (via `Profile::validate()`) that `n` is a
    /// power of two and that every modulus is a prime `≡ 1 mod 2n`.
    ///
    /// # Errors
    /// Returns an error when no primitive `2n`-th root of unity exists for a modulus.
    pub(crate) fn new(n: usize, moduli: &[u64]) -> Result<Self, Error> {
        let log_n = position_bits(n);
        let tables = moduli
            .iter()
            .map(|&q| -> Result<NttTable, Error> {
                let psi = primitive_root_2n(q, n as u64)
                    .ok_or(Error::InvalidProfile("no primitive 2n-th root of unity"))?;
                let zetas = (0..n).map(|i| pow_mod(psi, bit_reverse(i, log_n) as u64, q)).collect();
                let n_inv = pow_mod(n as u64, q - 2, q);
                Ok(NttTable { q, zetas, n_inv })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self { n, tables })
    }


    /// Ring degree `N`
    pub(crate) fn n(&self) -> usize { self.n }


    /// Moduli in component order
    pub(crate) fn moduli(&self) -> impl Iterator<Item = u64> + '_ { self.tables.iter().map(|t| t.q) }


    /// Number of modulus components
    pub(crate) fn width(&self) -> usize { self.tables.len() }


    /// Zero polynomial in coefficient form
    pub(crate) fn new_poly(&self) -> Poly { Poly(vec![vec![0; self.n]; self.tables.len()]) }


    /// True when `p` has one length-`n` residue vector per modulus, all reduced.
    pub(crate) fn is_well_formed(&self, p: &Poly) -> bool {
        p.0.len() == self.tables.len()
            && p.0.iter().zip(&self.tables).all(|(r, t)| r.len() == self.n && r.iter().all(|&x| x < t.q))
    }


    /// Lifts a vector of small signed integers into every modulus component.
    pub(crate) fn from_small(&self, coeffs: &[i64]) -> Poly {
        debug_assert_eq!(coeffs.len(), self.n, "from_small: bad length");
        Poly(self.tables.iter().map(|t| coeffs.iter().map(|&v| from_signed(v, t.q)).collect()).collect())
    }


    /// Negacyclic NTT, iterative Cooley-Tukey with bit-reversed twiddles (output in bit-reversed order).
    pub(crate) fn ntt(&self, p: &Poly) -> NttPoly {
        let mut w_hat = p.0.clone();

        // for each modulus component
        for (w, table) in w_hat.iter_mut().zip(&self.tables) {
            let q = table.q;
            let mut m = 0;
            let mut len = self.n / 2;
            while len >= 1 {
                let mut start = 0;
                while start < self.n {
                    m += 1;
                    let zeta = table.zetas[m];
                    for j in start..(start + len) {
                        let t = mul_mod(zeta, w[j + len], q);
                        w[j + len] = sub_mod(w[j], t, q);
                        w[j] = add_mod(w[j], t, q);
                    }
                    start += 2 * len;
                }
                len >>= 1;
            }
        }
        NttPoly(w_hat)
    }


    /// Inverse of [`Ring::ntt`], Gentleman-Sande butterflies followed by scaling with `n^-1`.
    pub(crate) fn inv_ntt(&self, p_hat: &NttPoly) -> Poly {
        let mut w_out = p_hat.0.clone();

        for (w, table) in w_out.iter_mut().zip(&self.tables) {
            let q = table.q;
            let mut m = self.n;
            let mut len = 1;
            while len < self.n {
                let mut start = 0;
                while start < self.n {
                    m -= 1;
                    let zeta = q - table.zetas[m]; // −ζ^brv(m)
                    for j in start..(start + len) {
                        let t = w[j];
                        w[j] = add_mod(t, w[j + len], q);
                        w[j + len] = mul_mod(zeta, sub_mod(t, w[j + len], q), q);
                    }
                    start += 2 * len;
                }
                len <<= 1;
            }
            w.iter_mut().for_each(|x| *x = mul_mod(*x, table.n_inv, q));
        }
        Poly(w_out)
    }


    /// Coefficient-wise `a + b`, in whichever domain both operands share.
    pub(crate) fn add<P: Residues>(&self, a: &P, b: &P) -> P { self.zip_with(a, b, add_mod) }


    /// Coefficient-wise `a − b`, in whichever domain both operands share.
    pub(crate) fn sub<P: Residues>(&self, a: &P, b: &P) -> P { self.zip_with(a, b, sub_mod) }


    /// Pointwise product of two NTT-domain operands.
    pub(crate) fn mul_pointwise(&self, a: &NttPoly, b: &NttPoly) -> NttPoly {
        self.zip_with(a, b, mul_mod)
    }


    /// Ring product `a · b` of two coefficient-form operands.
    #[cfg(test)]
    pub(crate) fn mul(&self, a: &Poly, b: &Poly) -> Poly {
        self.inv_ntt(&self.mul_pointwise(&self.ntt(a), &self.ntt(b)))
    }


    fn zip_with<P: Residues>(&self, a: &P, b: &P, op: fn(u64, u64, u64) -> u64) -> P {
        P::from_residues(
            a.residues()
                .iter()
                .zip(b.residues())
                .zip(&self.tables)
                .map(|((x, y), t)| x.iter().zip(y).map(|(&x, &y)| op(x, y, t.q)).collect())
                .collect(),
        )
    }


    /// Coefficient-wise equality over every component; differing shapes compare unequal.
    pub(crate) fn equal(&self, a: &Poly, b: &Poly) -> bool {
        a.0.len() == b.0.len() && a.0.iter().zip(&b.0).all(|(x, y)| x == y)
    }


    /// Largest centered magnitude `min(x, q − x)` over all coefficients and components.
    pub(crate) fn max_centered(&self, p: &Poly) -> u64 {
        p.0.iter()
            .zip(&self.tables)
            .flat_map(|(r, t)| r.iter().map(move |&x| centered_abs(x, t.q)))
            .max()
            .unwrap_or(0)
    }


    /// Samples a polynomial with coefficients uniform in `{−1, 0, 1}`, identical across moduli.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    pub(crate) fn sample_ternary(&self, rng: &mut impl CryptoRngCore) -> Result<Poly, Error> {
        let mut source = ByteSource::new(rng, self.n);
        let mut coeffs = Vec::with_capacity(self.n);
        while coeffs.len() < self.n {
            // 255 = 3 * 85, so the residue mod 3 of an accepted byte is uniform
            let byte = source.next_u8()?;
            if byte < 255 {
                coeffs.push(i64::from(byte % 3) - 1);
            }
        }
        Ok(self.from_small(&coeffs))
    }


    /// Samples each component independently and uniformly from `Z_q^n`.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    #[cfg(test)]
    pub(crate) fn sample_uniform(&self, rng: &mut impl CryptoRngCore) -> Result<Poly, Error> {
        let mut source = ByteSource::new(rng, 8 * self.n);
        let mut out = self.new_poly();
        for (r, t) in out.0.iter_mut().zip(&self.tables) {
            let mask = (1u64 << bit_length(t.q - 1)) - 1;
            let mut j = 0;
            while j < self.n {
                let candidate = source.next_u64()? & mask;
                if candidate < t.q {
                    r[j] = candidate;
                    j += 1;
                }
            }
        }
        Ok(out)
    }


    /// Samples coefficients uniform in `[−b, b]`, identical across moduli. Each candidate is masked
    /// to `ceil(log2(2b + 1)) + 1` bits and rejected above `2b`; values above `b` fold to `−(v − b)`.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    #[allow(clippy::cast_possible_wrap)] // v <= 2b < 2^62
    pub(crate) fn sample_bounded(&self, rng: &mut impl CryptoRngCore, b: u64) -> Result<Poly, Error> {
        let bits = position_bits((2 * b + 1) as usize) + 1;
        let mask = (1u64 << bits) - 1;
        let mut source = ByteSource::new(rng, 8 * self.n);
        let mut coeffs = Vec::with_capacity(self.n);
        while coeffs.len() < self.n {
            let v = source.next_u64()? & mask;
            if v > 2 * b {
                continue;
            }
            coeffs.push(if v <= b { v as i64 } else { -((v - b) as i64) });
        }
        Ok(self.from_small(&coeffs))
    }
}


/// Searches for `ψ` with `ψ^n = −1`, which for a prime `q ≡ 1 mod 2n` has order exactly `2n`.
fn primitive_root_2n(q: u64, n: u64) -> Option<u64> {
    let exp = (q - 1) / (2 * n);
    (2..q).map(|g| pow_mod(g, exp, q)).find(|&psi| pow_mod(psi, n, q) == q - 1)
}


/// Pulls bytes from a fallible generator one buffered block at a time.
struct ByteSource<'a, R: CryptoRngCore> {
    rng: &'a mut R,
    buf: Vec<u8>,
    pos: usize,
}


impl<'a, R: CryptoRngCore> ByteSource<'a, R> {
    fn new(rng: &'a mut R, block: usize) -> Self {
        let block = block.max(8);
        Self { rng, buf: vec![0; block], pos: block }
    }

    fn refill(&mut self, need: usize) -> Result<(), Error> {
        if self.pos + need > self.buf.len() {
            self.rng.try_fill_bytes(&mut self.buf).map_err(Error::Rng)?;
            self.pos = 0;
        }
        Ok(())
    }

    fn next_u8(&mut self) -> Result<u8, Error> {
        self.refill(1)?;
        self.pos += 1;
        Ok(self.buf[self.pos - 1])
    }

    fn next_u64(&mut self) -> Result<u64, Error> {
        self.refill(8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_le_bytes(word))
    }
}
