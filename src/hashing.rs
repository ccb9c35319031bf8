// This file implements the hashing and pseudorandom sampling: expansion of the public
// parameter `a` and the challenge encoder that binds a compressed commitment to a message

use crate::helpers::{bit_length, ensure};
use crate::params::Profile;
use crate::ring::Ring;
use crate::types::Poly;
use crate::Error;
use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use sha2::{Digest, Sha256};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake128;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;


/// Function `H_128(v)`. Takes a list of byte-slice references and runs them through Shake128.
/// Returns a xof reader for extracting extendable output.
pub(crate) fn h128_xof(v: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake128::default();
    v.iter().for_each(|b| hasher.update(b));
    hasher.finalize_xof()
}


/// Expands the public ring parameter `a` from a 32-byte seed. Component `k` is
/// rejection sampled from `H_128(seed ‖ LE64(k) ‖ LE32(n))`, masking each little-endian 64-bit
/// draw down to `bitlen(q − 1)` bits and keeping draws below `q`.
///
/// **Input**: ring context, seed `ρ ∈ {0,1}^256` <br>
/// **Output**: uniform-looking `a ∈ R_q`, identical for every caller with the same profile.
pub(crate) fn expand_a(ring: &Ring, seed: &[u8; 32]) -> Poly {
    let n = ring.n();
    let mut a = ring.new_poly();

    for (k, (q, a_k)) in ring.moduli().zip(a.0.iter_mut()).enumerate() {
        #[allow(clippy::cast_possible_truncation)] // n <= 2^15
        let mut xof = h128_xof(&[&seed[..], &(k as u64).to_le_bytes(), &(n as u32).to_le_bytes()]);
        let mask = (1u64 << bit_length(q - 1)) - 1;
        let mut j = 0;
        let mut buf = [0u8; 8];
        while j < n {
            xof.read(&mut buf);
            let candidate = u64::from_le_bytes(buf) & mask;
            if candidate < q {
                a_k[j] = candidate;
                j += 1;
            }
        }
    }
    a
}


/// Reads `1 + n_bits` bit draws out of an AES-256-CTR keystream, 64 bits at a time.
/// Each draw takes the sign bit first and then the position bits, low bits first;
/// a fresh word is pulled when the current one cannot cover a whole draw.
struct ChallengeBits {
    cipher: Aes256Ctr,
    word: u64,
    remaining: u32,
}


impl ChallengeBits {
    fn new(key: &[u8; 32], iv: &[u8; 16]) -> Self {
        Self { cipher: Aes256Ctr::new(key.into(), iv.into()), word: 0, remaining: 0 }
    }

    fn draw(&mut self, n_bits: u32) -> (bool, usize) {
        if self.remaining < 1 + n_bits {
            let mut block = [0u8; 8];
            self.cipher.apply_keystream(&mut block);
            self.word = u64::from_le_bytes(block);
            self.remaining = u64::BITS;
        }
        let sign = self.word & 1 == 1;
        self.word >>= 1;
        #[allow(clippy::cast_possible_truncation)] // n_bits <= 15
        let raw = (self.word & ((1 << n_bits) - 1)) as usize;
        self.word >>= n_bits;
        self.remaining -= 1 + n_bits;
        (sign, raw)
    }
}


/// Challenge encoder. Deterministically maps a compressed commitment `w` and a message
/// to a sparse ternary challenge with exactly `min(ω, N)` nonzero coefficients per
/// modulus component; coefficient `+1` is `1` and `−1` is `q − 1`.
///
/// For component `k`: `h_k = SHA-256(LE16(w_k[0..N]) ‖ m)` keys AES-256-CTR with
/// IV `LE64(k) ‖ BE64(k)`. Draws whose position is `≥ N` or already taken are skipped.
///
/// # Errors
/// Returns an error when `w` does not have the profile's shape or a compressed
/// coefficient does not fit 16 bits.
pub(crate) fn encode_challenge(profile: &Profile, w: &Poly, message: &[u8]) -> Result<Poly, Error> {
    let n = profile.n;
    let weight = profile.challenge_weight();
    let n_bits = profile.n_bits();
    ensure!(
        w.0.len() == profile.moduli.len() && w.0.iter().all(|w_k| w_k.len() == n),
        Error::InvariantViolation("commitment shape differs from profile")
    );

    let mut c = vec![vec![0u64; n]; profile.moduli.len()];
    let mut le16 = Vec::with_capacity(2 * n);

    for (k, ((&q, w_k), c_k)) in profile.moduli.iter().zip(&w.0).zip(c.iter_mut()).enumerate() {
        // 1: h_k ← SHA-256(LE16(w_k) ‖ m)
        le16.clear();
        for &x in w_k {
            let x = u16::try_from(x).map_err(|_| Error::InvariantViolation("commitment exceeds 16 bits"))?;
            le16.extend_from_slice(&x.to_le_bytes());
        }
        let mut hasher = Sha256::new();
        Digest::update(&mut hasher, &le16);
        Digest::update(&mut hasher, message);
        let key: [u8; 32] = hasher.finalize().into();

        // 2: IV ← LE64(k) ‖ BE64(k)
        let mut iv = [0u8; 16];
        iv[..8].copy_from_slice(&(k as u64).to_le_bytes());
        iv[8..].copy_from_slice(&(k as u64).to_be_bytes());
        let mut bits = ChallengeBits::new(&key, &iv);

        // 3: place `weight` distinct signed positions
        let mut placed = 0;
        while placed < weight {
            let (positive, pos) = bits.draw(n_bits);
            if pos >= n || c_k[pos] != 0 {
                continue;
            }
            c_k[pos] = if positive { 1 } else { q - 1 };
            placed += 1;
        }
    }
    Ok(Poly(c))
}
