// This file implements the wire codec: dense and sparse polynomial encodings and the
// private key, public key and signature layouts built from them

use crate::error::DecodeError;
use crate::helpers::{coeff_width, ensure, from_signed};
use crate::params::Profile;
use crate::types::Poly;


/// Bytes taken by one dense polynomial: `N · Σ_k coeff_width(q_k)`.
pub(crate) fn dense_len(profile: &Profile) -> usize {
    profile.n * profile.moduli.iter().map(|&q| coeff_width(q)).sum::<usize>()
}


/// Bytes taken by one sparse challenge: two bytes per nonzero coefficient per component.
pub(crate) fn sparse_len(profile: &Profile) -> usize {
    2 * profile.challenge_weight() * profile.moduli.len()
}


/// Private key length: `s ‖ e`.
pub(crate) fn sk_len(profile: &Profile) -> usize { 2 * dense_len(profile) }


/// Public key length: `t`.
pub(crate) fn pk_len(profile: &Profile) -> usize { dense_len(profile) }


/// Signature length: `z1 ‖ z2 ‖ sparse(c)`.
pub(crate) fn sig_len(profile: &Profile) -> usize { 2 * dense_len(profile) + sparse_len(profile) }


/// Appends every coefficient as `coeff_width(q)` little-endian bytes, components in modulus order.
pub(crate) fn dense_encode(profile: &Profile, p: &Poly, out: &mut Vec<u8>) {
    debug_assert_eq!(p.0.len(), profile.moduli.len(), "dense_encode: component count");
    for (p_k, &q) in p.0.iter().zip(&profile.moduli) {
        let width = coeff_width(q);
        debug_assert!(p_k.iter().all(|&x| x < q), "dense_encode: unreduced coefficient");
        for &x in p_k {
            out.extend_from_slice(&x.to_le_bytes()[..width]);
        }
    }
}


/// Inverse of [`dense_encode`]; the slice must be exactly [`dense_len`] bytes.
pub(crate) fn dense_decode(profile: &Profile, bytes: &[u8]) -> Result<Poly, DecodeError> {
    let expected = dense_len(profile);
    ensure!(bytes.len() == expected, DecodeError::Length { expected, actual: bytes.len() });

    let n = profile.n;
    let mut out = Vec::with_capacity(profile.moduli.len());
    let mut start = 0;
    for (k, &q) in profile.moduli.iter().enumerate() {
        let width = coeff_width(q);
        let mut p_k = Vec::with_capacity(n);
        for (i, chunk) in bytes[start..start + n * width].chunks_exact(width).enumerate() {
            let mut le = [0u8; 8];
            le[..width].copy_from_slice(chunk);
            let value = u64::from_le_bytes(le);
            ensure!(
                value < q,
                DecodeError::CoefficientOutOfRange { index: k * n + i, value, modulus: q }
            );
            p_k.push(value);
        }
        start += n * width;
        out.push(p_k);
    }
    debug_assert_eq!(start, bytes.len(), "dense_decode: length miscalculation");
    Ok(Poly(out))
}


/// Appends the nonzero positions of a ternary challenge as 16-bit little-endian entries in
/// ascending order: `v < N` marks `+1` at `v`, `N ≤ v < 2N` marks `−1` at `v − N`.
pub(crate) fn sparse_encode(profile: &Profile, c: &Poly, out: &mut Vec<u8>) {
    let n = profile.n;
    for (c_k, &q) in c.0.iter().zip(&profile.moduli) {
        debug_assert_eq!(
            c_k.iter().filter(|&&x| x != 0).count(),
            profile.challenge_weight(),
            "sparse_encode: wrong weight"
        );
        for (pos, &x) in c_k.iter().enumerate() {
            if x == 0 {
                continue;
            }
            debug_assert!(x == 1 || x == q - 1, "sparse_encode: not ternary");
            let v = if x == 1 { pos } else { pos + n };
            #[allow(clippy::cast_possible_truncation)] // 2n <= 2^16
            out.extend_from_slice(&(v as u16).to_le_bytes());
        }
    }
}


/// Inverse of [`sparse_encode`]; rejects entries `≥ 2N` and repeated positions.
pub(crate) fn sparse_decode(profile: &Profile, bytes: &[u8]) -> Result<Poly, DecodeError> {
    let expected = sparse_len(profile);
    ensure!(bytes.len() == expected, DecodeError::Length { expected, actual: bytes.len() });

    let n = profile.n;
    let weight = profile.challenge_weight();
    let mut out = vec![vec![0u64; n]; profile.moduli.len()];
    for ((c_k, &q), entries) in out.iter_mut().zip(&profile.moduli).zip(bytes.chunks_exact(2 * weight)) {
        for entry in entries.chunks_exact(2) {
            let value = u16::from_le_bytes([entry[0], entry[1]]);
            let v = usize::from(value);
            ensure!(v < 2 * n, DecodeError::SparseIndexOutOfRange { value });
            let (position, coeff) = if v < n { (v, 1) } else { (v - n, q - 1) };
            ensure!(c_k[position] == 0, DecodeError::DuplicateSparseIndex { position });
            c_k[position] = coeff;
        }
    }
    Ok(Poly(out))
}


/// Private key layout `dense(s) ‖ dense(e)`.
pub(crate) fn sk_encode(profile: &Profile, s: &Poly, e: &Poly) -> Vec<u8> {
    let mut out = Vec::with_capacity(sk_len(profile));
    dense_encode(profile, s, &mut out);
    dense_encode(profile, e, &mut out);
    debug_assert_eq!(out.len(), sk_len(profile), "sk_encode: length miscalculation");
    out
}


/// Inverse of [`sk_encode`]. Beyond the dense checks, every coefficient must be ternary
/// and agree across all modulus components.
pub(crate) fn sk_decode(profile: &Profile, bytes: &[u8]) -> Result<(Poly, Poly), DecodeError> {
    let expected = sk_len(profile);
    ensure!(bytes.len() == expected, DecodeError::Length { expected, actual: bytes.len() });
    let (s_bytes, e_bytes) = bytes.split_at(dense_len(profile));
    let s = dense_decode(profile, s_bytes)?;
    check_ternary(profile, &s, 0)?;
    let e = dense_decode(profile, e_bytes)?;
    check_ternary(profile, &e, profile.n * profile.moduli.len())?;
    Ok((s, e))
}


fn check_ternary(profile: &Profile, p: &Poly, base: usize) -> Result<(), DecodeError> {
    let n = profile.n;
    let q0 = profile.moduli[0];
    for i in 0..n {
        let x = p.0[0][i];
        let signed = match x {
            0 => 0,
            1 => 1,
            _ if x == q0 - 1 => -1,
            _ => return Err(DecodeError::NotTernary { index: base + i }),
        };
        for (p_k, &q) in p.0.iter().zip(&profile.moduli).skip(1) {
            ensure!(p_k[i] == from_signed(signed, q), DecodeError::InconsistentResidues { index: base + i });
        }
    }
    Ok(())
}


/// Public key layout `dense(t)`.
pub(crate) fn pk_encode(profile: &Profile, t: &Poly) -> Vec<u8> {
    let mut out = Vec::with_capacity(pk_len(profile));
    dense_encode(profile, t, &mut out);
    out
}


/// Inverse of [`pk_encode`].
pub(crate) fn pk_decode(profile: &Profile, bytes: &[u8]) -> Result<Poly, DecodeError> {
    dense_decode(profile, bytes)
}


/// Signature layout `dense(z1) ‖ dense(z2) ‖ sparse(c)`.
pub(crate) fn sig_encode(profile: &Profile, z1: &Poly, z2: &Poly, c: &Poly) -> Vec<u8> {
    let mut out = Vec::with_capacity(sig_len(profile));
    dense_encode(profile, z1, &mut out);
    dense_encode(profile, z2, &mut out);
    sparse_encode(profile, c, &mut out);
    debug_assert_eq!(out.len(), sig_len(profile), "sig_encode: length miscalculation");
    out
}


/// Inverse of [`sig_encode`].
pub(crate) fn sig_decode(profile: &Profile, bytes: &[u8]) -> Result<(Poly, Poly, Poly), DecodeError> {
    let expected = sig_len(profile);
    ensure!(bytes.len() == expected, DecodeError::Length { expected, actual: bytes.len() });
    let dense = dense_len(profile);
    let z1 = dense_decode(profile, &bytes[..dense])?;
    let z2 = dense_decode(profile, &bytes[dense..2 * dense])?;
    let c = sparse_decode(profile, &bytes[2 * dense..])?;
    Ok((z1, z2, c))
}
