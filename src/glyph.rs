// This file implements the core GLYPH algorithms: key generation, one signing attempt
// and verification

use crate::hashing::encode_challenge;
use crate::params::Profile;
use crate::types::{Glyph, Poly, PrivateKey, PublicKey, Signature};
use crate::Error;
use rand_core::CryptoRngCore;


/// Key generation. Samples ternary `s` and `e` and derives `t = a·s + e`.
///
/// **Input**: profile context, random number generator <br>
/// **Output**: public key `t` and private key `(s, e)`.
///
/// # Errors
/// Returns an error when the random number generator fails.
pub(crate) fn key_gen(
    glyph: &Glyph, rng: &mut impl CryptoRngCore,
) -> Result<(PublicKey, PrivateKey), Error> {
    // 1: s, e ← ternary
    let s = glyph.ring().sample_ternary(rng)?;
    let e = glyph.ring().sample_ternary(rng)?;

    // 2: t ← a·s + e
    let sk = private_key(glyph, s, e);
    let pk = public_from_private(&sk);
    Ok((pk, sk))
}


/// Assembles a private key, caching the NTT forms of `s` and `e`.
pub(crate) fn private_key(glyph: &Glyph, s: Poly, e: Poly) -> PrivateKey {
    let ring = glyph.ring();
    let s_hat = ring.ntt(&s);
    let e_hat = ring.ntt(&e);
    PrivateKey { glyph: glyph.clone(), s, e, s_hat, e_hat }
}


/// Recomputes `t = a·s + e` from a private key.
pub(crate) fn public_from_private(sk: &PrivateKey) -> PublicKey {
    let ring = sk.glyph.ring();
    let t_hat = ring.add(&ring.mul_pointwise(sk.glyph.a_hat(), &sk.s_hat), &sk.e_hat);
    let t = ring.inv_ntt(&t_hat);
    PublicKey { glyph: sk.glyph.clone(), t, t_hat }
}


/// Assembles a public key from a decoded `t`.
pub(crate) fn public_key(glyph: &Glyph, t: Poly) -> PublicKey {
    let t_hat = glyph.ring().ntt(&t);
    PublicKey { glyph: glyph.clone(), t, t_hat }
}


/// Commitment compression: every residue divided by `2(B − ω) + 1`.
pub(crate) fn kfloor(profile: &Profile, w: &Poly) -> Poly {
    let divisor = profile.kfloor_divisor();
    Poly(w.0.iter().map(|w_k| w_k.iter().map(|&x| x / divisor).collect()).collect())
}


/// One signing attempt. Returns `Ok(None)` when the rejection test discards the
/// candidate, leaving retry policy to the caller.
///
/// # Errors
/// Returns an error when the random number generator fails; propagates internal errors.
pub(crate) fn sign_attempt(
    sk: &PrivateKey, message: &[u8], rng: &mut impl CryptoRngCore,
) -> Result<Option<Signature>, Error> {
    let glyph = &sk.glyph;
    let (profile, ring) = (glyph.profile(), glyph.ring());

    // 1: y1, y2 ← uniform in [−B, B]
    let y1_hat = ring.ntt(&ring.sample_bounded(rng, profile.b)?);
    let y2_hat = ring.ntt(&ring.sample_bounded(rng, profile.b)?);

    // 2: w ← a·y1 + y2
    let w = ring.inv_ntt(&ring.add(&ring.mul_pointwise(glyph.a_hat(), &y1_hat), &y2_hat));

    // 3: c ← Encode(kfloor(w), m)
    let c = encode_challenge(profile, &kfloor(profile, &w), message)?;
    let c_hat = ring.ntt(&c);

    // 4: z1 ← s·c + y1, z2 ← e·c + y2
    let z1 = ring.inv_ntt(&ring.add(&ring.mul_pointwise(&sk.s_hat, &c_hat), &y1_hat));
    let z2 = ring.inv_ntt(&ring.add(&ring.mul_pointwise(&sk.e_hat, &c_hat), &y2_hat));

    // 5: reject unless ‖z1‖∞, ‖z2‖∞ ≤ B − ω
    let bound = profile.z_bound();
    if ring.max_centered(&z1) > bound || ring.max_centered(&z2) > bound {
        return Ok(None);
    }
    Ok(Some(Signature { glyph: glyph.clone(), z1, z2, c }))
}


/// Verification. Checks profile agreement, shapes and the response bound, then recomputes
/// `w' = a·z1 + z2 − t·c` and accepts iff `Encode(kfloor(w'), m) = c`.
pub(crate) fn verify(pk: &PublicKey, message: &[u8], sig: &Signature) -> bool {
    let glyph = &pk.glyph;
    let (profile, ring) = (glyph.profile(), glyph.ring());

    // 1: same profile, well-formed operands, responses within bound
    if !glyph.same_profile(&sig.glyph) {
        return false;
    }
    if ![&sig.z1, &sig.z2, &sig.c].iter().all(|p| ring.is_well_formed(p)) {
        return false;
    }
    let bound = profile.z_bound();
    if ring.max_centered(&sig.z1) > bound || ring.max_centered(&sig.z2) > bound {
        return false;
    }

    // 2: w' ← a·z1 + z2 − t·c
    let az1 = ring.mul_pointwise(glyph.a_hat(), &ring.ntt(&sig.z1));
    let tc = ring.mul_pointwise(&pk.t_hat, &ring.ntt(&sig.c));
    let w = ring.inv_ntt(&ring.sub(&ring.add(&az1, &ring.ntt(&sig.z2)), &tc));

    // 3: accept iff Encode(kfloor(w'), m) = c
    match encode_challenge(profile, &kfloor(profile, &w), message) {
        Ok(c) => ring.equal(&c, &sig.c),
        Err(_) => false,
    }
}
