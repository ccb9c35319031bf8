/// If the condition is not met, return the given error. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// Bit length required to express `a` in bits (zero needs zero bits)
pub(crate) const fn bit_length(a: u64) -> u32 { u64::BITS - a.leading_zeros() }


/// Number of bits needed to address `n` positions, i.e. `ceil(log2 n)`.
pub(crate) const fn position_bits(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        bit_length((n - 1) as u64)
    }
}


/// Number of little-endian bytes used to store one coefficient modulo `q`.
pub(crate) const fn coeff_width(q: u64) -> usize { ((bit_length(q - 1) + 7) / 8) as usize }


/// `(a + b) mod q` for reduced inputs
#[inline]
pub(crate) const fn add_mod(a: u64, b: u64, q: u64) -> u64 {
    let s = a + b;
    if s >= q {
        s - q
    } else {
        s
    }
}


/// `(a - b) mod q` for reduced inputs
#[inline]
pub(crate) const fn sub_mod(a: u64, b: u64, q: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        a + q - b
    }
}


/// `(a * b) mod q` via a 128-bit product
#[inline]
#[allow(clippy::cast_possible_truncation)] // result is below q
pub(crate) const fn mul_mod(a: u64, b: u64, q: u64) -> u64 {
    ((a as u128 * b as u128) % q as u128) as u64
}


/// HAC Algorithm 14.76 Right-to-left binary exponentiation mod q.
pub(crate) const fn pow_mod(g: u64, e: u64, q: u64) -> u64 {
    let mut result = 1 % q;
    let mut s = g % q;
    let mut e = e;
    while e != 0 {
        if e & 1 != 0 {
            result = mul_mod(result, s, q);
        };
        e >>= 1;
        if e != 0 {
            s = mul_mod(s, s, q);
        };
    }
    result
}


/// Deterministic Miller-Rabin; the base set below is exact for every `u64`.
pub(crate) fn is_prime(n: u64) -> bool {
    const BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if n < 2 {
        return false;
    }
    for p in BASES {
        if n % p == 0 {
            return n == p;
        }
    }
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for a in BASES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}


/// Centered magnitude `min(x, q - x)` of a reduced residue.
#[inline]
pub(crate) const fn centered_abs(x: u64, q: u64) -> u64 {
    let neg = q - x;
    if x < neg {
        x
    } else {
        neg
    }
}


/// Maps a small signed integer into `[0, q)`.
#[inline]
pub(crate) const fn from_signed(v: i64, q: u64) -> u64 {
    if v < 0 {
        q - v.unsigned_abs()
    } else {
        v.unsigned_abs()
    }
}


/// Reverses the low `bits` bits of `x`.
pub(crate) const fn bit_reverse(x: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        x.reverse_bits() >> (usize::BITS - bits)
    }
}
