//! Pluggable modular-reduction backends.
//!
//! A [`ReductionContext`] is precomputed once for a modulus and then reused
//! for every arithmetic op against that modulus — this is the "reduction
//! backend" knob from the configuration surface (spec §9). The three
//! variants are a closed set (no user-defined backends), so a tagged union
//! with a uniform operation surface is a better fit here than a trait
//! object: callers never need dynamic dispatch across backends picked at
//! runtime from outside this module, just a `match` hidden behind these
//! methods.

use crate::bigint::BigInt;
use crate::error::Result;
use zeroize::Zeroize;

/// Which modular-reduction strategy a [`crate::curve::Curve`] uses for a
/// given modulus.
#[derive(Clone, Debug, Zeroize)]
pub enum ReductionContext {
    /// Ordinary `mod` on every operation; `encode`/`decode` are the
    /// identity.
    None,
    /// Barrett reduction: replaces division with two multiplications by a
    /// precomputed quotient estimate `mu = floor(b^2k / n)`.
    Barrett {
        mu: BigInt,
        #[zeroize(skip)]
        k: usize,
    },
    /// Montgomery reduction: every residue is stored as `x * R mod n`.
    Montgomery {
        n_prime: u64,
        r_mod_n: BigInt,
        r2_mod_n: BigInt,
        #[zeroize(skip)]
        k: usize,
    },
}

impl ReductionContext {
    /// An uninitialized `None` backend; call [`ReductionContext::setup`]
    /// before use if the backend is `Barrett`/`Montgomery`.
    pub fn none() -> Self {
        ReductionContext::None
    }

    pub fn barrett_placeholder() -> Self {
        ReductionContext::Barrett {
            mu: BigInt::zero(),
            k: 0,
        }
    }

    pub fn montgomery_placeholder() -> Self {
        ReductionContext::Montgomery {
            n_prime: 0,
            r_mod_n: BigInt::zero(),
            r2_mod_n: BigInt::zero(),
            k: 0,
        }
    }

    /// Precompute this backend's state for `modulus`. Reusing a context
    /// with a different modulus afterward is undefined (spec §3) — callers
    /// are expected to call `setup` exactly once per curve prime.
    pub fn setup(&mut self, modulus: &BigInt) -> Result<()> {
        match self {
            ReductionContext::None => Ok(()),
            ReductionContext::Barrett { mu, k } => {
                *k = (modulus.bit_length() + 63) / 64;
                let b2k = BigInt::one().shl(128 * *k);
                *mu = b2k.divmod(modulus)?.0;
                Ok(())
            }
            ReductionContext::Montgomery {
                n_prime,
                r_mod_n,
                r2_mod_n,
                k,
            } => {
                *k = (modulus.bit_length() + 63) / 64;
                let base = BigInt::one().shl(64);
                let n0 = BigInt::from_u64(modulus.limb(0));
                let n0_inv = n0.inv_mod(&base)?;
                let neg = base.sub(&n0_inv).modulo(&base)?;
                *n_prime = neg.to_u64();
                let r = BigInt::one().shl(64 * *k);
                *r_mod_n = r.modulo(modulus)?;
                *r2_mod_n = r_mod_n.mul_mod(r_mod_n, modulus)?;
                Ok(())
            }
        }
    }

    /// Apply the residue transform (identity outside Montgomery).
    pub fn encode(&self, x: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        match self {
            ReductionContext::None | ReductionContext::Barrett { .. } => x.modulo(modulus),
            ReductionContext::Montgomery { r_mod_n, .. } => x.mul_mod(r_mod_n, modulus),
        }
    }

    /// Undo the residue transform (identity outside Montgomery).
    pub fn decode(&self, x: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        match self {
            ReductionContext::None | ReductionContext::Barrett { .. } => x.modulo(modulus),
            ReductionContext::Montgomery { n_prime, k, .. } => {
                montgomery_reduce(x, modulus, *n_prime, *k)
            }
        }
    }

    /// Reduce a value already known to be `< modulus^2` (e.g. the output of
    /// an unreduced [`BigInt::mul`]) into the backend's representation.
    pub fn reduce(&self, x: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        match self {
            ReductionContext::None => x.modulo(modulus),
            ReductionContext::Barrett { mu, k } => barrett_reduce(x, modulus, mu, *k),
            ReductionContext::Montgomery { n_prime, k, .. } => {
                montgomery_reduce(x, modulus, *n_prime, *k)
            }
        }
    }

    /// Residues add linearly regardless of backend.
    pub fn add(&self, a: &BigInt, b: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        a.add_mod(b, modulus)
    }

    pub fn sub(&self, a: &BigInt, b: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        a.sub_mod(b, modulus)
    }

    pub fn neg(&self, a: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        a.neg_mod(modulus)
    }

    pub fn mul(&self, a: &BigInt, b: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        self.reduce(&a.mul(b), modulus)
    }

    pub fn sqr(&self, a: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        self.reduce(&a.sqr(), modulus)
    }

    /// Inverse of a residue, staying in residue form.
    pub fn inv(&self, a: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        let plain_inv = a.inv_mod(modulus)?;
        match self {
            ReductionContext::None | ReductionContext::Barrett { .. } => Ok(plain_inv),
            ReductionContext::Montgomery { r2_mod_n, .. } => plain_inv.mul_mod(r2_mod_n, modulus),
        }
    }

    /// `a / b` where both are residues.
    pub fn div(&self, a: &BigInt, b: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        match self {
            ReductionContext::None | ReductionContext::Barrett { .. } => a.div_mod(b, modulus),
            ReductionContext::Montgomery { n_prime, k, .. } => {
                let b_natural = montgomery_reduce(b, modulus, *n_prime, *k)?;
                let inv_natural = b_natural.inv_mod(modulus)?;
                a.mul_mod(&inv_natural, modulus)
            }
        }
    }

    /// Left-to-right square-and-multiply over this backend's `mul`/`sqr`,
    /// per spec §4.2: never branches on anything but the multiply/no-
    /// multiply dichotomy for bits below the MSB.
    pub fn pow(&self, base: &BigInt, exp: &BigInt, modulus: &BigInt) -> Result<BigInt> {
        let blen = exp.bit_length();
        if blen == 0 {
            return self.encode(&BigInt::one(), modulus);
        }
        let mut result = base.clone();
        for i in (0..blen.saturating_sub(1)).rev() {
            result = self.sqr(&result, modulus)?;
            if exp.get_bit(i) {
                result = self.mul(&result, base, modulus)?;
            }
        }
        Ok(result)
    }
}

fn montgomery_reduce(t: &BigInt, n: &BigInt, n_prime: u64, k: usize) -> Result<BigInt> {
    let mut t = t.clone();
    for i in 0..k {
        let ti = t.limb(i);
        let m = ti.wrapping_mul(n_prime);
        t = t.add(&BigInt::from_u64(m).mul(n).shl(64 * i));
    }
    t = t.shr(64 * k);
    if t >= *n {
        t = t.sub(n);
    }
    Ok(t)
}

fn barrett_reduce(x: &BigInt, n: &BigInt, mu: &BigInt, k: usize) -> Result<BigInt> {
    if k == 0 {
        return x.modulo(n);
    }
    let word_mask = |words: usize| BigInt::one().shl(64 * words).sub(&BigInt::one());
    let q1 = x.shr(64 * k.saturating_sub(1));
    let q2 = q1.mul(mu);
    let q3 = q2.shr(64 * (k + 1));
    let r1 = x.and(&word_mask(k + 1));
    let r2 = q3.mul(n).and(&word_mask(k + 1));
    let mut r = if r1 >= r2 {
        r1.sub(&r2)
    } else {
        r1.add(&word_mask(k + 1)).add(&BigInt::one()).sub(&r2)
    };
    while r >= *n {
        r = r.sub(n);
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prime() -> BigInt {
        // secp256r1 field prime
        BigInt::from_hex("ffffffff00000001000000000000000000000000ffffffffffffffffffffff")
            .unwrap()
    }

    #[test]
    fn montgomery_round_trip() {
        let p = prime();
        let mut red = ReductionContext::montgomery_placeholder();
        red.setup(&p).unwrap();
        let x = BigInt::from_u64(123456789);
        let encoded = red.encode(&x, &p).unwrap();
        let decoded = red.decode(&encoded, &p).unwrap();
        assert_eq!(decoded, x.modulo(&p).unwrap());
    }

    #[test]
    fn barrett_round_trip() {
        let p = prime();
        let mut red = ReductionContext::barrett_placeholder();
        red.setup(&p).unwrap();
        let x = BigInt::from_u64(123456789);
        let encoded = red.encode(&x, &p).unwrap();
        let decoded = red.decode(&encoded, &p).unwrap();
        assert_eq!(decoded, x.modulo(&p).unwrap());
    }

    #[test]
    fn montgomery_mul_matches_plain() {
        let p = prime();
        let mut red = ReductionContext::montgomery_placeholder();
        red.setup(&p).unwrap();
        let a = BigInt::from_u64(123456789);
        let b = BigInt::from_u64(987654321);
        let ea = red.encode(&a, &p).unwrap();
        let eb = red.encode(&b, &p).unwrap();
        let eprod = red.mul(&ea, &eb, &p).unwrap();
        let prod = red.decode(&eprod, &p).unwrap();
        assert_eq!(prod, a.mul_mod(&b, &p).unwrap());
    }

    #[test]
    fn barrett_reduce_matches_modulo() {
        let p = prime();
        let mut red = ReductionContext::barrett_placeholder();
        red.setup(&p).unwrap();
        let a = BigInt::from_u64(123456789);
        let b = BigInt::from_u64(987654321);
        let unreduced = a.mul(&b);
        assert_eq!(
            red.reduce(&unreduced, &p).unwrap(),
            unreduced.modulo(&p).unwrap()
        );
    }

    #[test]
    fn montgomery_inverse() {
        let p = prime();
        let mut red = ReductionContext::montgomery_placeholder();
        red.setup(&p).unwrap();
        let a = BigInt::from_u64(123456789);
        let ea = red.encode(&a, &p).unwrap();
        let einv = red.inv(&ea, &p).unwrap();
        let prod = red.mul(&ea, &einv, &p).unwrap();
        assert_eq!(red.decode(&prod, &p).unwrap(), BigInt::one());
    }

    #[test]
    fn pow_matches_bigint_pow_mod() {
        let p = BigInt::from_u64(97);
        let red = ReductionContext::None;
        let base = BigInt::from_u64(5);
        let exp = BigInt::from_u64(13);
        assert_eq!(
            red.pow(&base, &exp, &p).unwrap(),
            base.pow_mod(&exp, &p).unwrap()
        );
    }
}
