//! Arbitrary-precision integers with an explicit sign.
//!
//! `BigInt` stores its magnitude as little-endian base-2^64 limbs in a
//! `Vec<u64>`, normalized so the top limb is always nonzero (zero itself is
//! the empty vector). This is the one component every other module in the
//! crate is built on: [`crate::reduction`] encodes/decodes residues of it,
//! [`crate::recoding`] turns it into digit sequences, and
//! [`crate::point`]/[`crate::formula`] carry it as coordinates.

use crate::error::{Error, Result};
use core::cmp::Ordering;
use core::fmt;
use rand_core::RngCore;
use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

/// An arbitrary-precision signed integer.
///
/// Operations are total for representable inputs; the only failure modes
/// are allocation failure, malformed textual/binary input, and the
/// genuinely undefined (division by zero, inverse of a non-unit).
#[derive(Clone, Zeroize)]
pub struct BigInt {
    negative: bool,
    /// Little-endian base-2^64 magnitude, no trailing zero limb. Empty
    /// means zero, in which case `negative` is always `false`.
    mag: Vec<u64>,
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt(\"{}\")", self.to_hex())
    }
}

fn trim(mut v: Vec<u64>) -> Vec<u64> {
    while v.last() == Some(&0) {
        v.pop();
    }
    v
}

fn cmp_mag(a: &[u64], b: &[u64]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for i in (0..a.len()).rev() {
        if a[i] != b[i] {
            return a[i].cmp(&b[i]);
        }
    }
    Ordering::Equal
}

fn add_mag(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
    let mut carry: u128 = 0;
    for i in 0..a.len().max(b.len()) {
        let x = *a.get(i).unwrap_or(&0) as u128;
        let y = *b.get(i).unwrap_or(&0) as u128;
        let s = x + y + carry;
        out.push(s as u64);
        carry = s >> 64;
    }
    if carry != 0 {
        out.push(carry as u64);
    }
    trim(out)
}

/// Requires `a >= b`.
fn sub_mag(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut out = Vec::with_capacity(a.len());
    let mut borrow: i128 = 0;
    for i in 0..a.len() {
        let x = a[i] as i128;
        let y = *b.get(i).unwrap_or(&0) as i128;
        let mut d = x - y - borrow;
        if d < 0 {
            d += 1i128 << 64;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out.push(d as u64);
    }
    trim(out)
}

fn mul_mag(a: &[u64], b: &[u64]) -> Vec<u64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0u64; a.len() + b.len()];
    for (i, &ai) in a.iter().enumerate() {
        let mut carry: u128 = 0;
        for (j, &bj) in b.iter().enumerate() {
            let p = (ai as u128) * (bj as u128) + out[i + j] as u128 + carry;
            out[i + j] = p as u64;
            carry = p >> 64;
        }
        let mut k = i + b.len();
        while carry != 0 {
            let s = out[k] as u128 + carry;
            out[k] = s as u64;
            carry = s >> 64;
            k += 1;
        }
    }
    trim(out)
}

fn bit_length_mag(a: &[u64]) -> usize {
    match a.last() {
        None => 0,
        Some(&top) => (a.len() - 1) * 64 + (64 - top.leading_zeros() as usize),
    }
}

fn get_bit_mag(a: &[u64], which: usize) -> bool {
    let limb = which / 64;
    let bit = which % 64;
    match a.get(limb) {
        None => false,
        Some(&v) => (v >> bit) & 1 == 1,
    }
}

fn set_bit_mag(a: &mut Vec<u64>, which: usize) {
    let limb = which / 64;
    let bit = which % 64;
    if a.len() <= limb {
        a.resize(limb + 1, 0);
    }
    a[limb] |= 1u64 << bit;
}

fn shl_mag(a: &[u64], amount: usize) -> Vec<u64> {
    if a.is_empty() || amount == 0 {
        return a.to_vec();
    }
    let limb_shift = amount / 64;
    let bit_shift = amount % 64;
    let mut out = vec![0u64; a.len() + limb_shift + 1];
    for (i, &v) in a.iter().enumerate() {
        let idx = i + limb_shift;
        if bit_shift == 0 {
            out[idx] |= v;
        } else {
            out[idx] |= v << bit_shift;
            out[idx + 1] |= v >> (64 - bit_shift);
        }
    }
    trim(out)
}

fn shr_mag(a: &[u64], amount: usize) -> Vec<u64> {
    let limb_shift = amount / 64;
    let bit_shift = amount % 64;
    if limb_shift >= a.len() {
        return Vec::new();
    }
    let src = &a[limb_shift..];
    let mut out = vec![0u64; src.len()];
    for i in 0..src.len() {
        let lo = src[i] >> bit_shift;
        let hi = if bit_shift == 0 || i + 1 >= src.len() {
            0
        } else {
            src[i + 1] << (64 - bit_shift)
        };
        out[i] = lo | hi;
    }
    trim(out)
}

fn and_mag(a: &[u64], b: &[u64]) -> Vec<u64> {
    let len = a.len().min(b.len());
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        out.push(a[i] & b[i]);
    }
    trim(out)
}

/// Binary long division, bit-serial. Simple to verify correct; this crate
/// favors that over a faster Knuth-style estimate-and-correct division
/// since scalar-mult workloads call it rarely (modular inverse, base
/// conversion) compared to `mul`/`sqr`.
fn divmod_mag(a: &[u64], b: &[u64]) -> Result<(Vec<u64>, Vec<u64>)> {
    if b.is_empty() {
        return Err(Error::InvalidInput);
    }
    if cmp_mag(a, b) == Ordering::Less {
        return Ok((Vec::new(), a.to_vec()));
    }
    let bits = bit_length_mag(a);
    let mut rem: Vec<u64> = Vec::new();
    let mut quot: Vec<u64> = Vec::new();
    for i in (0..bits).rev() {
        rem = shl_mag(&rem, 1);
        if get_bit_mag(a, i) {
            if rem.is_empty() {
                rem.push(1);
            } else {
                rem[0] |= 1;
            }
        }
        if cmp_mag(&rem, b) != Ordering::Less {
            rem = sub_mag(&rem, b);
            set_bit_mag(&mut quot, i);
        }
    }
    Ok((trim(quot), trim(rem)))
}

impl BigInt {
    /// The value zero.
    pub fn zero() -> Self {
        BigInt {
            negative: false,
            mag: Vec::new(),
        }
    }

    /// The value one.
    pub fn one() -> Self {
        BigInt::from_u64(1)
    }

    /// Construct from a native unsigned integer.
    pub fn from_u64(value: u64) -> Self {
        BigInt {
            negative: false,
            mag: trim(vec![value]),
        }
    }

    /// Parse a big-endian byte buffer as a nonnegative magnitude.
    pub fn from_bytes_be(data: &[u8]) -> Self {
        let mut mag = vec![0u64; (data.len() + 7) / 8];
        for (i, &byte) in data.iter().rev().enumerate() {
            mag[i / 8] |= (byte as u64) << ((i % 8) * 8);
        }
        BigInt {
            negative: false,
            mag: trim(mag),
        }
    }

    /// Number of bytes required by [`BigInt::to_bytes_be`].
    pub fn byte_len(&self) -> usize {
        (self.bit_length() + 7) / 8
    }

    /// Big-endian minimal-length encoding of the magnitude (ignores sign).
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let len = self.byte_len();
        let mut out = vec![0u8; len];
        for i in 0..len {
            let shift = i * 8;
            let limb = shift / 64;
            let bit = shift % 64;
            let v = *self.mag.get(limb).unwrap_or(&0);
            out[len - 1 - i] = (v >> bit) as u8;
        }
        out
    }

    /// Big-endian encoding zero-padded on the left to exactly `size` bytes.
    pub fn to_bytes_be_padded(&self, size: usize) -> Result<Vec<u8>> {
        let natural = self.to_bytes_be();
        if natural.len() > size {
            return Err(Error::BufferTooSmall);
        }
        let mut out = vec![0u8; size];
        out[size - natural.len()..].copy_from_slice(&natural);
        Ok(out)
    }

    /// Parse a hexadecimal string (optionally prefixed with `0x`/`-`).
    pub fn from_hex(s: &str) -> Result<Self> {
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidInput);
        }
        let padded = if s.len() % 2 == 1 {
            format!("0{s}")
        } else {
            s.to_string()
        };
        let bytes = (0..padded.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&padded[i..i + 2], 16).map_err(|_| Error::InvalidInput))
            .collect::<Result<Vec<u8>>>()?;
        let mut out = BigInt::from_bytes_be(&bytes);
        out.negative = negative && !out.is_zero();
        Ok(out)
    }

    /// Render as a lowercase hex string with no prefix, `"0"` for zero.
    pub fn to_hex(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut s = String::new();
        if self.negative {
            s.push('-');
        }
        let bytes = self.to_bytes_be();
        for b in bytes {
            s.push_str(&format!("{b:02x}"));
        }
        s
    }

    /// Parse a nonnegative decimal string.
    pub fn from_dec(s: &str) -> Result<Self> {
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidInput);
        }
        let mut acc = BigInt::zero();
        let ten = BigInt::from_u64(10);
        for c in s.chars() {
            acc = acc.mul(&ten);
            acc = acc.add(&BigInt::from_u64(c.to_digit(10).unwrap() as u64));
        }
        acc.negative = negative && !acc.is_zero();
        Ok(acc)
    }

    /// Truncate to a native `u64`, taking the low 64 bits of the magnitude.
    pub fn to_u64(&self) -> u64 {
        *self.mag.first().unwrap_or(&0)
    }

    pub fn is_zero(&self) -> bool {
        self.mag.is_empty()
    }

    pub fn is_one(&self) -> bool {
        !self.negative && self.mag == [1]
    }

    /// `true` if strictly negative.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// -1, 0, or 1.
    pub fn sign(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    pub fn bit_length(&self) -> usize {
        bit_length_mag(&self.mag)
    }

    /// The `i`-th 64-bit magnitude limb (0 = least significant), or 0 past
    /// the end. Used by [`crate::reduction`]'s Montgomery backend, which
    /// needs limb-at-a-time access for REDC.
    pub(crate) fn limb(&self, i: usize) -> u64 {
        *self.mag.get(i).unwrap_or(&0)
    }

    /// Read bit `which` (0 = least significant) of the magnitude.
    pub fn get_bit(&self, which: usize) -> bool {
        get_bit_mag(&self.mag, which)
    }

    pub fn shl(&self, amount: usize) -> Self {
        BigInt {
            negative: self.negative,
            mag: shl_mag(&self.mag, amount),
        }
    }

    pub fn shr(&self, amount: usize) -> Self {
        let mag = shr_mag(&self.mag, amount);
        let negative = self.negative && !mag.is_empty();
        BigInt { negative, mag }
    }

    /// Bitwise AND of the (nonnegative) magnitudes.
    pub fn and(&self, other: &Self) -> Self {
        BigInt {
            negative: false,
            mag: and_mag(&self.mag, &other.mag),
        }
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        cmp_mag(&self.mag, &other.mag)
    }

    /// Equality up to sign-of-zero (zero is never negative).
    pub fn equals(&self, other: &Self) -> bool {
        self.negative == other.negative && self.mag == other.mag
    }

    pub fn neg(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        BigInt {
            negative: !self.negative,
            mag: self.mag.clone(),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.negative == other.negative {
            return BigInt {
                negative: self.negative,
                mag: add_mag(&self.mag, &other.mag),
            };
        }
        match self.cmp_magnitude(other) {
            Ordering::Equal => BigInt::zero(),
            Ordering::Greater => BigInt {
                negative: self.negative,
                mag: sub_mag(&self.mag, &other.mag),
            },
            Ordering::Less => BigInt {
                negative: other.negative,
                mag: sub_mag(&other.mag, &self.mag),
            },
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mag = mul_mag(&self.mag, &other.mag);
        let negative = !mag.is_empty() && (self.negative != other.negative);
        BigInt { negative, mag }
    }

    pub fn sqr(&self) -> Self {
        self.mul(self)
    }

    /// Truncating division and remainder, Euclidean on the magnitude
    /// (remainder always nonnegative, matching `bn_mod`'s usage here).
    pub fn divmod(&self, other: &Self) -> Result<(Self, Self)> {
        if other.is_zero() {
            return Err(Error::InvalidInput);
        }
        let (q, r) = divmod_mag(&self.mag, &other.mag)?;
        let mut rem = BigInt {
            negative: false,
            mag: r,
        };
        let mut quot = BigInt {
            negative: self.negative != other.negative,
            mag: q,
        };
        if self.negative && !rem.is_zero() {
            // adjust toward Euclidean remainder in [0, |other|)
            rem = BigInt {
                negative: false,
                mag: sub_mag(&other.mag, &rem.mag),
            };
            quot = quot.sub(&BigInt::one());
        }
        Ok((quot, rem))
    }

    /// `self mod m`, always in `[0, m)` for `m > 0`.
    pub fn modulo(&self, m: &Self) -> Result<Self> {
        Ok(self.divmod(m)?.1)
    }

    // ---- modular arithmetic -------------------------------------------

    pub fn add_mod(&self, other: &Self, m: &Self) -> Result<Self> {
        self.add(other).modulo(m)
    }

    pub fn sub_mod(&self, other: &Self, m: &Self) -> Result<Self> {
        self.sub(other).modulo(m)
    }

    pub fn neg_mod(&self, m: &Self) -> Result<Self> {
        self.neg().modulo(m)
    }

    pub fn mul_mod(&self, other: &Self, m: &Self) -> Result<Self> {
        self.mul(other).modulo(m)
    }

    pub fn sqr_mod(&self, m: &Self) -> Result<Self> {
        self.sqr().modulo(m)
    }

    /// Extended Euclidean algorithm: returns `(g, x, y)` with `a*x + b*y = g`.
    fn egcd(a: &Self, b: &Self) -> (Self, Self, Self) {
        if b.is_zero() {
            return (a.clone(), BigInt::one(), BigInt::zero());
        }
        // divmod on magnitudes only (a, b both nonnegative by construction
        // of the callers below).
        let (q, r) = a
            .divmod(b)
            .expect("egcd divisor checked nonzero by caller loop");
        let (g, x1, y1) = Self::egcd(b, &r);
        let y = x1.sub(&q.mul(&y1));
        (g, y1, y)
    }

    /// Modular inverse of `self` mod `m`. Fails with [`Error::InvalidInput`]
    /// when `gcd(self, m) != 1`.
    pub fn inv_mod(&self, m: &Self) -> Result<Self> {
        if m.is_zero() {
            return Err(Error::InvalidInput);
        }
        let a = self.modulo(m)?;
        if a.is_zero() {
            return Err(Error::InvalidInput);
        }
        let (g, x, _y) = Self::egcd(&a, m);
        if !g.is_one() {
            return Err(Error::InvalidInput);
        }
        x.modulo(m)
    }

    pub fn div_mod(&self, other: &Self, m: &Self) -> Result<Self> {
        self.mul_mod(&other.inv_mod(m)?, m)
    }

    /// Left-to-right square-and-multiply, `self^exp mod m`.
    pub fn pow_mod(&self, exp: &Self, m: &Self) -> Result<Self> {
        if exp.is_zero() {
            return Ok(BigInt::one().modulo(m)?);
        }
        let blen = exp.bit_length();
        let mut result = self.modulo(m)?;
        for i in (0..blen.saturating_sub(1)).rev() {
            result = result.sqr_mod(m)?;
            if exp.get_bit(i) {
                result = result.mul_mod(self, m)?;
            }
        }
        Ok(result)
    }

    // ---- randomness -----------------------------------------------------

    /// Draw `⌈bitlen(n)/64⌉+1` limbs, mask to `bitlen(n)+1` bits, and
    /// repeat until the draw is `< n`. Exposed separately from
    /// [`BigInt::rand_mod_reduce`] because the two have different bias and
    /// side-channel profiles (spec §4.1).
    pub fn rand_mod_sample(n: &Self, rng: &mut dyn RngCore) -> Result<Self> {
        if n.is_zero() {
            return Err(Error::InvalidInput);
        }
        let mod_len = n.bit_length();
        let limbs = mod_len / 64 + 1;
        let mask_bits = mod_len + 1;
        const MAX_ITER: usize = 10_000;
        for _ in 0..MAX_ITER {
            let mut candidate = BigInt {
                negative: false,
                mag: trim(random_limbs(limbs, rng)),
            };
            candidate = candidate.and(&BigInt::one().shl(mask_bits).sub(&BigInt::one()));
            if candidate.cmp_magnitude(n) == Ordering::Less {
                return Ok(candidate);
            }
        }
        Err(Error::MaxIterations)
    }

    /// Draw `⌈bitlen(n)/64⌉+2` limbs and reduce mod `n`.
    pub fn rand_mod_reduce(n: &Self, rng: &mut dyn RngCore) -> Result<Self> {
        if n.is_zero() {
            return Err(Error::InvalidInput);
        }
        let mod_len = n.bit_length();
        let limbs = mod_len / 64 + 2;
        let raw = BigInt {
            negative: false,
            mag: trim(random_limbs(limbs, rng)),
        };
        raw.modulo(n)
    }
}

fn random_limbs(count: usize, rng: &mut dyn RngCore) -> Vec<u64> {
    let mut bytes = vec![0u8; count * 8];
    rng.fill_bytes(&mut bytes);
    bytes
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().expect("chunk of 8 bytes")))
        .collect()
}

impl PartialEq for BigInt {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}
impl Eq for BigInt {}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl BigInt {
    /// Selects `a` if `choice` is true, else `b`, without branching on
    /// `choice` itself — used by [`crate::scalarmult`]'s ladder steps so the
    /// state swap doesn't leak the scalar bit through a data-dependent
    /// branch. Limb-by-limb, padding the shorter magnitude with zero limbs
    /// so both operands are selected over the same width. Not a
    /// `subtle::ConditionallySelectable` impl: that trait requires `Copy`,
    /// which a heap-backed `Vec<u64>` magnitude can't offer, so this composes
    /// `subtle`'s per-limb primitive directly instead.
    pub fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let len = a.mag.len().max(b.mag.len());
        let mut mag = Vec::with_capacity(len);
        for i in 0..len {
            let ai = a.mag.get(i).copied().unwrap_or(0);
            let bi = b.mag.get(i).copied().unwrap_or(0);
            mag.push(u64::conditional_select(&ai, &bi, choice));
        }
        let negative = u8::conditional_select(&(a.negative as u8), &(b.negative as u8), choice) != 0;
        BigInt {
            negative,
            mag: trim(mag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic xorshift64* RNG, good enough to drive property tests
    /// without pulling in an RNG dependency purely for `#[cfg(test)]` code.
    struct XorShiftRng(u64);
    impl RngCore for XorShiftRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }
        fn next_u64(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let mut chunks = dest.chunks_exact_mut(8);
            for chunk in &mut chunks {
                chunk.copy_from_slice(&self.next_u64().to_le_bytes());
            }
            let rem = chunks.into_remainder();
            if !rem.is_empty() {
                let bytes = self.next_u64().to_le_bytes();
                rem.copy_from_slice(&bytes[..rem.len()]);
            }
        }
    }

    fn rng() -> impl RngCore {
        XorShiftRng(0x9e3779b97f4a7c15)
    }

    #[test]
    fn round_trip_bin() {
        let b = BigInt::from_bytes_be(&[0x01, 0x02, 0x03]);
        assert_eq!(b.to_bytes_be(), vec![0x01, 0x02, 0x03]);
        let with_leading_zero = BigInt::from_bytes_be(&[0x00, 0x01]);
        assert_eq!(with_leading_zero.to_bytes_be(), vec![0x01]);
    }

    #[test]
    fn round_trip_hex() {
        let b = BigInt::from_hex("1a2b3c").unwrap();
        assert_eq!(BigInt::from_hex(&b.to_hex()).unwrap(), b);
    }

    #[test]
    fn round_trip_dec() {
        let b = BigInt::from_dec("123456789123456789123456789").unwrap();
        assert_eq!(b.to_hex(), BigInt::from_bytes_be(&b.to_bytes_be()).to_hex());
    }

    #[test]
    fn add_sub_mul() {
        let a = BigInt::from_u64(123456789);
        let b = BigInt::from_u64(987654321);
        assert_eq!(a.add(&b).to_u64(), 123456789u64 + 987654321);
        assert_eq!(b.sub(&a).to_u64(), 987654321u64 - 123456789);
        assert_eq!(a.mul(&b).to_u64(), 123456789u64 * 987654321);
    }

    #[test]
    fn big_multiply_matches_shift_add() {
        let a = BigInt::from_hex("ffffffffffffffffffffffffffffffff").unwrap();
        let b = BigInt::from_u64(2);
        assert_eq!(a.mul(&b), a.shl(1));
    }

    #[test]
    fn divmod_basic() {
        let a = BigInt::from_u64(100);
        let b = BigInt::from_u64(7);
        let (q, r) = a.divmod(&b).unwrap();
        assert_eq!(q.to_u64(), 14);
        assert_eq!(r.to_u64(), 2);
    }

    #[test]
    fn modular_inverse() {
        let p = BigInt::from_u64(97);
        for x in 1..97u64 {
            let a = BigInt::from_u64(x);
            let inv = a.inv_mod(&p).unwrap();
            assert!(a.mul_mod(&inv, &p).unwrap().is_one());
        }
    }

    #[test]
    fn inverse_of_zero_fails() {
        let p = BigInt::from_u64(97);
        assert!(BigInt::zero().inv_mod(&p).is_err());
    }

    #[test]
    fn pow_mod_matches_repeated_mul() {
        let base = BigInt::from_u64(5);
        let exp = BigInt::from_u64(13);
        let m = BigInt::from_u64(97);
        let mut expect = BigInt::one();
        for _ in 0..13 {
            expect = expect.mul_mod(&base, &m).unwrap();
        }
        assert_eq!(base.pow_mod(&exp, &m).unwrap(), expect);
    }

    #[test]
    fn modular_laws_random() {
        let m = BigInt::from_hex("fffffffeffffffffffffffffffffffff000000000000000000000001").unwrap();
        let mut r = rng();
        for _ in 0..50 {
            let a = BigInt::rand_mod_sample(&m, &mut r).unwrap();
            let b = BigInt::rand_mod_sample(&m, &mut r).unwrap();
            let c = BigInt::rand_mod_sample(&m, &mut r).unwrap();
            assert_eq!(
                a.add_mod(&b, &m).unwrap(),
                b.add_mod(&a, &m).unwrap()
            );
            let lhs = a.mul_mod(&b.add_mod(&c, &m).unwrap(), &m).unwrap();
            let rhs = a
                .mul_mod(&b, &m)
                .unwrap()
                .add_mod(&a.mul_mod(&c, &m).unwrap(), &m)
                .unwrap();
            assert_eq!(lhs, rhs);
        }
    }

    #[test]
    fn bit_length_and_get_bit() {
        let b = BigInt::from_u64(0b1011);
        assert_eq!(b.bit_length(), 4);
        assert!(b.get_bit(0));
        assert!(b.get_bit(1));
        assert!(!b.get_bit(2));
        assert!(b.get_bit(3));
        assert!(!b.get_bit(4));
    }

    #[test]
    fn rand_below_modulus() {
        let m = BigInt::from_u64(97);
        let mut r = rng();
        for _ in 0..200 {
            let x = BigInt::rand_mod_sample(&m, &mut r).unwrap();
            assert!(x < m);
            let y = BigInt::rand_mod_reduce(&m, &mut r).unwrap();
            assert!(y < m);
        }
    }

    #[test]
    fn conditional_select_picks_either_operand() {
        let a = BigInt::from_hex("ffffffffffffffff00000001").unwrap();
        let b = BigInt::from_u64(42);
        assert_eq!(BigInt::conditional_select(&a, &b, Choice::from(1)), a);
        assert_eq!(BigInt::conditional_select(&a, &b, Choice::from(0)), b);
    }

    #[test]
    fn conditional_select_picks_negative_operand() {
        let a = BigInt::from_u64(5).neg();
        let b = BigInt::from_u64(5);
        assert_eq!(BigInt::conditional_select(&a, &b, Choice::from(1)), a);
        assert_eq!(BigInt::conditional_select(&a, &b, Choice::from(0)), b);
    }
}
