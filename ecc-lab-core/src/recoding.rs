//! Scalar recoding: turning a [`BigInt`] into the digit sequence a
//! particular scalar-multiplication algorithm actually consumes.
//!
//! Every recoder here is grounded on the corresponding `bn_*` function in
//! the original firmware's bignum layer. None of them touch a [`Curve`] or
//! [`Point`] — they're pure digit-sequence transforms, which is what lets
//! [`crate::scalarmult`] mix and match a recoding with an unrelated point
//! arithmetic strategy.
//!
//! [`Curve`]: crate::curve::Curve
//! [`Point`]: crate::point::Point

use crate::bigint::BigInt;
use crate::error::{Error, Result};

/// A signed digit produced by NAF/sliding-window/Booth recoding.
pub type Digit = i64;

fn check_width(w: u32) -> Result<()> {
    if !(2..=8).contains(&w) {
        return Err(Error::InvalidInput);
    }
    Ok(())
}

/// Width-`w` non-adjacent form, most-significant digit first.
///
/// Grounded on `bn_wnaf` (`bn/bn.c`): repeatedly peel off the low bit, and
/// whenever it's set, subtract the signed residue mod `2^w` that makes the
/// new low `w` bits zero. `w == 2` is the ordinary binary NAF (`bn_bnaf`).
pub fn wnaf(value: &BigInt, w: u32) -> Result<Vec<Digit>> {
    check_width(w)?;
    let half_width = 1i64 << (w - 1);
    let full_width = 1i64 << w;
    let full_width_bn = BigInt::from_u64(full_width as u64);
    let mut k = value.clone();
    let mut out = Vec::new();
    while k.sign() > 0 {
        if k.get_bit(0) {
            let mut val_mod = k.modulo(&full_width_bn)?.to_u64() as i64;
            if val_mod > half_width {
                val_mod -= full_width;
            }
            out.push(val_mod);
            k = if val_mod >= 0 {
                k.sub(&BigInt::from_u64(val_mod as u64))
            } else {
                k.add(&BigInt::from_u64((-val_mod) as u64))
            };
        } else {
            out.push(0);
        }
        k = k.shr(1);
    }
    out.reverse();
    Ok(out)
}

/// Binary NAF, i.e. [`wnaf`] with `w = 2`.
pub fn binary_naf(value: &BigInt) -> Result<Vec<Digit>> {
    wnaf(value, 2)
}

/// Left-pad a NAF digit sequence with zero digits up to `new_length`.
/// Grounded on `bn_naf_extend`.
pub fn naf_extend(naf: &mut Vec<Digit>, new_length: usize) {
    if new_length <= naf.len() {
        return;
    }
    let diff = new_length - naf.len();
    let mut out = vec![0; new_length];
    out[diff..].copy_from_slice(naf);
    *naf = out;
}

fn window_value(value: &BigInt, hi: usize, width: usize) -> u64 {
    let mut v = 0u64;
    for b in 0..width {
        if value.get_bit(hi - b) {
            v |= 1 << (width - 1 - b);
        }
    }
    v
}

/// Left-to-right sliding window, most-significant digit first. Every
/// nonzero digit is odd and is followed by the run of zero digits implied
/// by its own bit length (no fixed spacing like [`wnaf`]).
///
/// Grounded on `bn_wsliding_ltr`.
pub fn sliding_window_ltr(value: &BigInt, w: u32) -> Result<Vec<Digit>> {
    check_width(w)?;
    let w = w as usize;
    let blen = value.bit_length();
    if blen == 0 {
        return Ok(Vec::new());
    }
    let mut arr = vec![0i64; blen];
    let mut i = 0usize;
    let mut b = blen as isize - 1;
    while b >= 0 {
        let bu = b as usize;
        if !value.get_bit(bu) {
            arr[i] = 0;
            i += 1;
            b -= 1;
            continue;
        }
        let mut u: u64 = 0;
        for v in 1..=w {
            if bu + 1 < v {
                break;
            }
            let candidate = window_value(value, bu, v);
            if candidate & 1 == 1 {
                u = candidate;
            }
        }
        let c = u;
        let mut uu = u;
        while uu != 0 {
            arr[i] = 0;
            i += 1;
            b -= 1;
            uu >>= 1;
        }
        arr[i - 1] = c as i64;
    }
    // strip leading zero digits
    let start = arr[..i].iter().position(|&d| d != 0).unwrap_or(i);
    Ok(arr[start..i].to_vec())
}

/// Right-to-left sliding window. Every nonzero digit is odd, taken as the
/// low `w` bits at the current position, followed by `w - 1` zero digits.
///
/// Grounded on `bn_wsliding_rtl`.
pub fn sliding_window_rtl(value: &BigInt, w: u32) -> Result<Vec<Digit>> {
    check_width(w)?;
    let wu = w as usize;
    let mask = BigInt::from_u64((1u64 << w) - 1);
    let mut k = value.clone();
    let mut lsb_first = Vec::new();
    while k.sign() > 0 {
        if !k.get_bit(0) {
            lsb_first.push(0i64);
            k = k.shr(1);
        } else {
            let low = k.and(&mask).to_u64() as i64;
            lsb_first.push(low);
            for _ in 0..wu - 1 {
                lsb_first.push(0);
            }
            k = k.shr(wu);
        }
    }
    let mut digits: Vec<Digit> = lsb_first.into_iter().rev().collect();
    while digits.first() == Some(&0) {
        digits.remove(0);
    }
    Ok(digits)
}

fn booth_word(window: u64, w: u32) -> Digit {
    let half = 1u64 << w;
    let full = 1u64 << (w + 1);
    if window < half {
        ((window + 1) / 2) as Digit
    } else {
        -(((full - window) / 2) as Digit)
    }
}

/// Modified-Booth recoding in radix `2^w`, most-significant digit first.
/// `bits` is the bit length the caller wants covered (typically the group
/// order's), independent of `value`'s own bit length, matching `bn_booth`'s
/// signature.
///
/// Grounded on `bn_booth`/`bn_booth_word` (referenced by
/// `templates/mult_booth.c`; test vectors in `test/test_bn.c` pinned the
/// exact digit values this function must reproduce).
pub fn booth(value: &BigInt, w: u32, bits: usize) -> Vec<Digit> {
    if w == 0 {
        return Vec::new();
    }
    let w = w as usize;
    let length = bits / w + 1;
    let mut out = Vec::with_capacity(length);
    for i in 0..length {
        let hi = (i * w) as isize + w as isize - 1;
        let lo = (i * w) as isize - 1;
        let mut window = 0u64;
        for bitpos in lo..=hi {
            if bitpos >= 0 && value.get_bit(bitpos as usize) {
                window |= 1 << (bitpos - lo);
            }
        }
        out.push(booth_word(window, w as u32));
    }
    out
}

/// Positional digits of `value` in a native-word base `m`, least-
/// significant digit first. Grounded on `bn_convert_base_small`.
pub fn convert_base_small(value: &BigInt, m: u64) -> Result<Vec<u64>> {
    if m < 2 {
        return Err(Error::InvalidInput);
    }
    if value.is_zero() {
        return Ok(vec![0]);
    }
    let base = BigInt::from_u64(m);
    let mut k = value.clone();
    let mut out = Vec::new();
    while !k.is_zero() {
        let (q, r) = k.divmod(&base)?;
        out.push(r.to_u64());
        k = q;
    }
    Ok(out)
}

/// Positional digits of `value` in an arbitrary-precision base `m`, least-
/// significant digit first. Grounded on `bn_convert_base_large`.
pub fn convert_base_large(value: &BigInt, m: &BigInt) -> Result<Vec<BigInt>> {
    if m.is_zero() || m.is_one() {
        return Err(Error::InvalidInput);
    }
    if value.is_zero() {
        return Ok(vec![BigInt::zero()]);
    }
    let mut k = value.clone();
    let mut out = Vec::new();
    while !k.is_zero() {
        let (q, r) = k.divmod(m)?;
        out.push(r);
        k = q;
    }
    Ok(out)
}
