//! DER `SEQUENCE { INTEGER r, INTEGER s }` encode/decode.
//!
//! Grounded on `asn1/asn1.c`'s `asn1_der_encode`/`asn1_der_decode`: the
//! sign-extension rule (prepend `0x00` iff the integer's top byte has its
//! high bit set) and the short/long form length rules, spec §6.

use crate::error::{DeviceError, Result};
use ecc_lab_core::BigInt;

fn integer_bytes(value: &BigInt) -> Vec<u8> {
    let raw = value.to_bytes_be();
    if raw.is_empty() {
        return vec![0];
    }
    if raw[0] & 0x80 != 0 {
        let mut padded = Vec::with_capacity(raw.len() + 1);
        padded.push(0);
        padded.extend_from_slice(&raw);
        padded
    } else {
        raw
    }
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 128 {
        out.push(len as u8);
    } else {
        let len_bytes = len.to_be_bytes();
        let first_nonzero = len_bytes.iter().position(|&b| b != 0).unwrap_or(len_bytes.len() - 1);
        let significant = &len_bytes[first_nonzero..];
        out.push(0x80 | significant.len() as u8);
        out.extend_from_slice(significant);
    }
}

/// Encodes `(r, s)` as a DER `SEQUENCE { INTEGER r, INTEGER s }`.
pub fn encode(r: &BigInt, s: &BigInt) -> Vec<u8> {
    let r_bytes = integer_bytes(r);
    let s_bytes = integer_bytes(s);

    let mut value = Vec::new();
    value.push(0x02);
    encode_length(r_bytes.len(), &mut value);
    value.extend_from_slice(&r_bytes);
    value.push(0x02);
    encode_length(s_bytes.len(), &mut value);
    value.extend_from_slice(&s_bytes);

    let mut out = Vec::new();
    out.push(0x30);
    encode_length(value.len(), &mut out);
    out.extend_from_slice(&value);
    out
}

fn read_length(data: &[u8], i: &mut usize) -> Result<usize> {
    let first = *data.get(*i).ok_or(DeviceError::Asn1)?;
    *i += 1;
    if first & 0x80 == 0 {
        Ok(first as usize)
    } else {
        let count = (first & 0x7f) as usize;
        let bytes = data.get(*i..*i + count).ok_or(DeviceError::Asn1)?;
        *i += count;
        let mut len = 0usize;
        for &b in bytes {
            len = (len << 8) | b as usize;
        }
        Ok(len)
    }
}

fn read_integer(data: &[u8], i: &mut usize) -> Result<BigInt> {
    if *data.get(*i).ok_or(DeviceError::Asn1)? != 0x02 {
        return Err(DeviceError::Asn1);
    }
    *i += 1;
    let len = read_length(data, i)?;
    let bytes = data.get(*i..*i + len).ok_or(DeviceError::Asn1)?;
    *i += len;
    Ok(BigInt::from_bytes_be(bytes))
}

/// Decodes a DER `SEQUENCE { INTEGER r, INTEGER s }`, rejecting trailing
/// garbage the way `asn1_der_decode`'s final `i != sig_len` check does.
pub fn decode(data: &[u8]) -> Result<(BigInt, BigInt)> {
    let mut i = 0usize;
    if *data.first().ok_or(DeviceError::Asn1)? != 0x30 {
        return Err(DeviceError::Asn1);
    }
    i += 1;
    let seq_len = read_length(data, &mut i)?;
    if i + seq_len != data.len() {
        return Err(DeviceError::Asn1);
    }
    let r = read_integer(data, &mut i)?;
    let s = read_integer(data, &mut i)?;
    if i != data.len() {
        return Err(DeviceError::Asn1);
    }
    Ok((r, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_the_r1_s1_vector() {
        let out = encode(&BigInt::from_u64(1), &BigInt::from_u64(1));
        assert_eq!(out, vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]);
    }

    #[test]
    fn round_trips_the_r1_s1_vector() {
        let encoded = encode(&BigInt::from_u64(1), &BigInt::from_u64(1));
        let (r, s) = decode(&encoded).unwrap();
        assert_eq!(r, BigInt::from_u64(1));
        assert_eq!(s, BigInt::from_u64(1));
    }

    #[test]
    fn pads_integers_whose_top_bit_is_set() {
        // 0xFF alone would be read back as -1; DER requires a leading 0x00.
        let r = BigInt::from_u64(0xff);
        let out = encode(&r, &BigInt::from_u64(1));
        assert_eq!(&out[2..6], &[0x02, 0x02, 0x00, 0xff]);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut encoded = encode(&BigInt::from_u64(1), &BigInt::from_u64(1));
        encoded.push(0xff);
        assert!(decode(&encoded).is_err());
    }

    #[test]
    fn round_trips_large_values() {
        let r = BigInt::from_hex("A1B2C3D4E5F60718293A4B5C6D7E8F90").unwrap();
        let s = BigInt::from_hex("1").unwrap();
        let encoded = encode(&r, &s);
        let (dr, ds) = decode(&encoded).unwrap();
        assert_eq!(dr, r);
        assert_eq!(ds, s);
    }
}
