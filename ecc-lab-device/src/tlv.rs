//! Nested name-length-value parser.
//!
//! Grounded on `main.c::parse_data`: repeated `{name: 1 byte, len: 1 byte,
//! value: len bytes}` entries; the high bit of `name` flags the value as a
//! sub-tree rather than a leaf, and paths are the concatenation of the
//! single-byte names visited to reach a leaf (root path is empty).

use crate::error::{DeviceError, Result};

/// Walks a TLV payload, invoking `visit(path, value)` for every leaf.
/// `path` accumulates the (unmasked) name bytes as `char`s from the root.
pub fn parse_data(data: &[u8], visit: &mut impl FnMut(&str, &[u8]) -> Result<()>) -> Result<()> {
    walk(data, String::new(), visit)
}

fn walk(data: &[u8], path: String, visit: &mut impl FnMut(&str, &[u8]) -> Result<()>) -> Result<()> {
    let mut parsed = 0usize;
    while parsed < data.len() {
        let raw_name = *data.get(parsed).ok_or(DeviceError::Tlv)?;
        let recurse = raw_name & 0x80 != 0;
        let name = (raw_name & 0x7f) as char;
        let value_len = *data.get(parsed + 1).ok_or(DeviceError::Tlv)? as usize;
        let value_start = parsed + 2;
        let value_end = value_start + value_len;
        let value = data.get(value_start..value_end).ok_or(DeviceError::Tlv)?;

        let mut child_path = path.clone();
        child_path.push(name);

        if recurse {
            walk(value, child_path, visit)?;
        } else {
            visit(&child_path, value)?;
        }
        parsed = value_end;
    }
    Ok(())
}

/// Collects every leaf into a `path -> value` map, for callers that don't
/// need streaming behavior (tests, and command handlers with few entries).
pub fn parse_to_map(data: &[u8]) -> Result<std::collections::BTreeMap<String, Vec<u8>>> {
    let mut out = std::collections::BTreeMap::new();
    parse_data(data, &mut |path, value| {
        out.insert(path.to_string(), value.to_vec());
        Ok(())
    })?;
    Ok(out)
}

/// Encodes a single flat leaf entry: `{name, len, value}`. Used by test
/// fixtures and by command handlers building a sub-tree (the `recurse` bit
/// is the caller's job — see [`encode_subtree`]).
pub fn encode_leaf(name: u8, value: &[u8]) -> Result<Vec<u8>> {
    if value.len() > u8::MAX as usize {
        return Err(DeviceError::Tlv);
    }
    let mut out = Vec::with_capacity(2 + value.len());
    out.push(name);
    out.push(value.len() as u8);
    out.extend_from_slice(value);
    Ok(out)
}

/// Encodes `name` as a sub-tree container wrapping the concatenation of
/// `children` (each itself produced by [`encode_leaf`]/[`encode_subtree`]).
pub fn encode_subtree(name: u8, children: &[u8]) -> Result<Vec<u8>> {
    if children.len() > u8::MAX as usize {
        return Err(DeviceError::Tlv);
    }
    let mut out = Vec::with_capacity(2 + children.len());
    out.push(name | 0x80);
    out.push(children.len() as u8);
    out.extend_from_slice(children);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_entries_produce_single_char_paths() {
        let mut data = Vec::new();
        data.extend(encode_leaf(b's', &[0xaa, 0xbb]).unwrap());
        let map = parse_to_map(&data).unwrap();
        assert_eq!(map.get("s"), Some(&vec![0xaa, 0xbb]));
    }

    #[test]
    fn nested_entries_concatenate_path() {
        let leaf_x = encode_leaf(b'x', &[0x01]).unwrap();
        let leaf_y = encode_leaf(b'y', &[0x02]).unwrap();
        let mut children = Vec::new();
        children.extend(leaf_x);
        children.extend(leaf_y);
        let tree = encode_subtree(b'g', &children).unwrap();

        let map = parse_to_map(&tree).unwrap();
        assert_eq!(map.get("gx"), Some(&vec![0x01]));
        assert_eq!(map.get("gy"), Some(&vec![0x02]));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let data = vec![b's', 5, 0x01];
        assert!(parse_to_map(&data).is_err());
    }
}
