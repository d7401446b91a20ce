//! ASCII command-frame encode/decode.
//!
//! Grounded on `simpleserial.c`'s `hex_decode`/`simpleserial_get`/
//! `simpleserial_put`: a request is a single command letter followed by an
//! even-length hex string, terminated by `\n`; a reply is a reply letter
//! followed by the hex-encoded output, also `\n`-terminated. Nibble
//! conversion here goes through the `hex` crate rather than the original's
//! hand-rolled lookup table.

use crate::error::{DeviceError, Result};

/// A parsed `c XX…XX` request line (no trailing newline).
pub struct Request {
    pub command: char,
    pub payload: Vec<u8>,
}

/// Parses one line of input. `line` must not contain the trailing `\n`.
pub fn decode_request(line: &str) -> Result<Request> {
    let mut chars = line.chars();
    let command = chars.next().ok_or(DeviceError::Framing)?;
    let hex_part = chars.as_str();
    let payload = hex::decode(hex_part).map_err(|_| DeviceError::Framing)?;
    Ok(Request { command, payload })
}

/// Renders a `c XX…XX\n` reply frame (`z` for status, or a result letter
/// like `w`/`s`/`r`/`v` for payload replies).
pub fn encode_reply(letter: char, payload: &[u8]) -> String {
    let mut out = String::with_capacity(2 + payload.len() * 2);
    out.push(letter);
    out.push_str(&hex::encode_upper(payload));
    out.push('\n');
    out
}

/// The status reply: `z` followed by one status byte.
pub fn encode_status(status: u8) -> String {
    encode_reply('z', &[status])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_command_and_hex_payload() {
        let req = decode_request("c0102ff").unwrap();
        assert_eq!(req.command, 'c');
        assert_eq!(req.payload, vec![0x01, 0x02, 0xff]);
    }

    #[test]
    fn decodes_empty_payload() {
        let req = decode_request("g").unwrap();
        assert_eq!(req.command, 'g');
        assert!(req.payload.is_empty());
    }

    #[test]
    fn rejects_odd_length_hex() {
        assert!(decode_request("c0").is_err());
        assert_eq!(decode_request("c0a").unwrap().payload, vec![0x0a]);
    }

    #[test]
    fn encodes_status_reply() {
        assert_eq!(encode_status(0), "z00\n");
        assert_eq!(encode_status(9), "z09\n");
    }

    #[test]
    fn encodes_payload_reply_uppercase_hex() {
        assert_eq!(encode_reply('w', &[0xde, 0xad]), "wDEAD\n");
    }
}
