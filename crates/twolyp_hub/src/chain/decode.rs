//! ABI return-value decoding for the handful of shapes the contract exposes.
//!
//! Monetary values arrive as 10^18-scaled integers; everything downstream works
//! in decimal token units, so `decode_uint` folds the hex into an `f64` and
//! `wei_to_tokens` rescales. Precision loss above 2^53 wei is acceptable for
//! display-grade aggregation.

use thiserror::Error;

/// Wei per whole token (18 decimals).
pub const WEI_PER_TOKEN: f64 = 1e18;

/// Zero address, returned by the contract for unset wallet roles.
const ZERO_ADDRESS_HEX: &str = "0000000000000000000000000000000000000000";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty return data")]
    Empty,
    #[error("invalid hex digit {0:?}")]
    InvalidHex(char),
    #[error("return data too short: {0} hex chars")]
    TooShort(usize),
    #[error("malformed array data: {0}")]
    MalformedArray(String),
}

fn strip_0x(data: &str) -> &str {
    data.trim().trim_start_matches("0x").trim_start_matches("0X")
}

fn hex_digit(c: char) -> Result<u32, DecodeError> {
    c.to_digit(16).ok_or(DecodeError::InvalidHex(c))
}

/// Decode a uint256 return word into an `f64` by hex-folding.
pub fn decode_uint(data: &str) -> Result<f64, DecodeError> {
    let s = strip_0x(data);
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut value = 0.0f64;
    for c in s.chars() {
        value = value * 16.0 + f64::from(hex_digit(c)?);
    }
    Ok(value)
}

/// Wei-scaled value to decimal token units.
pub fn wei_to_tokens(wei: f64) -> f64 {
    wei / WEI_PER_TOKEN
}

/// Decode a bool return word (any nonzero digit is true).
pub fn decode_bool(data: &str) -> Result<bool, DecodeError> {
    let s = strip_0x(data);
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }
    for c in s.chars() {
        if hex_digit(c)? != 0 {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Decode an address return word. The zero address decodes to `None` (role unset).
pub fn decode_address(data: &str) -> Result<Option<String>, DecodeError> {
    let s = strip_0x(data);
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }
    if s.len() < 40 {
        return Err(DecodeError::TooShort(s.len()));
    }
    for c in s.chars() {
        hex_digit(c)?;
    }
    let addr = &s[s.len() - 40..];
    if addr.eq_ignore_ascii_case(ZERO_ADDRESS_HEX) {
        Ok(None)
    } else {
        Ok(Some(format!("0x{}", addr.to_lowercase())))
    }
}

/// Decode a dynamic `address[]` return: offset word, length word, then one
/// right-aligned address per 32-byte word.
pub fn decode_address_array(data: &str) -> Result<Vec<String>, DecodeError> {
    let s = strip_0x(data);
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }
    if s.len() < 128 {
        return Err(DecodeError::MalformedArray(format!(
            "expected offset and length words, got {} hex chars",
            s.len()
        )));
    }
    // Offset is in bytes; two hex chars per byte.
    let len_start = word_as_usize(&s[..64])? * 2;
    if s.len() < len_start + 64 {
        return Err(DecodeError::MalformedArray(format!(
            "length word out of range at {len_start}"
        )));
    }
    let count = word_as_usize(&s[len_start..len_start + 64])?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let start = len_start + 64 + i * 64;
        let end = start + 64;
        if s.len() < end {
            return Err(DecodeError::MalformedArray(format!(
                "element {i} out of range"
            )));
        }
        if let Some(addr) = decode_address(&s[start..end])? {
            out.push(addr);
        }
    }
    Ok(out)
}

fn word_as_usize(word: &str) -> Result<usize, DecodeError> {
    let mut value = 0usize;
    for c in word.chars() {
        let d = hex_digit(c)? as usize;
        value = value.saturating_mul(16).saturating_add(d);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_uint_word() {
        // 1,000,000 tokens in wei: 0xd3c21bcecceda1000000
        let word = format!("0x{:0>64}", "d3c21bcecceda1000000");
        let wei = decode_uint(&word).unwrap();
        let tokens = wei_to_tokens(wei);
        assert!((tokens - 1_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn decode_uint_rejects_garbage() {
        assert!(decode_uint("0xzz").is_err());
        assert!(decode_uint("").is_err());
    }

    #[test]
    fn decode_bool_words() {
        let t = format!("0x{:0>64}", "1");
        let f = format!("0x{:0>64}", "0");
        assert!(decode_bool(&t).unwrap());
        assert!(!decode_bool(&f).unwrap());
    }

    #[test]
    fn decode_address_word() {
        let word = format!("0x{:0>64}", "AbCdEf0123456789abcdef0123456789abcdef01");
        let addr = decode_address(&word).unwrap().unwrap();
        assert_eq!(addr, "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn decode_zero_address_is_absent() {
        let word = format!("0x{:0>64}", "0");
        assert!(decode_address(&word).unwrap().is_none());
    }

    #[test]
    fn decode_empty_address_array() {
        // offset 0x20, length 0
        let data = format!("0x{:0>64}{:0>64}", "20", "0");
        assert!(decode_address_array(&data).unwrap().is_empty());
    }

    #[test]
    fn decode_two_element_address_array() {
        let a1 = "1111111111111111111111111111111111111111";
        let a2 = "2222222222222222222222222222222222222222";
        let data = format!("0x{:0>64}{:0>64}{:0>64}{:0>64}", "20", "2", a1, a2);
        let out = decode_address_array(&data).unwrap();
        assert_eq!(out, vec![format!("0x{a1}"), format!("0x{a2}")]);
    }
}
