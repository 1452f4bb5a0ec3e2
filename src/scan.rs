//! Token scanners for the scene wire encoding.
//!
//! Every scanner takes the remaining slice of one node line and returns the
//! decoded value together with the number of bytes consumed, so the caller
//! can advance its cursor. Failure never leaves a partially decoded value
//! behind: list scanners drop their accumulator and report the error as a
//! whole.
//!
//! Floats use a bit-exact encoding rather than decimal text: an optional
//! leading `-` sets the sign bit, then a hexadecimal exponent field, a
//! sentinel (`z` for 32-bit, `Z` for 64-bit) and a hexadecimal mantissa
//! field. The scanner reassembles the IEEE-754 bit pattern directly, so the
//! value survives transport regardless of the host's decimal conversion
//! behavior.

use crate::error::{Error, Result};
use crate::value::Rational;

/// Longest accepted dictionary key, in bytes.
pub(crate) const MAX_DICT_KEY_LEN: usize = 63;

fn hex_digit(b: u8) -> Option<u32> {
    (b as char).to_digit(16)
}

/// Scans zero or more hex digits into a `u32`. Returns `(0, 0)` on an empty
/// field; fails only if the digits overflow the target width.
fn hex_field_u32(s: &str) -> Result<(u32, usize)> {
    let mut val: u32 = 0;
    let mut consumed = 0;
    for &b in s.as_bytes() {
        let Some(d) = hex_digit(b) else { break };
        val = val
            .checked_mul(16)
            .and_then(|v| v.checked_add(d))
            .ok_or_else(|| Error::literal("hexadecimal integer"))?;
        consumed += 1;
    }
    Ok((val, consumed))
}

fn hex_field_u64(s: &str) -> Result<(u64, usize)> {
    let mut val: u64 = 0;
    let mut consumed = 0;
    for &b in s.as_bytes() {
        let Some(d) = hex_digit(b) else { break };
        val = val
            .checked_mul(16)
            .and_then(|v| v.checked_add(u64::from(d)))
            .ok_or_else(|| Error::literal("hexadecimal integer"))?;
        consumed += 1;
    }
    Ok((val, consumed))
}

/// Scans a base-10 unsigned integer. At least one digit is required.
pub(crate) fn scan_u32(s: &str) -> Result<(u32, usize)> {
    let mut val: u32 = 0;
    let mut consumed = 0;
    for &b in s.as_bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .ok_or_else(|| Error::literal("decimal integer"))?;
        consumed += 1;
    }
    if consumed == 0 {
        return Err(Error::literal("decimal integer"));
    }
    Ok((val, consumed))
}

/// Scans a base-10 signed integer with an optional leading `-`.
pub(crate) fn scan_i32(s: &str) -> Result<(i32, usize)> {
    let (neg, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (magnitude, n) = scan_u32(digits)?;
    let val = if neg {
        0i64 - i64::from(magnitude)
    } else {
        i64::from(magnitude)
    };
    let val = i32::try_from(val).map_err(|_| Error::literal("decimal integer"))?;
    Ok((val, n + usize::from(neg)))
}

/// Scans a base-16 unsigned integer. At least one digit is required.
pub(crate) fn scan_hex_u32(s: &str) -> Result<(u32, usize)> {
    let (val, consumed) = hex_field_u32(s)?;
    if consumed == 0 {
        return Err(Error::literal("hexadecimal integer"));
    }
    Ok((val, consumed))
}

/// Scans a boolean encoded as a decimal integer: `-1` is the unset sentinel,
/// any other value collapses to its truthiness.
pub(crate) fn scan_bool(s: &str) -> Result<(Option<bool>, usize)> {
    let (val, consumed) = scan_i32(s)?;
    let val = if val == -1 { None } else { Some(val != 0) };
    Ok((val, consumed))
}

/// Scans a bit-exact 32-bit float: `-`? + hex exponent + `z` + hex mantissa.
pub(crate) fn scan_f32(s: &str) -> Result<(f32, usize)> {
    let mut bits: u32 = 0;
    let mut consumed = 0;
    if s.as_bytes().first() == Some(&b'-') {
        bits = 1 << 31;
        consumed += 1;
    }
    let (exp, n) = hex_field_u32(&s[consumed..])?;
    consumed += n;
    if s.as_bytes().get(consumed) != Some(&b'z') {
        return Err(Error::literal("f32"));
    }
    consumed += 1;
    let (mant, n) = hex_field_u32(&s[consumed..])?;
    consumed += n;
    bits |= exp << 23 | mant;
    Ok((f32::from_bits(bits), consumed))
}

/// Scans a bit-exact 64-bit float: `-`? + hex exponent + `Z` + hex mantissa.
pub(crate) fn scan_f64(s: &str) -> Result<(f64, usize)> {
    let mut bits: u64 = 0;
    let mut consumed = 0;
    if s.as_bytes().first() == Some(&b'-') {
        bits = 1 << 63;
        consumed += 1;
    }
    let (exp, n) = hex_field_u64(&s[consumed..])?;
    consumed += n;
    if s.as_bytes().get(consumed) != Some(&b'Z') {
        return Err(Error::literal("f64"));
    }
    consumed += 1;
    let (mant, n) = hex_field_u64(&s[consumed..])?;
    consumed += n;
    bits |= exp << 52 | mant;
    Ok((f64::from_bits(bits), consumed))
}

/// Scans a comma-separated run of literals into a growable buffer.
///
/// Any element failure (or allocation failure) discards the whole buffer:
/// no partial list is ever returned.
pub(crate) fn scan_list<T>(s: &str, scan: fn(&str) -> Result<(T, usize)>) -> Result<(Vec<T>, usize)> {
    let mut vals: Vec<T> = Vec::new();
    let mut consumed = 0;
    loop {
        let (val, n) = scan(&s[consumed..])?;
        vals.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        vals.push(val);
        consumed += n;
        if s.as_bytes().get(consumed) != Some(&b',') {
            break;
        }
        consumed += 1;
    }
    Ok((vals, consumed))
}

/// Scans a `<num>/<den>` rational pair. Both components are required.
pub(crate) fn scan_rational(s: &str) -> Result<(Rational, usize)> {
    let (num, n1) = scan_i32(s)?;
    if s.as_bytes().get(n1) != Some(&b'/') {
        return Err(Error::literal("rational"));
    }
    let (den, n2) = scan_i32(&s[n1 + 1..])?;
    Ok((Rational { num, den }, n1 + 1 + n2))
}

/// Returns the prefix of `s` up to (not including) the next whitespace.
pub(crate) fn token(s: &str) -> &str {
    let end = s
        .find(|c: char| c == ' ' || c == '\n')
        .unwrap_or(s.len());
    &s[..end]
}

/// Decodes `%XY` hex-byte escapes in a raw token.
///
/// A `%` not followed by two characters inside the token is kept literally,
/// as is a `%` whose following characters are not hex digits. The decoded
/// bytes must form valid UTF-8.
pub(crate) fn unescape(tok: &str) -> Result<String> {
    let bytes = tok.as_bytes();
    let mut out: Vec<u8> = Vec::new();
    out.try_reserve(bytes.len()).map_err(|_| Error::OutOfMemory)?;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push((hi << 4 | lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).map_err(|_| Error::literal("utf-8 string"))
}

/// Scans a data blob: `<decimal size>,` followed by exactly `2*size` hex
/// digits. The digit count is verified up front so the scanner never reads
/// past the end of the line.
pub(crate) fn scan_data(s: &str) -> Result<(Vec<u8>, usize)> {
    let (size, n) = scan_u32(s).map_err(|_| Error::literal("data blob"))?;
    let size = size as usize;
    if size == 0 || s.as_bytes().get(n) != Some(&b',') {
        return Err(Error::literal("data blob"));
    }
    let hex = &s.as_bytes()[n + 1..];
    let digits = hex.iter().take_while(|&&b| hex_digit(b).is_some()).count();
    if digits < 2 * size {
        return Err(Error::TruncatedData {
            size,
            available: digits,
        });
    }
    let mut data: Vec<u8> = Vec::new();
    data.try_reserve_exact(size).map_err(|_| Error::OutOfMemory)?;
    for i in 0..size {
        let hi = hex_digit(hex[2 * i]).ok_or_else(|| Error::literal("data blob"))?;
        let lo = hex_digit(hex[2 * i + 1]).ok_or_else(|| Error::literal("data blob"))?;
        data.push((hi << 4 | lo) as u8);
    }
    Ok((data, n + 1 + 2 * size))
}

/// Scans comma-separated `<key>=<hex id>` pairs.
///
/// Keys are bounded to [`MAX_DICT_KEY_LEN`] bytes; longer keys fail instead
/// of being truncated.
pub(crate) fn scan_kvs(s: &str) -> Result<(Vec<(String, u32)>, usize)> {
    let mut kvs: Vec<(String, u32)> = Vec::new();
    let mut consumed = 0;
    loop {
        let rest = &s[consumed..];
        let eq = rest
            .find('=')
            .ok_or_else(|| Error::literal("node dictionary"))?;
        if eq == 0 {
            return Err(Error::literal("node dictionary"));
        }
        if eq > MAX_DICT_KEY_LEN {
            return Err(Error::KeyTooLong { len: eq });
        }
        let key = &rest[..eq];
        let (id, n) = scan_hex_u32(&rest[eq + 1..])?;
        kvs.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        kvs.push((key.to_string(), id));
        consumed += eq + 1 + n;
        if s.as_bytes().get(consumed) != Some(&b',') {
            break;
        }
        consumed += 1;
    }
    Ok((kvs, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_and_signed_integers() {
        assert_eq!(scan_u32("42,rest").unwrap(), (42, 2));
        assert_eq!(scan_i32("-17 x").unwrap(), (-17, 3));
        assert_eq!(scan_i32("2147483647").unwrap(), (i32::MAX, 10));
        assert_eq!(scan_i32("-2147483648").unwrap(), (i32::MIN, 11));
        assert!(scan_i32("2147483648").is_err());
        assert!(scan_u32("x").is_err());
        assert!(scan_i32("-").is_err());
    }

    #[test]
    fn hex_integers() {
        assert_eq!(scan_hex_u32("ff,").unwrap(), (0xff, 2));
        assert_eq!(scan_hex_u32("DEADbeef").unwrap(), (0xdead_beef, 8));
        assert!(scan_hex_u32("").is_err());
        assert!(scan_hex_u32("g").is_err());
        assert!(scan_hex_u32("100000000").is_err());
    }

    #[test]
    fn bool_tri_state() {
        assert_eq!(scan_bool("-1").unwrap(), (None, 2));
        assert_eq!(scan_bool("0").unwrap(), (Some(false), 1));
        assert_eq!(scan_bool("1").unwrap(), (Some(true), 1));
        assert_eq!(scan_bool("7").unwrap(), (Some(true), 1));
    }

    #[test]
    fn f32_bit_patterns() {
        // 1.0f32 has bits 0x3f800000: exponent 0x7f, mantissa 0
        let (v, n) = scan_f32("7fz0").unwrap();
        assert_eq!(v, 1.0);
        assert_eq!(n, 4);

        let (v, _) = scan_f32("0z0").unwrap();
        assert_eq!(v.to_bits(), 0);

        let (v, _) = scan_f32("-0z0").unwrap();
        assert_eq!(v.to_bits(), 1 << 31);

        let (v, _) = scan_f32("ffz0").unwrap();
        assert_eq!(v, f32::INFINITY);

        let (v, _) = scan_f32("ffz400000").unwrap();
        assert!(v.is_nan());

        // subnormal: exponent 0, mantissa 1
        let (v, _) = scan_f32("0z1").unwrap();
        assert_eq!(v.to_bits(), 1);

        assert!(scan_f32("7f").is_err());
        assert!(scan_f32("7fZ0").is_err());
    }

    #[test]
    fn f64_bit_patterns() {
        // 1.0f64 has bits 0x3ff0000000000000: exponent 0x3ff, mantissa 0
        let (v, n) = scan_f64("3ffZ0").unwrap();
        assert_eq!(v, 1.0);
        assert_eq!(n, 5);

        let (v, _) = scan_f64("-3ffZ0").unwrap();
        assert_eq!(v, -1.0);

        let (v, _) = scan_f64("7ffZ0").unwrap();
        assert_eq!(v, f64::INFINITY);

        assert!(scan_f64("3ffz0").is_err());
    }

    #[test]
    fn list_accumulation() {
        let (vals, n) = scan_list("1,2,3 rest", scan_i32).unwrap();
        assert_eq!(vals, vec![1, 2, 3]);
        assert_eq!(n, 5);

        // single element, no trailing comma consumed
        let (vals, n) = scan_list("9", scan_i32).unwrap();
        assert_eq!(vals, vec![9]);
        assert_eq!(n, 1);
    }

    #[test]
    fn list_atomicity() {
        assert!(scan_list("x,2,3", scan_i32).is_err());
        assert!(scan_list("1,x,3", scan_i32).is_err());
        assert!(scan_list("1,2,x", scan_i32).is_err());
    }

    #[test]
    fn rational_pair() {
        assert_eq!(scan_rational("30000/1001").unwrap(), (Rational { num: 30000, den: 1001 }, 10));
        assert_eq!(scan_rational("-1/2").unwrap(), (Rational { num: -1, den: 2 }, 4));
        assert!(scan_rational("30000").is_err());
        assert!(scan_rational("30000/").is_err());
    }

    #[test]
    fn token_scan() {
        assert_eq!(token("hello world"), "hello");
        assert_eq!(token("trailing"), "trailing");
        assert_eq!(token(""), "");
    }

    #[test]
    fn string_unescape() {
        assert_eq!(unescape("hello").unwrap(), "hello");
        assert_eq!(unescape("a%20b").unwrap(), "a b");
        assert_eq!(unescape("100%25").unwrap(), "100%");
        // '%' too close to the end stays literal
        assert_eq!(unescape("%2").unwrap(), "%2");
        assert_eq!(unescape("abc%").unwrap(), "abc%");
        // non-hex after '%' stays literal
        assert_eq!(unescape("%zz").unwrap(), "%zz");
        // escapes decoding to invalid utf-8 are rejected
        assert!(unescape("%ff%fe").is_err());
    }

    #[test]
    fn data_blob() {
        let (data, n) = scan_data("3,0001fe").unwrap();
        assert_eq!(data, vec![0x00, 0x01, 0xfe]);
        assert_eq!(n, 8);

        assert!(matches!(
            scan_data("10,0001feff"),
            Err(Error::TruncatedData { size: 10, .. })
        ));
        assert!(scan_data("0,").is_err());
        assert!(scan_data("3 0001fe").is_err());
        assert!(scan_data("2,00zz").is_err());
    }

    #[test]
    fn key_value_pairs() {
        let (kvs, n) = scan_kvs("tex0=0,tex1=1").unwrap();
        assert_eq!(kvs, vec![("tex0".to_string(), 0), ("tex1".to_string(), 1)]);
        assert_eq!(n, 13);

        assert!(scan_kvs("=0").is_err());
        assert!(scan_kvs("tex0").is_err());
        assert!(scan_kvs("tex0=x").is_err());
    }

    #[test]
    fn key_length_bound() {
        let key63 = "k".repeat(63);
        let (kvs, _) = scan_kvs(&format!("{key63}=a")).unwrap();
        assert_eq!(kvs[0].0.len(), 63);
        assert_eq!(kvs[0].1, 0xa);

        let key64 = "k".repeat(64);
        assert!(matches!(
            scan_kvs(&format!("{key64}=a")),
            Err(Error::KeyTooLong { len: 64 })
        ));
    }
}
