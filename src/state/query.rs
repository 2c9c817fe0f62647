//! `application/x-www-form-urlencoded` query strings, with the number
//! formatting the URL state is written in.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Bytes left unescaped by the form-urlencoded serializer, besides alphanumerics
const FORM_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Ordered name/value pairs of a URL query string.
///
/// Names may repeat. `get` sees the first occurrence and `set` collapses
/// repeats into one pair, in the position of the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string; a leading `?` is ignored
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|piece| !piece.is_empty())
            .map(|piece| match piece.split_once('=') {
                Some((name, value)) => (decode(name), decode(value)),
                None => (decode(piece), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(n, _)| n == name) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(n, _)| {
                    let keep = index <= first || n != name;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((name.to_string(), value)),
        }
    }

    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.pairs.push((name.to_string(), value.into()));
    }

    pub fn delete(&mut self, name: &str) {
        self.pairs.retain(|(n, _)| n != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

// Literal '%' is always escaped, so "%20" in the output can only come from a space
fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, FORM_ENCODE)
        .to_string()
        .replace("%20", "+")
}

/// Serializes without the leading `?`
impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode(name), encode(value))?;
        }
        Ok(())
    }
}

/// Reads a numeric parameter. Absent, blank, malformed or non-finite input is 0.
///
/// Only decimal notation is accepted, so unlike JavaScript's `Number()` a hex
/// literal such as `0x10` reads as 0, as does an overflowing `1e400`.
pub fn parse_number(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Fixed-point formatting with `digits` decimals, rounding exact ties away
/// from zero the way JavaScript's `Number.prototype.toFixed` does.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    if magnitude.is_infinite() {
        return format!("{}Infinity", sign);
    }

    // 1074 places hold the full expansion of any f64
    let exact = format!("{:.1074}", magnitude);
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (kept, rest) = frac.split_at(digits.min(frac.len()));
    let tie = rest.starts_with('5') && rest.bytes().skip(1).all(|b| b == b'0');

    let body = if tie {
        round_up(int_part, kept)
    } else {
        format!("{:.*}", digits, magnitude)
    };
    format!("{}{}", sign, body)
}

/// Adds one unit in the last kept place
fn round_up(int_part: &str, frac: &str) -> String {
    let mut digits: Vec<u8> = int_part.bytes().chain(frac.bytes()).collect();
    let mut carry = true;
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, b'1');
    }

    let split = digits.len() - frac.len();
    let (int_digits, frac_digits) = digits.split_at(split);
    let mut out = String::from_utf8_lossy(int_digits).into_owned();
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(frac_digits));
    }
    out
}
