//! Built-in converters for standard types
//!
//! [`Registry::new`] registers every function here through
//! [`register_defaults`]. They are public so a registry started with
//! [`Registry::empty`] can pick only the ones it wants.
//!
//! Integers accept an optional sign followed by a `0x`, `0o` or `0b` prefix.
//! Durations use the `1h30m` / `250ms` notation.

use crate::error::Error;
use crate::registry::Registry;
use chrono::{DateTime, FixedOffset, Utc};
use std::convert::Infallible;
use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Input that a built-in parser could not understand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{input:?} is not a valid {expected}")]
pub struct ParseError {
    input: String,
    expected: &'static str,
}

impl ParseError {
    fn new(input: &str, expected: &'static str) -> Self {
        Self {
            input: input.to_string(),
            expected,
        }
    }
}

/// Register every built-in converter on `registry`.
pub fn register_defaults(registry: &mut Registry) -> Result<(), Error> {
    registry.register(parse_bool)?;
    registry.register(parse_string)?;
    registry.register(parse_char)?;
    registry.register(parse_i8)?;
    registry.register(parse_i16)?;
    registry.register(parse_i32)?;
    registry.register(parse_i64)?;
    registry.register(parse_isize)?;
    registry.register(parse_u8)?;
    registry.register(parse_u16)?;
    registry.register(parse_u32)?;
    registry.register(parse_u64)?;
    registry.register(parse_usize)?;
    registry.register(parse_f32)?;
    registry.register(parse_f64)?;
    registry.register(parse_duration)?;
    registry.register(parse_datetime_utc)?;
    registry.register(parse_datetime)?;
    registry.register(parse_url)?;
    registry.register(parse_ip)?;
    registry.register(parse_ipv4)?;
    registry.register(parse_ipv6)?;
    registry.register(parse_socket_addr)?;
    registry.register(parse_mac)?;
    registry.register(parse_path)?;
    registry.register(parse_bytes)?;
    registry.register(parse_list)?;
    Ok(())
}

pub fn parse_bool(s: &str) -> Result<bool, ParseError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseError::new(s, "bool")),
    }
}

pub fn parse_string(s: &str) -> Result<String, Infallible> {
    Ok(s.to_string())
}

pub fn parse_char(s: &str) -> Result<char, ParseError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ParseError::new(s, "char")),
    }
}

/// Split an integer literal into sign, radix and digits.
fn split_radix(s: &str) -> (&str, u32, &str) {
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _ => ("", s),
    };
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = rest.strip_prefix(prefix) {
            return (sign, radix, digits);
        }
    }
    (sign, 10, rest)
}

macro_rules! int_parsers {
    ($($name:ident => $ty:ty),* $(,)?) => {$(
        pub fn $name(s: &str) -> Result<$ty, ParseIntError> {
            let (sign, radix, digits) = split_radix(s);
            // Reject a second sign after the prefix, e.g. "-0x-1"
            let digits = match digits.as_bytes().first() {
                Some(b'-' | b'+') => "",
                _ => digits,
            };
            <$ty>::from_str_radix(&format!("{sign}{digits}"), radix)
        }
    )*};
}

int_parsers! {
    parse_i8 => i8,
    parse_i16 => i16,
    parse_i32 => i32,
    parse_i64 => i64,
    parse_isize => isize,
    parse_u8 => u8,
    parse_u16 => u16,
    parse_u32 => u32,
    parse_u64 => u64,
    parse_usize => usize,
}

pub fn parse_f32(s: &str) -> Result<f32, ParseFloatError> {
    s.parse()
}

pub fn parse_f64(s: &str) -> Result<f64, ParseFloatError> {
    s.parse()
}

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    })
}

/// Parse a duration such as `"300ms"`, `"1.5h"` or `"2h45m"`.
///
/// Each component is a decimal number followed by one of `ns`, `us` (or `µs`),
/// `ms`, `s`, `m`, `h`. `"0"` needs no unit. Negative durations are rejected.
pub fn parse_duration(s: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::new(s, "duration");

    let mut rest = s.strip_prefix('+').unwrap_or(s);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        rest = tail;

        let unit = unit_nanos(unit).ok_or_else(invalid)?;
        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(unit).ok_or_else(invalid)?;
        if !frac.is_empty() {
            let scale = 10u128
                .checked_pow(u32::try_from(frac.len()).map_err(|_| invalid())?)
                .ok_or_else(invalid)?;
            let frac: u128 = frac.parse().map_err(|_| invalid())?;
            nanos += frac.checked_mul(unit).ok_or_else(invalid)? / scale;
        }
        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    let secs = u64::try_from(total / 1_000_000_000).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// Parse an RFC 3339 timestamp, normalized to UTC.
pub fn parse_datetime_utc(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Parse an RFC 3339 timestamp, keeping its offset.
pub fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
}

pub fn parse_url(s: &str) -> Result<Url, url::ParseError> {
    Url::parse(s)
}

pub fn parse_ip(s: &str) -> Result<IpAddr, AddrParseError> {
    s.parse()
}

pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr, AddrParseError> {
    s.parse()
}

pub fn parse_ipv6(s: &str) -> Result<Ipv6Addr, AddrParseError> {
    s.parse()
}

pub fn parse_socket_addr(s: &str) -> Result<SocketAddr, AddrParseError> {
    s.parse()
}

/// A hardware address: IEEE 802 MAC-48, EUI-48, EUI-64 or a 20-octet
/// IP over InfiniBand link-layer address.
///
/// Parses the forms
/// - `00:00:5e:00:53:01` or `00-00-5e-00-53-01` (2 hex digits per group)
/// - `0000.5e00.5301` (4 hex digits per group)
///
/// with 6, 8 or 20 octets in total. Displays as lower-case, colon separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MacAddr(Vec<u8>);

impl MacAddr {
    pub fn octets(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for MacAddr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::new(s, "MAC address");
        let bytes = s.as_bytes();
        let (group, separator) = match (bytes.get(2), bytes.get(4)) {
            (Some(b':'), _) => (2, ':'),
            (Some(b'-'), _) => (2, '-'),
            (_, Some(b'.')) => (4, '.'),
            _ => return Err(invalid()),
        };

        let digit = |b: u8| char::from(b).to_digit(16).ok_or_else(invalid);
        let mut octets = Vec::with_capacity(20);
        for part in s.split(separator) {
            if part.len() != group {
                return Err(invalid());
            }
            for pair in part.as_bytes().chunks(2) {
                // Both digits are < 16, so the value fits in a byte
                octets.push((digit(pair[0])? * 16 + digit(pair[1])?) as u8);
            }
        }

        match octets.len() {
            6 | 8 | 20 => Ok(Self(octets)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, octet) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{octet:02x}")?;
        }
        Ok(())
    }
}

pub fn parse_mac(s: &str) -> Result<MacAddr, ParseError> {
    s.parse()
}

pub fn parse_path(s: &str) -> Result<PathBuf, Infallible> {
    Ok(PathBuf::from(s))
}

/// The raw bytes of the value.
pub fn parse_bytes(s: &str) -> Result<Vec<u8>, Infallible> {
    Ok(s.as_bytes().to_vec())
}

/// Comma-separated list with surrounding whitespace trimmed from each item.
///
/// An empty string yields an empty list.
pub fn parse_list(s: &str) -> Result<Vec<String>, Infallible> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(s.split(',').map(|item| item.trim().to_string()).collect())
}
