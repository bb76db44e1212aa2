//! Semantic format validators
//!
//! Functions backing the `/format` option. Each returns a constraint
//! [`ValidationError`] without a type name; the caller attaches the type
//! being validated.

use std::net::{Ipv4Addr, Ipv6Addr};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use url::Url;

use crate::error::{ValidationError, ValidationErrorKind};

/// String formats understood by [`string_format`]
pub const STRING_FORMATS: &[&str] = &[
    "date-time",
    "date",
    "time",
    "email",
    "idn-email",
    "hostname",
    "idn-hostname",
    "ipv4",
    "ipv6",
    "uri",
    "uri-reference",
    "iri",
    "iri-reference",
    "uri-template",
    "json-pointer",
    "relative-json-pointer",
    "regex",
];

/// Binary formats understood by [`decode_binary`]
pub const BINARY_FORMATS: &[&str] = &["eui", "ipv4-addr", "ipv6-addr", "x", "b"];

/// Array formats understood by [`split_array`]
pub const ARRAY_FORMATS: &[&str] = &["ipv4-net", "ipv6-net"];

/// Number formats; accepted without a value check
pub const NUMBER_FORMATS: &[&str] = &["f16", "f32", "f64"];

// =============================================================================
// Patterns
// =============================================================================

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$").unwrap()
});

static IDN_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap());

static HOSTNAME_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap());

static IDN_HOSTNAME_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}](?:[\p{L}\p{N}\p{M}-]*[\p{L}\p{N}\p{M}])?$").unwrap());

static URI_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[^{}]|\{[+#./;?&=,!@|]?[A-Za-z0-9_.%,:*]+\})*$").unwrap());

static JSON_POINTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:/(?:[^~/]|~[01])*)*$").unwrap());

static RELATIVE_JSON_POINTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/(?:[^~/]|~[01])*)*)$").unwrap());

static HEX_BINARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[0-9a-fA-F]{2})*$").unwrap());

static EUI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{2}(?:[:-][0-9a-fA-F]{2}){5}(?:(?:[:-][0-9a-fA-F]{2}){2})?$").unwrap()
});

static INT_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([iu])([1-9][0-9]*)$").unwrap());

fn unknown(format: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::Constraint,
        format!("unknown format '{}'", format),
    )
}

fn invalid(format: &str, value: impl ToString) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::Constraint,
        format!("value is not a valid {}", format),
    )
    .with_expected(format)
    .with_actual(value)
}

// =============================================================================
// String Formats
// =============================================================================

/// Validate a string against a semantic format keyword
pub fn string_format(format: &str, value: &str) -> Result<(), ValidationError> {
    let ok = match format {
        "date-time" => DateTime::parse_from_rfc3339(value).is_ok(),
        "date" => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        "time" => DateTime::parse_from_rfc3339(&format!("1970-01-01T{}", value)).is_ok(),
        "email" => EMAIL.is_match(value),
        "idn-email" => IDN_EMAIL.is_match(value),
        "hostname" => is_hostname(value, &HOSTNAME_LABEL),
        "idn-hostname" => is_hostname(value, &IDN_HOSTNAME_LABEL),
        "ipv4" => value.parse::<Ipv4Addr>().is_ok(),
        "ipv6" => value.parse::<Ipv6Addr>().is_ok(),
        "uri" => Url::parse(value).map(|u| value.is_ascii() && !u.scheme().is_empty()).unwrap_or(false),
        "iri" => Url::parse(value).is_ok(),
        "uri-reference" => value.is_ascii() && is_reference(value),
        "iri-reference" => is_reference(value),
        "uri-template" => URI_TEMPLATE.is_match(value),
        "json-pointer" => JSON_POINTER.is_match(value),
        "relative-json-pointer" => RELATIVE_JSON_POINTER.is_match(value),
        "regex" => Regex::new(value).is_ok(),
        _ => return Err(unknown(format)),
    };
    if ok {
        Ok(())
    } else {
        Err(invalid(format, value))
    }
}

fn is_hostname(value: &str, label: &Regex) -> bool {
    let host = value.strip_suffix('.').unwrap_or(value);
    !host.is_empty() && host.len() <= 253 && host.split('.').all(|l| l.len() <= 63 && label.is_match(l))
}

fn is_reference(value: &str) -> bool {
    static BASE: Lazy<Url> = Lazy::new(|| Url::parse("http://reference.invalid/").unwrap());
    !value.chars().any(char::is_whitespace) && BASE.join(value).is_ok()
}

// =============================================================================
// Binary Formats
// =============================================================================

/// Decode the string form of a Binary value
///
/// Without a format the value is base64url; padding is tolerated.
pub fn decode_binary(format: Option<&str>, value: &str) -> Result<Vec<u8>, ValidationError> {
    match format {
        None => URL_SAFE_NO_PAD
            .decode(value.trim_end_matches('='))
            .map_err(|_| invalid("base64url", value)),
        Some("b") => STANDARD.decode(value).map_err(|_| invalid("base64", value)),
        Some("x") => hex_decode(value),
        Some("eui") => {
            if !EUI.is_match(value) {
                return Err(invalid("eui", value));
            }
            hex_decode(&value.replace([':', '-'], ""))
        }
        Some("ipv4-addr") => value
            .parse::<Ipv4Addr>()
            .map(|a| a.octets().to_vec())
            .map_err(|_| invalid("ipv4-addr", value)),
        Some("ipv6-addr") => value
            .parse::<Ipv6Addr>()
            .map(|a| a.octets().to_vec())
            .map_err(|_| invalid("ipv6-addr", value)),
        Some(other) => Err(unknown(other)),
    }
}

/// Check the octet length implied by a Binary format
pub fn binary_length(format: &str, len: usize) -> Result<(), ValidationError> {
    let ok = match format {
        "eui" => len == 6 || len == 8,
        "ipv4-addr" => len == 4,
        "ipv6-addr" => len == 16,
        "x" | "b" => true,
        _ => return Err(unknown(format)),
    };
    if ok {
        Ok(())
    } else {
        Err(invalid(format, format!("{} octets", len)))
    }
}

fn hex_decode(value: &str) -> Result<Vec<u8>, ValidationError> {
    if !HEX_BINARY.is_match(value) {
        return Err(invalid("hex", value));
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).map_err(|_| invalid("hex", value)))
        .collect()
}

// =============================================================================
// Numeric Formats
// =============================================================================

/// Validate an integer against a sized format (`i8`..`i64`, `u<N>`)
pub fn integer_format(format: &str, value: i128) -> Result<(), ValidationError> {
    let caps = INT_FORMAT.captures(format).ok_or_else(|| unknown(format))?;
    let bits: u32 = caps[2].parse().map_err(|_| unknown(format))?;
    let (min, max) = match &caps[1] {
        "i" if matches!(bits, 8 | 16 | 32 | 64) => {
            let half = 1i128 << (bits - 1);
            (-half, half - 1)
        }
        "u" if bits <= 64 => (0, (1i128 << bits) - 1),
        _ => return Err(unknown(format)),
    };
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format, value).with_reason(format!("value must be {} <= x <= {}", min, max)))
    }
}

/// Accept a real-number format keyword
pub fn number_format(format: &str) -> Result<(), ValidationError> {
    if NUMBER_FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(unknown(format))
    }
}

// =============================================================================
// Array Formats
// =============================================================================

/// Split the single-string form of a format-bearing Array
///
/// `"192.168.0.0/24"` under `ipv4-net` becomes `["192.168.0.0", 24]`.
/// Values that are already arrays pass through unchanged.
pub fn split_array(format: &str, value: &Value) -> Result<Value, ValidationError> {
    let max_prefix = match format {
        "ipv4-net" => 32,
        "ipv6-net" => 128,
        _ => return Err(unknown(format)),
    };
    let text = match value {
        Value::String(text) => text,
        other => return Ok(other.clone()),
    };
    let (addr, prefix) = text.split_once('/').ok_or_else(|| invalid(format, text))?;
    let prefix: i64 = prefix.parse().map_err(|_| invalid(format, text))?;
    if !(0..=max_prefix).contains(&prefix) {
        return Err(invalid(format, text)
            .with_reason(format!("prefix length must be 0 <= x <= {}", max_prefix)));
    }
    Ok(json!([addr, prefix]))
}

// =============================================================================
// Pattern
// =============================================================================

/// Compile a `%pattern` option, anchored at both ends
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Check a string against a compiled `%pattern`
pub fn pattern(re: &Regex, value: &str) -> Result<(), ValidationError> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            ValidationErrorKind::Constraint,
            "value does not match pattern",
        )
        .with_expected(re.as_str())
        .with_actual(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_formats() {
        assert!(string_format("ipv4", "213.153.57.102").is_ok());
        assert!(string_format("ipv4", "not-an-ip").is_err());
        assert!(string_format("ipv6", "2001:db8::1").is_ok());
        assert!(string_format("date-time", "2024-03-01T12:00:00Z").is_ok());
        assert!(string_format("date", "2024-02-30").is_err());
        assert!(string_format("time", "23:59:59Z").is_ok());
        assert!(string_format("email", "user@example.com").is_ok());
        assert!(string_format("email", "user.example.com").is_err());
        assert!(string_format("hostname", "www.example.com").is_ok());
        assert!(string_format("hostname", "-bad-.example").is_err());
        assert!(string_format("uri", "https://example.com/a?b=c").is_ok());
        assert!(string_format("uri", "relative/path").is_err());
        assert!(string_format("uri-reference", "relative/path").is_ok());
        assert!(string_format("json-pointer", "/a/b~1c").is_ok());
        assert!(string_format("json-pointer", "a/b").is_err());
        assert!(string_format("relative-json-pointer", "1/a").is_ok());
        assert!(string_format("regex", "^[a-z]+$").is_ok());
        assert!(string_format("regex", "(").is_err());
    }

    #[test]
    fn test_unknown_format() {
        let err = string_format("bogus", "x").unwrap_err();
        assert!(err.is(ValidationErrorKind::Constraint));
        assert!(err.message.contains("bogus"));
        assert!(number_format("f128").is_err());
        assert!(number_format("f32").is_ok());
    }

    #[test]
    fn test_decode_binary() {
        assert_eq!(decode_binary(None, "SGVsbG8").unwrap(), b"Hello".to_vec());
        assert_eq!(decode_binary(None, "SGVsbG8=").unwrap(), b"Hello".to_vec());
        assert_eq!(decode_binary(Some("x"), "0a1B").unwrap(), vec![0x0a, 0x1b]);
        assert!(decode_binary(Some("x"), "0").is_err());
        assert_eq!(decode_binary(Some("b"), "SGVsbG8=").unwrap(), b"Hello".to_vec());
        assert_eq!(
            decode_binary(Some("ipv4-addr"), "192.168.0.1").unwrap(),
            vec![192, 168, 0, 1]
        );
        assert_eq!(decode_binary(Some("eui"), "00:11:22:33:44:55").unwrap().len(), 6);
        assert!(decode_binary(Some("eui"), "00:11:22").is_err());
        assert!(binary_length("ipv6-addr", 16).is_ok());
        assert!(binary_length("ipv4-addr", 5).is_err());
    }

    #[test]
    fn test_integer_format() {
        assert!(integer_format("i8", -128).is_ok());
        assert!(integer_format("i8", 128).is_err());
        assert!(integer_format("u16", 65535).is_ok());
        assert!(integer_format("u16", -1).is_err());
        assert!(integer_format("i64", i64::MAX as i128).is_ok());
        assert!(integer_format("i12", 0).is_err());
        assert!(integer_format("u3", 7).is_ok());
        assert!(integer_format("u3", 8).is_err());
    }

    #[test]
    fn test_split_array() {
        assert_eq!(
            split_array("ipv4-net", &json!("10.0.0.0/8")).unwrap(),
            json!(["10.0.0.0", 8])
        );
        assert_eq!(
            split_array("ipv6-net", &json!(["2001:db8::", 32])).unwrap(),
            json!(["2001:db8::", 32])
        );
        assert!(split_array("ipv4-net", &json!("10.0.0.0/33")).is_err());
        assert!(split_array("ipv4-net", &json!("10.0.0.0")).is_err());
        assert!(split_array("csv", &json!("a/b")).is_err());
    }

    #[test]
    fn test_pattern() {
        let re = compile_pattern("[a-z]+").unwrap();
        assert!(pattern(&re, "abc").is_ok());
        assert!(pattern(&re, "abc1").is_err());
        assert!(pattern(&compile_pattern("a|b").unwrap(), "ab").is_err());
        assert!(compile_pattern("(").is_err());
    }
}
