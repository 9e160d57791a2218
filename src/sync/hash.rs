//! Content fingerprinting for recipes.
//!
//! A recipe's fingerprint is the SHA256 of its canonical JSON form with the
//! `hash` field removed. The canonical form is the one Paprika export tooling
//! writes: keys sorted at every level, `", "` and `": "` separators, and every
//! non-ASCII character escaped as `\uXXXX`, floats in Python `repr` form.
//! Matching it byte for byte is what makes exporter-written hashes
//! reproducible.

use std::fmt::Write as _;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::model::SourceRecord;

/// Name of the field excluded from the fingerprint.
const HASH_FIELD: &str = "hash";

/// Compute the fingerprint of a recipe, ignoring its stored hash.
///
/// # Errors
///
/// Returns an error if the record cannot be converted to JSON.
pub fn fingerprint(record: &SourceRecord) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.remove(HASH_FIELD);
    }
    Ok(sha256_hex(&canonical_json(&value)))
}

/// Whether the stored hash matches the recomputed fingerprint.
///
/// # Errors
///
/// Returns an error if the record cannot be converted to JSON.
pub fn verify(record: &SourceRecord) -> serde_json::Result<bool> {
    Ok(!has_changed(&fingerprint(record)?, Some(&record.hash)))
}

/// Copy of the record with its hash replaced by the recomputed fingerprint.
///
/// # Errors
///
/// Returns an error if the record cannot be converted to JSON.
pub fn with_recomputed_hash(record: &SourceRecord) -> serde_json::Result<SourceRecord> {
    let hash = fingerprint(record)?;
    Ok(SourceRecord {
        hash,
        ..record.clone()
    })
}

/// SHA256 of any serializable value's canonical JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be converted to JSON.
pub fn content_hash<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(sha256_hex(&canonical_json(&serde_json::to_value(value)?)))
}

/// Check if content has changed relative to a stored hash.
///
/// Returns `true` if there is no stored hash or it differs.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Render a JSON value in canonical form.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => match n.as_f64().filter(|_| n.is_f64()) {
            Some(float) => write_float(out, float),
            None => out.push_str(&n.to_string()),
        },
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(out, key);
                out.push_str(": ");
                write_value(out, &map[key]);
            }
            out.push('}');
        }
    }
}

/// Python `repr` of a float: the shortest round-trip digits, in scientific
/// form only when the decimal exponent is below -4 or at least 16.
fn write_float(out: &mut String, value: f64) {
    let sci = format!("{:e}", value.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if value.is_sign_negative() {
        out.push('-');
    }
    if (-4..16).contains(&exp) {
        if exp < 0 {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', exp.unsigned_abs() as usize - 1));
            out.push_str(&digits);
        } else {
            let int_len = exp.unsigned_abs() as usize + 1;
            if digits.len() > int_len {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            } else {
                out.push_str(&digits);
                out.extend(std::iter::repeat_n('0', int_len - digits.len()));
                out.push_str(".0");
            }
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exp < 0 { '-' } else { '+' };
        let _ = write!(out, "e{sign}{:02}", exp.unsigned_abs());
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing to a String cannot fail.
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
}
