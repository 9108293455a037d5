// Utility helpers for parsing and basic formatting.
//
// This module centralizes the "dirty" number handling from transport
// records so the rest of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in exported data (commas, spaces, text).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed, including
///   `NaN` and infinities.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// Transport records are produced by more than one backend version, so a
// numeric field may arrive as a number, a numeric string, null, or junk.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Num(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Serde adapter for optional numeric fields that never fails: anything
/// that is not a finite number (or a string holding one) becomes `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Lenient>::deserialize(deserializer)?;
    Ok(match value {
        Some(Lenient::Num(n)) if n.is_finite() => Some(n),
        Some(Lenient::Text(s)) => parse_f64_safe(Some(&s)),
        _ => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientText {
    Text(String),
    Int(i64),
    Num(f64),
    Other(IgnoredAny),
}

/// Serde adapter for optional text fields that never fails: numbers are
/// rendered as text (`42` becomes `"42"`), any other non-string is `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientText>::deserialize(deserializer)?;
    Ok(match value {
        Some(LenientText::Text(s)) => Some(s),
        Some(LenientText::Int(n)) => Some(n.to_string()),
        Some(LenientText::Num(n)) if n.is_finite() => Some(n.to_string()),
        _ => None,
    })
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.5`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages, e.g. `9,855 reports loaded`.
    n.to_formatted_string(&Locale::en)
}

/// Shorten free text for table cells, appending `...` when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
