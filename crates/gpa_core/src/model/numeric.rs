//! Lenient number parsing for form fields.
//!
//! Form fields are free text. Both parsers read the longest numeric prefix
//! after leading whitespace and ignore whatever follows, so `"3 hrs"` reads
//! as `3`. Text without a numeric prefix yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;

static FLOAT_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
});
static INT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("valid int regex"));

/// Parses the leading decimal number of `text`.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let found = FLOAT_PREFIX_RE.find(text.trim_start())?;
    found
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses the leading integer of `text`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let found = INT_PREFIX_RE.find(text.trim_start())?;
    found.as_str().parse::<i64>().ok()
}
