//! Minimal jq-style field extraction and assertion predicates.
//!
//! Paths are dot-separated with optional array indices: `picks[0].tier`,
//! `engine_scores[3]`, `status`. This covers every extraction the audit
//! suites need; anything fancier belongs in the suite itself.

use serde_json::Value;

/// One parsed path segment: a key and optional index.
#[derive(Debug, PartialEq, Eq)]
struct Segment<'a> {
    key: &'a str,
    index: Option<usize>,
}

fn parse_segment(raw: &str) -> Option<Segment<'_>> {
    if let Some(open) = raw.find('[') {
        let close = raw.rfind(']')?;
        if close < open {
            return None;
        }
        let index = raw[open + 1..close].parse::<usize>().ok()?;
        Some(Segment {
            key: &raw[..open],
            index: Some(index),
        })
    } else {
        Some(Segment { key: raw, index: None })
    }
}

/// Extract the value at `path`, or `None` if any segment is missing.
pub fn extract<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for raw in path.split('.') {
        let seg = parse_segment(raw)?;
        if !seg.key.is_empty() {
            current = current.get(seg.key)?;
        }
        if let Some(idx) = seg.index {
            current = current.get(idx)?;
        }
    }
    Some(current)
}

/// Field must exist and be non-null.
pub fn require_field(value: &Value, path: &str) -> Result<(), String> {
    match extract(value, path) {
        Some(Value::Null) | None => Err(format!("missing field: {path}")),
        Some(_) => Ok(()),
    }
}

/// Field must be a number within `[min, max]` inclusive.
pub fn require_number_in(value: &Value, path: &str, min: f64, max: f64) -> Result<(), String> {
    let v = extract(value, path).ok_or_else(|| format!("missing field: {path}"))?;
    let n = v
        .as_f64()
        .ok_or_else(|| format!("{path} is not a number: {v}"))?;
    if n < min || n > max {
        return Err(format!("{path} = {n} outside [{min}, {max}]"));
    }
    Ok(())
}

/// Field must be an array with at least one element.
pub fn require_nonempty_array(value: &Value, path: &str) -> Result<usize, String> {
    let v = extract(value, path).ok_or_else(|| format!("missing field: {path}"))?;
    let arr = v
        .as_array()
        .ok_or_else(|| format!("{path} is not an array"))?;
    if arr.is_empty() {
        return Err(format!("{path} is empty"));
    }
    Ok(arr.len())
}

/// Field must be a string drawn from the allowed set.
pub fn require_string_in(value: &Value, path: &str, allowed: &[&str]) -> Result<String, String> {
    let v = extract(value, path).ok_or_else(|| format!("missing field: {path}"))?;
    let s = v
        .as_str()
        .ok_or_else(|| format!("{path} is not a string: {v}"))?;
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(s)) {
        Ok(s.to_string())
    } else {
        Err(format!("{path} = {s:?} not in {allowed:?}"))
    }
}

/// Field must equal the expected string exactly.
pub fn require_string_eq(value: &Value, path: &str, expected: &str) -> Result<(), String> {
    let v = extract(value, path).ok_or_else(|| format!("missing field: {path}"))?;
    let s = v
        .as_str()
        .ok_or_else(|| format!("{path} is not a string: {v}"))?;
    if s == expected {
        Ok(())
    } else {
        Err(format!("{path} = {s:?}, expected {expected:?}"))
    }
}
