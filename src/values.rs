//! Lenient accessors over API payloads.
//!
//! The Screeps API omits fields freely and sometimes sends numbers as
//! strings. Every accessor here returns `None` (or the stated default)
//! instead of failing.

use serde_json::{Map, Value};

pub fn as_object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

pub fn value_as_non_empty_string(value: &Value) -> Option<String> {
    let text = value.as_str()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn map_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(value_as_non_empty_string)
}

pub fn map_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(value_as_f64)
}

/// `map_f64` with the default substituted when the key is absent or not numeric.
pub fn map_f64_or(value: &Value, key: &str, default: f64) -> f64 {
    map_f64(value, key).unwrap_or(default)
}

/// Items of the array under `key`, or an empty slice.
pub fn map_array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// The `error` message of a failed call, if the payload carries one.
pub fn payload_error(value: &Value) -> Option<String> {
    let error = as_object(value)?.get("error")?;
    match error {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Whole numbers print without a fraction, everything else with two decimals.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Integer rendering with `,` thousands separators, e.g. `45,000`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() || value.fract() != 0.0 {
        return format_number(value);
    }
    let whole = value as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if whole < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Integer percentage of `part` over `whole`; 0 when `whole` is not positive.
pub fn percent(part: f64, whole: f64) -> i64 {
    if whole <= 0.0 || !whole.is_finite() || !part.is_finite() {
        return 0;
    }
    (part * 100.0 / whole).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_may_arrive_as_strings() {
        let record = json!({ "energy": "150", "level": 2, "name": "  " });
        assert_eq!(map_f64(&record, "energy"), Some(150.0));
        assert_eq!(map_f64(&record, "level"), Some(2.0));
        assert_eq!(map_string(&record, "name"), None);
        assert_eq!(map_f64_or(&record, "missing", 3000.0), 3000.0);
    }

    #[test]
    fn payload_error_reads_sentinel() {
        assert_eq!(payload_error(&json!({ "error": "timed out" })).as_deref(), Some("timed out"));
        assert_eq!(payload_error(&json!({ "ok": 1 })), None);
        assert_eq!(payload_error(&json!([1, 2])), None);
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(10000.0), "10,000");
        assert_eq!(format_thousands(1215000.0), "1,215,000");
        assert_eq!(format_thousands(-45000.0), "-45,000");
        assert_eq!(format_thousands(1.5), "1.50");
    }

    #[test]
    fn percent_guards_zero_total() {
        assert_eq!(percent(10.0, 0.0), 0);
        assert_eq!(percent(1500.0, 3000.0), 50);
        assert_eq!(percent(1.0, 3.0), 33);
    }
}
