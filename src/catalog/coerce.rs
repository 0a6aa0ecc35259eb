// Coercion of loosely typed form and JSON input.

use serde_json::Value;

const TRUE_SPELLINGS: [&str; 4] = ["true", "1", "on", "yes"];
const FALSE_SPELLINGS: [&str; 4] = ["false", "0", "off", "no"];

/// True when `s` is one of the affirmative spellings, ignoring case.
pub fn is_affirmative(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    TRUE_SPELLINGS.contains(&s.as_str())
}

/// Interpret a JSON value as a boolean flag.
///
/// | input                               | result          |
/// |-------------------------------------|-----------------|
/// | `true` / `false`                    | itself          |
/// | number                              | nonzero → true  |
/// | `"true"`, `"1"`, `"on"`, `"yes"`    | true            |
/// | `"false"`, `"0"`, `"off"`, `"no"`   | false           |
/// | any other string                    | non-empty → true|
/// | `null`                              | false           |
/// | array or object                     | true            |
///
/// String spellings are matched case-insensitively.
pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => {
            let lowered = s.to_ascii_lowercase();
            if FALSE_SPELLINGS.contains(&lowered.as_str()) {
                false
            } else if TRUE_SPELLINGS.contains(&lowered.as_str()) {
                true
            } else {
                !s.is_empty()
            }
        }
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse a price from a JSON number or numeric string.
///
/// Returns `None` for anything that is not a finite, non-negative number.
pub fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price >= 0.0).then_some(price)
}
