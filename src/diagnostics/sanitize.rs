use std::borrow::Cow;

use serde_json::Value;

/// Leading characters a spreadsheet treats as the start of a formula.
const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

/// Prefix written in front of a cell that would otherwise start a formula.
pub const NEUTRALIZER: char = '\'';

/// Neutralize spreadsheet formula injection in one text cell.
///
/// Applied to every text cell, including codes that look numeric: a cell
/// starting with `-` is prefixed like any other trigger.
pub fn sanitize_cell(text: &str) -> Cow<'_, str> {
    match text.chars().next() {
        Some(c) if FORMULA_TRIGGERS.contains(&c) => {
            let mut out = String::with_capacity(text.len() + 1);
            out.push(NEUTRALIZER);
            out.push_str(text);
            Cow::Owned(out)
        }
        _ => Cow::Borrowed(text),
    }
}

/// Coerce a position field to an integer.
///
/// Accepts integers, floats with an integral value and numeral-only strings
/// (optional sign, surrounding whitespace allowed). Everything else, including
/// values out of `i64` range, is unknown (`None`).
pub fn coerce_position(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else if let Some(f) = n.as_f64() {
                float_to_int(f)
            } else {
                None
            }
        }
        Value::String(s) => parse_numeral(s),
        _ => None,
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_numeral(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Render a coerced position as a CSV cell; unknown is an empty cell.
pub fn position_cell(pos: Option<i64>) -> String {
    pos.map(|p| p.to_string()).unwrap_or_default()
}
