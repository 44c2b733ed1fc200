//! Coercion of the logged text values into numbers.
//!
//! The loggers write decimals with either a comma or a dot depending on the
//! locale of the machine, so both are accepted. Invalid cells become NAN and
//! are dropped or left as gaps by the callers.

/// trim, comma to dot, and parse; NAN on failure
pub fn to_numeric(s: &str) -> f64 {
    s.trim().replace(',', ".").parse().unwrap_or(f64::NAN)
}

/// as `to_numeric`, but first removes every character that is not a digit,
/// a dot or a minus sign, e.g. units or stray quotes ("23,5 %" -> 23.5)
pub fn to_numeric_clean(s: &str) -> f64 {
    let txt: String = s
        .trim()
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    match txt.as_str() {
        "" | "." | "-" | "-." | ".-" => f64::NAN,
        t => t.parse().unwrap_or(f64::NAN),
    }
}

pub fn column_to_numeric(cells: &[&str]) -> Vec<f64> {
    cells.iter().map(|c| to_numeric(c)).collect()
}

pub fn column_to_numeric_clean(cells: &[&str]) -> Vec<f64> {
    cells.iter().map(|c| to_numeric_clean(c)).collect()
}
