//! Number rendering for axis labels and the status line.

/// Width of the status line value, in characters.
pub const STATUS_WIDTH: usize = 9;

/// Significant digits of the status line value.
const STATUS_PRECISION: usize = 4;

/// Formats a number so that it fits in `max_len` characters.
///
/// Values are rounded to the nearest integer and printed plainly when that
/// fits. Values that do not fit, and values with a magnitude below one, switch
/// to scientific notation with `max_len - 3` significant digits, losing
/// precision until the result fits.
pub fn format_number(n: f64, max_len: usize) -> String {
    if !n.is_finite() {
        return "#".repeat(max_len);
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let plain = format!("{:.0}", n.round());
    if plain.len() <= max_len && n.abs() >= 1.0 {
        return plain;
    }

    let digits = max_len.saturating_sub(3).max(1);
    for digits in (1..=digits).rev() {
        let s = format_scientific(n, digits);
        if s.len() <= max_len {
            return s;
        }
    }

    // Not even one significant digit fits.
    if n.abs() < 1.0 {
        "0".to_string()
    } else {
        "#".repeat(max_len)
    }
}

/// Formats the status line value, right-aligned in a fixed width.
pub fn format_status(n: f64) -> String {
    format!(
        "{:>width$}",
        format_general(n, STATUS_PRECISION),
        width = STATUS_WIDTH
    )
}

/// Formats a number like C's `%.<precision>G`.
///
/// Scientific notation is used when the decimal exponent is below -4 or at
/// least `precision`; otherwise fixed notation. Trailing zeros are dropped.
pub fn format_general(n: f64, precision: usize) -> String {
    if !n.is_finite() {
        return n.to_string().to_uppercase();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let precision = precision.max(1);
    let (_, exponent) = split_scientific(n, precision);
    if exponent < -4 || exponent >= precision as i32 {
        format_scientific(n, precision)
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    }
}

/// Scientific notation with `digits` significant digits, e.g. `1.5E-04`.
fn format_scientific(n: f64, digits: usize) -> String {
    let (mantissa, exponent) = split_scientific(n, digits);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{}E{}{:02}",
        trim_fraction(&mantissa),
        sign,
        exponent.unsigned_abs()
    )
}

/// Rounds to `digits` significant digits and returns mantissa and exponent.
fn split_scientific(n: f64, digits: usize) -> (String, i32) {
    let raw = format!("{:.*e}", digits.max(1) - 1, n);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
