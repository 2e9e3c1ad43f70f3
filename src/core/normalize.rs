//! Input normalization - prices, quantities, and product names.
//!
//! Pure functions turning raw user input into canonical forms. Invalid input
//! never produces an error here: prices degrade to `None` and quantities
//! degrade to the minimum of 1, which callers treat as ordinary values.

/// Parses a raw price string into a non-negative amount rounded to cents.
///
/// Accepts either `.` or `,` as the decimal separator. Empty input, negative
/// amounts, and anything that does not parse to a finite number yield `None`.
#[must_use]
pub fn to_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let n: f64 = trimmed.replace(',', ".").parse().ok()?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }

    Some(round2(n))
}

/// Clamps a raw quantity to a positive integer: floor, minimum 1.
/// Non-finite input defaults to 1.
#[must_use]
pub fn normalize_qty(raw: f64) -> u32 {
    if !raw.is_finite() {
        return 1;
    }

    let floored = raw.floor();
    if floored < 1.0 {
        1
    } else if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            floored as u32
        }
    }
}

/// Parses a raw quantity string, defaulting to 1 when it does not parse
/// to a positive integer.
#[must_use]
pub fn parse_qty(raw: &str) -> u32 {
    raw.trim().parse::<f64>().map_or(1, normalize_qty)
}

/// Canonical form of a product name for matching and search: trimmed,
/// internal whitespace collapsed, lowercased. Never used for display.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Display name for a user-created product: trimmed, first character
/// uppercased, the rest untouched.
#[must_use]
pub fn title_case(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Rounds to 2 decimal places, half away from zero. Applied only at
/// presentation and snapshot boundaries, never during accumulation.
#[must_use]
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}
