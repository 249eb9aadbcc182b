//! Parsing of scraped text values
//!
//! Host markup carries prices, discounts and review scores as display text.
//! Everything here is lenient: malformed input degrades to zero or "no match"
//! instead of an error.

use std::sync::LazyLock;

use regex::Regex;

/// First percentage in a text, e.g. "87% of the 1,024 user reviews".
#[allow(clippy::expect_used)]
static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3})%").expect("valid regex")
});

/// "Demo" / "Prologue" qualifying a title: preceded by a separator, or the whole title.
#[allow(clippy::expect_used)]
static DEMO_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\W*(?:demo|prologue)\W*$|\W(?:demo|prologue)\b").expect("valid regex")
});

// =============================================================================
// Numbers
// =============================================================================

/// Convert display text to a number.
///
/// The first comma is read as a decimal separator, every character other than
/// digits and points is dropped, and the longest leading decimal prefix is
/// parsed. Empty or digit-less text yields `0.0`.
pub fn to_float(text: &str) -> f64 {
    let normalized = text.replacen(',', ".", 1);
    let cleaned: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_point = false;
    for (i, c) in cleaned.char_indices() {
        if c == '.' {
            if seen_point {
                break;
            }
            seen_point = true;
        }
        end = i + 1;
    }

    cleaned[..end].parse::<f64>().unwrap_or(0.0)
}

/// Extract the first percentage value from a text. Returns `0.0` if none.
pub fn extract_percentage(text: &str) -> f64 {
    PERCENTAGE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Check whether a title names a demo or prologue release.
#[inline]
pub fn is_demo_title(title: &str) -> bool {
    DEMO_TITLE.is_match(title)
}

/// `min <= value <= max`, with `None` bounds unbounded.
#[inline]
pub fn in_range(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Clamp a number input value to its `min`/`max` attributes.
pub fn clamp_to_limits(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    if let Some(max) = max {
        if value > max {
            return max;
        }
    }
    if let Some(min) = min {
        if value < min {
            return min;
        }
    }
    value
}

// =============================================================================
// Display
// =============================================================================

/// Label shown next to a percentage slider.
pub fn slider_display(value: f64, min: f64) -> String {
    if value <= min {
        "Any".to_string()
    } else if value < 100.0 {
        format!("{value}% or more")
    } else {
        "100%".to_string()
    }
}
