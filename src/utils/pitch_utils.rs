//! Shared pitch spelling utilities
//!
//! Accidental symbols and microtone suffixes are parsed here so that pitch
//! classes (tuning entries) and full pitches (note input) accept exactly the
//! same spellings.

use crate::models::pitch::Accidental;

/// Parse accidental symbol from string
pub fn parse_accidental(symbol: &str) -> Option<Accidental> {
    match symbol {
        "" | "nat" | "♮" => Some(Accidental::Natural),
        "#" | "s" | "♯" => Some(Accidental::Sharp),
        "##" | "x" | "ss" | "♯♯" | "𝄪" => Some(Accidental::DoubleSharp),
        "b" | "♭" => Some(Accidental::Flat),
        "bb" | "♭♭" | "𝄫" => Some(Accidental::DoubleFlat),
        "hf" | "b/" => Some(Accidental::HalfFlat),
        _ => None,
    }
}

/// Get accidental symbol as string
pub fn accidental_symbol(accidental: Accidental) -> &'static str {
    match accidental {
        Accidental::Natural => "",
        Accidental::Sharp => "#",
        Accidental::DoubleSharp => "##",
        Accidental::Flat => "b",
        Accidental::HalfFlat => "hf",
        Accidental::DoubleFlat => "bb",
    }
}

/// Split an explicit microtone suffix such as `(+25)` or `(-31.5)` off a spelling
///
/// Returns the remaining spelling and the offset in cents (0.0 when absent).
pub fn split_microtone(spelling: &str) -> Result<(&str, f64), String> {
    let trimmed = spelling.trim();
    if !trimmed.ends_with(')') {
        return Ok((trimmed, 0.0));
    }

    let open = trimmed
        .rfind('(')
        .ok_or_else(|| format!("Unbalanced microtone suffix in '{}'", spelling))?;
    let inner = &trimmed[open + 1..trimmed.len() - 1];
    let cents: f64 = inner
        .trim()
        .parse()
        .map_err(|_| format!("Invalid microtone offset '{}' in '{}'", inner, spelling))?;

    if !cents.is_finite() {
        return Err(format!("Microtone offset must be finite in '{}'", spelling));
    }

    Ok((&trimmed[..open], cents))
}

/// Format a microtone offset as a spelling suffix, empty when zero
pub fn microtone_suffix(cents: f64) -> String {
    if cents == 0.0 {
        String::new()
    } else {
        format!("({:+})", cents)
    }
}
