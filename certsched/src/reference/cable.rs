//! Cable size canonicalization and twin-and-earth CPC sizing.
//!
//! Live conductor sizes arrive as free text ("1.5mm", "2.5 mm²",
//! "4mm2"); the schedule stores the bare numeric token. The CPC for
//! flat twin-and-earth cable is fixed by the cable construction, so it
//! is always derived from the live size rather than trusted from an
//! AI proposal.

/// Canonical live-conductor csa tokens accepted by the schedule, mm².
pub const CANONICAL_SIZES: &[&str] = &[
    "1.0", "1.5", "2.5", "4.0", "6.0", "10.0", "16.0", "25.0", "35.0",
];

/// Reduce a free-text conductor size to its canonical token.
///
/// Returns an empty string when no numeric size can be extracted.
pub fn normalise_cable_size(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    // Keep only the leading number; "2.5mm² T&E" -> "2.5".
    let numeric: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if numeric.is_empty() {
        return String::new();
    }

    let value: f64 = match numeric.parse() {
        Ok(v) => v,
        Err(_) => return String::new(),
    };

    // Snap to the nearest canonical token; "1" -> "1.0", "4" -> "4.0".
    for size in CANONICAL_SIZES {
        let canonical: f64 = size.parse().expect("canonical sizes parse");
        if (value - canonical).abs() < 0.05 {
            return (*size).to_string();
        }
    }
    String::new()
}

/// CPC csa for flat twin-and-earth cable with the given live size.
///
/// Fixed by the cable construction (BS 6004 flat T&E); an unknown live
/// size yields an empty string rather than a guess.
pub fn twin_and_earth_cpc_for(live_size: &str) -> String {
    match live_size {
        "1.0" => "1.0",
        "1.5" => "1.0",
        "2.5" => "1.5",
        "4.0" => "1.5",
        "6.0" => "2.5",
        "10.0" => "4.0",
        "16.0" => "6.0",
        _ => "",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_unit_suffixes() {
        assert_eq!(normalise_cable_size("1.5mm"), "1.5");
        assert_eq!(normalise_cable_size("2.5 mm²"), "2.5");
        assert_eq!(normalise_cable_size("4mm2"), "4.0");
        assert_eq!(normalise_cable_size("10"), "10.0");
    }

    #[test]
    fn rejects_unparseable_sizes() {
        assert_eq!(normalise_cable_size(""), "");
        assert_eq!(normalise_cable_size("unknown"), "");
        assert_eq!(normalise_cable_size("3.1"), "");
    }

    #[test]
    fn cpc_follows_te_construction() {
        assert_eq!(twin_and_earth_cpc_for("1.5"), "1.0");
        assert_eq!(twin_and_earth_cpc_for("2.5"), "1.5");
        assert_eq!(twin_and_earth_cpc_for("4.0"), "1.5");
        assert_eq!(twin_and_earth_cpc_for("6.0"), "2.5");
        assert_eq!(twin_and_earth_cpc_for("25.0"), "");
    }
}
