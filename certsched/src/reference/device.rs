//! Protective device classification and BS standard labels.

/// Base protective device kinds recognized on UK consumer units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Rcbo,
    Rcd,
    Mcb,
    Fuse,
}

impl DeviceKind {
    /// Classify a free-text device string by case-insensitive
    /// substring, preferring RCBO > RCD > MCB > Fuse. Returns `None`
    /// for anything else so callers can pass the text through verbatim.
    pub fn classify(raw: &str) -> Option<DeviceKind> {
        let upper = raw.to_uppercase();
        if upper.contains("RCBO") {
            Some(DeviceKind::Rcbo)
        } else if upper.contains("RCD") {
            Some(DeviceKind::Rcd)
        } else if upper.contains("MCB") {
            Some(DeviceKind::Mcb)
        } else if upper.contains("FUSE") {
            Some(DeviceKind::Fuse)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::Rcbo => "RCBO",
            DeviceKind::Rcd => "RCD",
            DeviceKind::Mcb => "MCB",
            DeviceKind::Fuse => "Fuse",
        }
    }

    /// Product standard for the device kind.
    pub fn bs_standard(&self) -> &'static str {
        match self {
            DeviceKind::Mcb => "BS EN 60898",
            DeviceKind::Rcbo => "BS EN 61009",
            DeviceKind::Rcd => "BS EN 61008",
            DeviceKind::Fuse => "BS 1361",
        }
    }

    /// MCBs and RCBOs carry a tripping curve; RCDs and fuses do not.
    pub fn requires_curve(&self) -> bool {
        matches!(self, DeviceKind::Mcb | DeviceKind::Rcbo)
    }
}

/// Base device label for free text: classified kind, or the input
/// verbatim when unrecognized ("MCB Type B" -> "MCB").
pub fn base_device_type(raw: &str) -> String {
    match DeviceKind::classify(raw) {
        Some(kind) => kind.label().to_string(),
        None => raw.to_string(),
    }
}

/// Combined label as shown on the certificate, e.g.
/// `"MCB (BS EN 60898)"`. Unrecognized device text falls back to the
/// MCB standard, matching what installers overwhelmingly fit.
pub fn default_bs_standard(device_type: &str) -> String {
    let kind = DeviceKind::classify(device_type).unwrap_or(DeviceKind::Mcb);
    format!("{} ({})", kind.label(), kind.bs_standard())
}

/// Map legacy "Type 1/2/3" device-curve naming onto the UK
/// "Type B/C/D" designations.
pub fn fix_device_type_naming(device_type: &str) -> String {
    let mut fixed = device_type.to_string();
    for (old_a, old_b, new) in [
        ("Type 1", "Type1", "Type B"),
        ("Type 2", "Type2", "Type C"),
        ("Type 3", "Type3", "Type D"),
    ] {
        if fixed.contains(old_a) {
            fixed = fixed.replace(old_a, new);
        }
        if fixed.contains(old_b) {
            fixed = fixed.replace(old_b, new);
        }
    }
    fixed
}

/// Valid tripping curves for MCB/RCBO devices.
pub const VALID_CURVES: &[&str] = &["B", "C", "D"];

/// Normalize a free-text installation reference method to the single
/// letters used on the schedule; "C" (clipped direct) is the default
/// for unrecognized text.
pub fn normalise_reference_method(method: &str) -> String {
    if method.is_empty() {
        return "C".to_string();
    }
    let lower = method.to_lowercase();
    if method.contains("103") || lower.contains("stud wall") {
        return "B".to_string();
    }
    if method.contains('C') || lower.contains("clipped") {
        return "C".to_string();
    }
    if method.contains('A') {
        return "A".to_string();
    }
    "C".to_string()
}

/// Strip everything but digits from a rating: "32A" -> "32".
pub fn normalise_rating(rating: &str) -> String {
    rating.chars().filter(|c| c.is_ascii_digit()).collect()
}
