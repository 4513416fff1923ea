//! Proposal normalization: raw AI output to schedule-ready values.
//!
//! Runs once per proposal, before reconciliation. The order matters:
//! the base device type feeds the BS standard, which with the curve
//! and rating feeds the max-Zs derivation.

use crate::ingest::proposal::CircuitProposal;
use crate::reference::{
    base_device_type, default_bs_standard, fix_device_type_naming, max_zs_for_device,
    normalise_cable_size, normalise_rating, normalise_reference_method, twin_and_earth_cpc_for,
};

/// A proposal after normalization, ready for the reconciler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedProposal {
    pub circuit_description: String,
    pub circuit_type: String,
    pub reference_method: String,
    pub live_size: String,
    pub cpc_size: String,
    pub protective_device_type: String,
    pub protective_device_curve: String,
    pub protective_device_rating: String,
    pub protective_device_ka_rating: String,
    pub bs_standard: String,
    pub max_zs: String,
    pub phase_type: String,
    pub confidence: String,
}

impl NormalizedProposal {
    pub fn is_ring(&self) -> bool {
        self.circuit_type.to_lowercase().contains("ring")
    }

    /// BS 7671 Section 411.3.3 keywords: sockets, bathrooms and
    /// outdoor circuits need 30 mA additional protection, as does any
    /// circuit whose device is already residual-current.
    pub fn requires_rcd(&self) -> bool {
        let desc = self.circuit_description.to_lowercase();
        let ctype = self.circuit_type.to_lowercase();
        let device = self.protective_device_type.to_uppercase();
        ctype.contains("socket")
            || desc.contains("socket")
            || desc.contains("bathroom")
            || desc.contains("outdoor")
            || desc.contains("garden")
            || device.contains("RCD")
            || device.contains("RCBO")
    }
}

/// Normalize one raw proposal.
pub fn normalize_proposal(proposal: &CircuitProposal) -> NormalizedProposal {
    // Steps in dependency order: device fix-up and base extraction,
    // then methods/ratings/sizes, then the derivations built on them.
    let fixed_device = fix_device_type_naming(&proposal.protective_device_type);
    let base_device = base_device_type(&fixed_device);

    let curve = if !proposal.protective_device_curve.is_empty() {
        proposal.protective_device_curve.clone()
    } else {
        proposal.curve.clone()
    };
    let rating = normalise_rating(&proposal.protective_device_rating);

    let live_size = normalise_cable_size(&proposal.live_size);
    // The T&E table always wins over whatever CPC the scan guessed.
    let cpc_size = twin_and_earth_cpc_for(&live_size);

    // Keep a proposal BS standard only when it is already in combined
    // "Device (BS ...)" form.
    let bs_standard = if proposal.bs_standard.contains('(') {
        proposal.bs_standard.clone()
    } else {
        default_bs_standard(&base_device)
    };

    let max_zs = max_zs_for_device(&bs_standard, &curve, &rating);

    let ka_rating = if proposal.protective_device_ka_rating.is_empty() {
        "6kA".to_string()
    } else {
        proposal.protective_device_ka_rating.clone()
    };

    NormalizedProposal {
        circuit_description: proposal.description().to_string(),
        circuit_type: proposal.circuit_type.clone(),
        reference_method: normalise_reference_method(&proposal.reference_method),
        live_size,
        cpc_size,
        protective_device_type: base_device,
        protective_device_curve: curve,
        protective_device_rating: rating,
        protective_device_ka_rating: ka_rating,
        bs_standard,
        max_zs,
        phase_type: proposal.phase_type.clone(),
        confidence: proposal.confidence.clone(),
    }
}

/// Rough points-served estimate from the circuit description. An
/// explicit count in the text wins; otherwise typical counts per
/// circuit kind, with "1" for fixed appliances.
pub fn estimate_points_served(description: &str, circuit_type: &str) -> String {
    let text = format!("{} {}", description, circuit_type).to_lowercase();

    // "6 x downlights", "10 sockets" style explicit counts.
    let mut digits = String::new();
    for word in text.split_whitespace() {
        if word.chars().all(|c| c.is_ascii_digit()) && !word.is_empty() {
            digits = word.to_string();
            break;
        }
    }
    if !digits.is_empty() {
        return digits;
    }

    if text.contains("ring") {
        return "10".to_string();
    }
    if text.contains("light") {
        return "8".to_string();
    }
    if text.contains("socket") {
        return "6".to_string();
    }
    if text.contains("cooker")
        || text.contains("shower")
        || text.contains("immersion")
        || text.contains("boiler")
        || text.contains("oven")
        || text.contains("hob")
    {
        return "1".to_string();
    }
    "1".to_string()
}
