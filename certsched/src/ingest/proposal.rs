//! Wire types for the AI vision collaborator.
//!
//! The vision service returns loosely-shaped JSON: most keys optional,
//! ratings with unit suffixes, device names as free text. Everything
//! is deserialized permissively here and cleaned up by the
//! normalization pipeline before it touches the schedule.

use serde::{Deserialize, Serialize};

/// One circuit as proposed by board-photo inference or the free-text
/// parser. All values raw; `normalize` owns the cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CircuitProposal {
    /// Way label read off the board, e.g. "Kitchen Sockets".
    pub label: String,
    pub circuit_description: String,
    pub circuit_type: String,
    /// Free-text device, e.g. "MCB Type B", "rcbo".
    pub protective_device_type: String,
    pub protective_device_curve: String,
    /// Alternate key some producers use for the curve.
    pub curve: String,
    /// May carry units: "32A".
    pub protective_device_rating: String,
    pub protective_device_ka_rating: String,
    /// May carry units: "2.5mm²".
    pub live_size: String,
    /// Ignored in favor of the T&E table.
    pub cpc_size: String,
    pub reference_method: String,
    pub bs_standard: String,
    /// `"1P"` / `"3P"` when the scan could tell.
    pub phase_type: String,
    /// Detection confidence tag: "high", "medium", "low".
    pub confidence: String,
}

impl CircuitProposal {
    /// Best available human label for the circuit.
    pub fn description(&self) -> &str {
        if !self.circuit_description.is_empty() {
            &self.circuit_description
        } else {
            &self.label
        }
    }
}

/// Board-level facts read from the same photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardScanMetadata {
    pub make: String,
    pub model: String,
    pub main_switch_rating: String,
    pub spd_fitted: bool,
    pub total_ways: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_json() {
        let json = r#"{"label":"Kitchen Sockets","protectiveDeviceType":"MCB","protectiveDeviceRating":"32A"}"#;
        let p: CircuitProposal = serde_json::from_str(json).unwrap();
        assert_eq!(p.label, "Kitchen Sockets");
        assert_eq!(p.protective_device_rating, "32A");
        assert!(p.live_size.is_empty());
        assert_eq!(p.description(), "Kitchen Sockets");
    }

    #[test]
    fn description_prefers_explicit_field() {
        let p = CircuitProposal {
            label: "Way 3".to_string(),
            circuit_description: "Upstairs Lights".to_string(),
            ..CircuitProposal::default()
        };
        assert_eq!(p.description(), "Upstairs Lights");
    }
}
