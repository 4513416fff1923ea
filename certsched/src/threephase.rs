//! Three-phase grouping and load-balance estimation.
//!
//! Builds a per-circuit projection, detects 3-pole groups of
//! consecutive single-pole ways, and aggregates per-phase load for the
//! whole installation. The imbalance figure is the NEMA-style maximum
//! deviation from the average phase load, as a percentage of that
//! average, compared against the 10% guidance threshold; the neutral
//! current is the standard vector sum of three phase currents 120°
//! apart.

use serde::Serialize;
use tracing::debug;

use crate::model::Circuit;

/// Imbalance above this percentage of average phase load is flagged.
pub const IMBALANCE_THRESHOLD_PERCENT: f64 = 10.0;

/// Policy constant, not a regulatory number: warn when the estimated
/// neutral current exceeds this fraction of the per-phase rating.
pub const NEUTRAL_WARNING_RATIO: f64 = 0.8;

/// Lightweight projection of one circuit for grouping decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitProjection {
    /// Parsed `circuit_number`; positions drive phase assignment.
    pub position: u32,
    pub rating: String,
    pub device: String,
    pub label: String,
    pub three_phase: bool,
}

/// A detected 3-pole way: three consecutive single-pole positions
/// sharing one rating/device/label pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreePoleGroup {
    pub id: String,
    pub label: String,
    pub rating: String,
    pub positions: [u32; 3],
    pub phases: [&'static str; 3],
}

/// Whole-installation phase balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseBalance {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    /// `None` when every phase carries zero load.
    pub imbalance_percent: Option<f64>,
    pub is_compliant: bool,
    pub neutral_current: f64,
    pub warning: Option<String>,
}

pub fn project_circuit(circuit: &Circuit) -> CircuitProjection {
    CircuitProjection {
        position: circuit.circuit_number.trim().parse().unwrap_or(0),
        rating: circuit.protective_device_rating.clone(),
        device: circuit.protective_device_type.clone(),
        label: circuit.circuit_description.clone(),
        three_phase: circuit.is_three_phase(),
    }
}

/// Detect 3-pole groups: runs of three consecutive positions whose
/// rating, device and label match. A circuit explicitly flagged `3P`
/// is three-phase on its own and never consumed into a group.
pub fn detect_three_pole_groups(circuits: &[Circuit]) -> Vec<ThreePoleGroup> {
    let mut projections: Vec<CircuitProjection> = circuits
        .iter()
        .map(project_circuit)
        .filter(|p| p.position > 0 && !p.three_phase)
        .collect();
    projections.sort_by_key(|p| p.position);

    let mut groups = Vec::new();
    let mut i = 0;
    while i + 2 < projections.len() {
        let (a, b, c) = (&projections[i], &projections[i + 1], &projections[i + 2]);
        let consecutive = b.position == a.position + 1 && c.position == a.position + 2;
        let matching = !a.rating.is_empty()
            && a.rating == b.rating
            && b.rating == c.rating
            && a.device == b.device
            && b.device == c.device
            && a.label == b.label
            && b.label == c.label;

        if consecutive && matching {
            groups.push(ThreePoleGroup {
                id: format!("tp-{}", a.position),
                label: a.label.clone(),
                rating: a.rating.clone(),
                positions: [a.position, b.position, c.position],
                phases: ["L1", "L2", "L3"],
            });
            i += 3;
        } else {
            i += 1;
        }
    }
    debug!(groups = groups.len(), "3-pole groups detected");
    groups
}

fn parse_load(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

/// Aggregate per-phase load across the installation.
///
/// 3P circuits contribute their explicit `phase_balance_l1/l2/l3`
/// readings. 1P circuits fall back to a rough estimate: 50% of the
/// device rating, assigned round-robin to phase
/// `(circuit_number − 1) mod 3`.
pub fn calculate_phase_balance(circuits: &[Circuit]) -> PhaseBalance {
    let mut loads = [0.0f64; 3];

    for circuit in circuits {
        if circuit.is_three_phase() {
            loads[0] += parse_load(&circuit.phase_balance_l1);
            loads[1] += parse_load(&circuit.phase_balance_l2);
            loads[2] += parse_load(&circuit.phase_balance_l3);
        } else {
            let rating: f64 = circuit
                .protective_device_rating
                .trim()
                .parse()
                .unwrap_or(0.0);
            if rating > 0.0 {
                let position: u32 = circuit.circuit_number.trim().parse().unwrap_or(1);
                let phase = ((position.max(1) - 1) % 3) as usize;
                loads[phase] += rating * 0.5;
            }
        }
    }

    balance_from_loads(loads[0], loads[1], loads[2])
}

/// Balance figures from already-aggregated per-phase loads.
pub fn balance_from_loads(l1: f64, l2: f64, l3: f64) -> PhaseBalance {
    let max = l1.max(l2).max(l3);
    let avg = (l1 + l2 + l3) / 3.0;

    // Max deviation from the average, as a fraction of the average
    // (the NEMA unbalance definition).
    let imbalance_percent = if avg > 0.0 {
        let deviation = (l1 - avg)
            .abs()
            .max((l2 - avg).abs())
            .max((l3 - avg).abs());
        Some(deviation / avg * 100.0)
    } else {
        None
    };
    let is_compliant = imbalance_percent
        .map(|p| p <= IMBALANCE_THRESHOLD_PERCENT)
        .unwrap_or(true);

    let neutral_current = estimate_neutral_current(l1, l2, l3);
    let warning = if max > 0.0 && neutral_current > max * NEUTRAL_WARNING_RATIO {
        Some(format!(
            "Estimated neutral current {neutral_current:.1}A exceeds {:.0}% of the highest phase load ({max:.1}A) - check for unbalanced single-phase loads",
            NEUTRAL_WARNING_RATIO * 100.0
        ))
    } else {
        None
    };

    PhaseBalance {
        l1,
        l2,
        l3,
        imbalance_percent,
        is_compliant,
        neutral_current,
        warning,
    }
}

/// Vector sum of three phase currents 120° apart:
/// In = √(L1² + L2² + L3² − L1·L2 − L2·L3 − L3·L1).
pub fn estimate_neutral_current(l1: f64, l2: f64, l3: f64) -> f64 {
    (l1 * l1 + l2 * l2 + l3 * l3 - l1 * l2 - l2 * l3 - l3 * l1)
        .max(0.0)
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MAIN_BOARD_ID;

    fn circuit(number: &str, rating: &str, device: &str, label: &str) -> Circuit {
        let mut c = Circuit::blank(number, MAIN_BOARD_ID);
        c.protective_device_rating = rating.to_string();
        c.protective_device_type = device.to_string();
        c.circuit_description = label.to_string();
        c
    }

    fn three_phase_circuit(number: &str, l1: &str, l2: &str, l3: &str) -> Circuit {
        let mut c = Circuit::blank(number, MAIN_BOARD_ID);
        c.phase_type = "3P".to_string();
        c.phase_balance_l1 = l1.to_string();
        c.phase_balance_l2 = l2.to_string();
        c.phase_balance_l3 = l3.to_string();
        c
    }

    #[test]
    fn ten_ten_five_is_forty_percent_and_non_compliant() {
        let balance = balance_from_loads(10.0, 10.0, 5.0);
        let imbalance = balance.imbalance_percent.unwrap();
        assert!((imbalance - 40.0).abs() < 1e-9);
        assert!(!balance.is_compliant);
    }

    #[test]
    fn balanced_loads_are_compliant() {
        let balance = balance_from_loads(10.0, 10.0, 10.0);
        assert_eq!(balance.imbalance_percent, Some(0.0));
        assert!(balance.is_compliant);
        assert!(balance.neutral_current.abs() < 1e-9);
        assert!(balance.warning.is_none());
    }

    #[test]
    fn zero_load_gives_no_imbalance_figure() {
        let balance = balance_from_loads(0.0, 0.0, 0.0);
        assert_eq!(balance.imbalance_percent, None);
        assert!(balance.is_compliant);
    }

    #[test]
    fn imbalance_is_order_independent() {
        let a = balance_from_loads(10.0, 10.0, 5.0);
        let b = balance_from_loads(5.0, 10.0, 10.0);
        assert_eq!(a.imbalance_percent, b.imbalance_percent);
    }

    #[test]
    fn single_pole_circuits_round_robin_at_half_rating() {
        let circuits = vec![
            circuit("1", "32", "MCB", "Ring 1"), // L1: 16
            circuit("2", "6", "MCB", "Lights"),  // L2: 3
            circuit("3", "40", "MCB", "Shower"), // L3: 20
            circuit("4", "16", "MCB", "Garage"), // L1: 8
        ];
        let balance = calculate_phase_balance(&circuits);
        assert!((balance.l1 - 24.0).abs() < 1e-9);
        assert!((balance.l2 - 3.0).abs() < 1e-9);
        assert!((balance.l3 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_three_phase_readings_are_summed() {
        let circuits = vec![three_phase_circuit("1", "12", "11", "13")];
        let balance = calculate_phase_balance(&circuits);
        assert!((balance.l1 - 12.0).abs() < 1e-9);
        assert!((balance.l2 - 11.0).abs() < 1e-9);
        assert!((balance.l3 - 13.0).abs() < 1e-9);
    }

    #[test]
    fn neutral_current_vector_formula() {
        // One loaded phase: neutral equals the phase current.
        assert!((estimate_neutral_current(10.0, 0.0, 0.0) - 10.0).abs() < 1e-9);
        // Perfect balance cancels.
        assert!(estimate_neutral_current(7.0, 7.0, 7.0).abs() < 1e-9);
    }

    #[test]
    fn heavily_unbalanced_load_warns_about_neutral() {
        let balance = balance_from_loads(30.0, 0.0, 0.0);
        assert!(balance.warning.is_some());
    }

    #[test]
    fn detects_consecutive_matching_triples() {
        let circuits = vec![
            circuit("1", "32", "MCB", "Ring 1"),
            circuit("2", "16", "MCB", "Motor"),
            circuit("3", "16", "MCB", "Motor"),
            circuit("4", "16", "MCB", "Motor"),
            circuit("5", "6", "MCB", "Lights"),
        ];
        let groups = detect_three_pole_groups(&circuits);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].positions, [2, 3, 4]);
        assert_eq!(groups[0].phases, ["L1", "L2", "L3"]);
        assert_eq!(groups[0].rating, "16");
    }

    #[test]
    fn non_consecutive_or_mismatched_triples_do_not_group() {
        let circuits = vec![
            circuit("1", "16", "MCB", "Motor"),
            circuit("2", "16", "MCB", "Motor"),
            circuit("4", "16", "MCB", "Motor"), // gap at 3
        ];
        assert!(detect_three_pole_groups(&circuits).is_empty());

        let circuits = vec![
            circuit("1", "16", "MCB", "Motor"),
            circuit("2", "20", "MCB", "Motor"), // different rating
            circuit("3", "16", "MCB", "Motor"),
        ];
        assert!(detect_three_pole_groups(&circuits).is_empty());
    }

    #[test]
    fn explicit_3p_circuits_stay_out_of_grouping() {
        let mut a = circuit("1", "16", "MCB", "Motor");
        a.phase_type = "3P".to_string();
        let circuits = vec![
            a,
            circuit("2", "16", "MCB", "Motor"),
            circuit("3", "16", "MCB", "Motor"),
        ];
        assert!(detect_three_pole_groups(&circuits).is_empty());
    }
}
