//! Reconciliation: merge normalized proposals into the schedule.
//!
//! Fill-blanks-then-append: manually placed empty rows are consumed as
//! slots first (preserving their ids, numbers and board assignment),
//! and only the overflow becomes new circuits. Non-blank rows are
//! never overwritten.

use tracing::info;

use crate::engine::Schedule;
use crate::ingest::normalize::{estimate_points_served, normalize_proposal, NormalizedProposal};
use crate::ingest::proposal::CircuitProposal;
use crate::model::{Circuit, MAIN_BOARD_ID};

/// What one ingestion run did, for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub filled: usize,
    pub appended: usize,
}

/// Normalize proposals and merge them into the schedule.
///
/// With `board_id = Some(b)` only board b's blanks are fillable and
/// overflow lands on b; `None` works over the whole schedule and
/// appends to the main board.
pub fn ingest_proposals(
    schedule: &mut Schedule,
    proposals: &[CircuitProposal],
    board_id: Option<&str>,
) -> IngestSummary {
    let target_board = board_id.unwrap_or(MAIN_BOARD_ID).to_string();

    let mut blank_slots: Vec<usize> = schedule
        .circuits
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.is_blank() && board_id.map(|b| c.board_id == b).unwrap_or(true)
        })
        .map(|(i, _)| i)
        .collect();
    blank_slots.reverse(); // pop() consumes in schedule order

    let mut filled = 0;
    let mut appended = 0;

    for proposal in proposals {
        let normalized = normalize_proposal(proposal);

        if let Some(slot) = blank_slots.pop() {
            let circuit = &mut schedule.circuits[slot];
            write_proposal_into(circuit, &normalized);
            filled += 1;
        } else {
            let number = (schedule.circuits_for_board(&target_board).len() + 1).to_string();
            let mut circuit = Circuit::blank(&number, &target_board);
            write_proposal_into(&mut circuit, &normalized);
            schedule.circuits.push(circuit);
            appended += 1;
        }
    }

    info!(filled, appended, board = %target_board, "AI proposals ingested");
    IngestSummary { filled, appended }
}

/// Free-text parser collaborator path: the records arrive already
/// shaped as circuits, so they are appended as-is with fresh ids and
/// per-board numbers. No blank-slot filling.
pub fn append_parsed_circuits(
    schedule: &mut Schedule,
    circuits: Vec<Circuit>,
    board_id: &str,
) -> usize {
    let board_id = if schedule.board(board_id).is_some() {
        board_id
    } else {
        MAIN_BOARD_ID
    };
    let count = circuits.len();
    for parsed in circuits {
        let appended = schedule.add_circuit(board_id, Some(parsed));
        let id = appended.id.clone();
        schedule.update_field(&id, crate::model::Field::AutoFilled, "true");
    }
    count
}

/// Write every schedule-facing value of a normalized proposal into a
/// circuit, leaving identity, numbering and board assignment alone.
fn write_proposal_into(circuit: &mut Circuit, n: &NormalizedProposal) {
    let is_ring = n.is_ring();

    circuit.circuit_description = n.circuit_description.clone();
    circuit.circuit_type = n.circuit_type.clone();
    circuit.reference_method = n.reference_method.clone();
    circuit.live_size = n.live_size.clone();
    circuit.cpc_size = n.cpc_size.clone();
    circuit.cable_size = n.live_size.clone();
    circuit.protective_device_type = n.protective_device_type.clone();
    circuit.protective_device_curve = n.protective_device_curve.clone();
    circuit.protective_device_rating = n.protective_device_rating.clone();
    circuit.protective_device_ka_rating = n.protective_device_ka_rating.clone();
    circuit.protective_device_location = "Consumer Unit".to_string();
    circuit.bs_standard = n.bs_standard.clone();
    circuit.protective_device = format!(
        "{} {}",
        n.protective_device_type, n.protective_device_rating
    )
    .trim()
    .to_string();
    circuit.max_zs = n.max_zs.clone();
    circuit.phase_type = n.phase_type.clone();

    // Ring continuity columns only apply to ring finals.
    if !is_ring {
        circuit.ring_continuity_live = "N/A".to_string();
        circuit.ring_continuity_neutral = "N/A".to_string();
    }

    circuit.insulation_test_voltage = "500V".to_string();
    circuit.polarity = "Satisfactory".to_string();
    circuit.functional_testing = "Satisfactory".to_string();
    circuit.points_served = estimate_points_served(&n.circuit_description, &n.circuit_type);
    circuit.rcd_rating = if n.requires_rcd() {
        "30mA".to_string()
    } else {
        String::new()
    };

    let confidence = if n.confidence.is_empty() {
        "unknown"
    } else {
        &n.confidence
    };
    circuit.notes = format!("AI detected ({confidence} confidence) - Please verify all values");
    circuit.auto_filled = true;
}
