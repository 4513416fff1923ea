//! Integration tests for the mutation engine invariants.

use certsched::prelude::*;
use certsched::MoveOutcome;

fn filled_schedule(n: usize) -> Schedule {
    let mut schedule = Schedule::default();
    for _ in 1..n {
        schedule.add_circuit(MAIN_BOARD_ID, None);
    }
    schedule
}

#[test]
fn designation_always_tracks_circuit_number() {
    let mut schedule = filled_schedule(3);
    let ids: Vec<String> = schedule.circuits.iter().map(|c| c.id.clone()).collect();

    schedule.update_field(&ids[0], Field::CircuitNumber, "12");
    schedule.update_field(&ids[1], Field::CircuitDesignation, "C99");
    schedule.move_circuit(&ids[2], 1);

    for circuit in &schedule.circuits {
        assert_eq!(
            circuit.circuit_designation,
            format!("C{}", circuit.circuit_number)
        );
    }
}

#[test]
fn legacy_mirroring_holds_after_any_update() {
    let mut schedule = Schedule::default();
    let id = schedule.circuits[0].id.clone();

    schedule.update_field(&id, Field::LiveSize, "2.5");
    schedule.update_field(&id, Field::ProtectiveDevice, "MCB 32A");
    let circuit = &schedule.circuits[0];
    assert_eq!(circuit.live_size, circuit.cable_size);
    assert_eq!(circuit.protective_device_rating, "32");

    schedule.update_field(&id, Field::CableSize, "4.0");
    schedule.update_field(&id, Field::ProtectiveDeviceRating, "40");
    let circuit = &schedule.circuits[0];
    assert_eq!(circuit.live_size, "4.0");
    assert_eq!(circuit.protective_device, "40");
}

#[test]
fn primary_board_protection() {
    let mut schedule = Schedule::default();
    let boards_before = schedule.boards.clone();

    let result = schedule.remove_board(MAIN_BOARD_ID);
    assert!(result.is_err());
    assert_eq!(schedule.boards, boards_before);
}

#[test]
fn board_removal_reassigns_without_losing_circuits() {
    let mut schedule = Schedule::default();
    let sub = schedule.add_board().id.clone();
    schedule.add_circuit(&sub, None);
    schedule.add_circuit(&sub, None);
    let total_before = schedule.circuits.len();

    schedule.remove_board(&sub).unwrap();

    assert_eq!(schedule.circuits.len(), total_before);
    assert!(schedule.circuits.iter().all(|c| c.board_id != sub));
    assert!(schedule
        .circuits
        .iter()
        .all(|c| c.board_id == MAIN_BOARD_ID));
}

#[test]
fn move_produces_dense_numbering() {
    let mut schedule = filled_schedule(5);
    let id = schedule.circuits[4].id.clone();

    let outcome = schedule.move_circuit(&id, 2);
    assert!(matches!(outcome, MoveOutcome::Moved { .. }));

    let numbers: Vec<u32> = schedule
        .circuits
        .iter()
        .map(|c| c.circuit_number.parse().unwrap())
        .collect();
    assert_eq!(numbers, [1, 2, 3, 4, 5]);
}

#[test]
fn auto_filled_degrades_on_first_touch() {
    let mut schedule = Schedule::default();
    schedule.circuits[0].auto_filled = true;
    let id = schedule.circuits[0].id.clone();

    schedule.update_field(&id, Field::Notes, "verified on site");
    assert!(!schedule.circuits[0].auto_filled);
}

#[test]
fn undo_restores_exactly_one_deletion() {
    let mut schedule = filled_schedule(3);
    let first = schedule.circuits[0].id.clone();
    let second = schedule.circuits[1].id.clone();

    schedule.delete_circuit(&first);
    schedule.delete_circuit(&second);
    assert!(schedule.undo_delete());
    assert_eq!(schedule.circuits.len(), 2);
    // The first deletion is gone for good.
    assert!(!schedule.undo_delete());
    assert!(schedule.circuits.iter().all(|c| c.id != first));
}

#[test]
fn empty_mode_infill_preserves_non_empty_fields() {
    let mut schedule = filled_schedule(3);
    let id = schedule.circuits[1].id.clone();
    schedule.update_field(&id, Field::Polarity, "Correct");

    bulk_infill(&mut schedule, "N/A", InfillMode::EmptyOnly);

    assert_eq!(schedule.circuits[0].polarity, "N/A");
    assert_eq!(schedule.circuits[1].polarity, "Correct");
    assert_eq!(schedule.circuits[2].polarity, "N/A");
}
