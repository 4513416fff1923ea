//! Persistence formatting and the schedule controller.
//!
//! The engine never reads persisted state directly: it receives one
//! form-data JSON blob on load, migrates it to the multi-board shape,
//! and pushes changes back out through an [`UpdateSink`] keyed the way
//! the certificate form stores them. Flushes are skipped when a
//! content hash says nothing the certificate cares about changed.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::core::ScheduleError;
use crate::engine::Schedule;
use crate::model::{create_main_board, Circuit, DistributionBoard, MAIN_BOARD_ID};
use crate::reference::{DeviceKind, VALID_CURVES};

/// External persistence collaborator. One call per changed form key.
pub trait UpdateSink {
    fn on_update(&mut self, key: &str, value: Value);
}

/// Reconstruct boards and circuits from a persisted form-data blob.
///
/// Handles both shapes: the current multi-board form (a
/// `distributionBoards` array plus `scheduleOfTests`) and the legacy
/// single-board form, whose board facts live in top-level keys
/// (`dbReference`, `zdb`, `ipf`) and whose circuits carry no board id.
/// Legacy circuits land on the main board. Invalid curves (K/Z etc.)
/// on MCB/RCBO circuits are dropped during migration.
pub fn migrate_to_multi_board(
    form_data: &Value,
) -> Result<(Vec<DistributionBoard>, Vec<Circuit>), ScheduleError> {
    let mut boards: Vec<DistributionBoard> = match form_data.get("distributionBoards") {
        Some(raw) if raw.is_array() => serde_json::from_value(raw.clone())?,
        _ => Vec::new(),
    };

    if boards.is_empty() {
        // Legacy single-board shape: lift the top-level board facts
        // onto a fresh main board.
        let mut main = create_main_board();
        if let Some(reference) = form_data.get("dbReference").and_then(Value::as_str) {
            main.reference = reference.to_string();
        }
        if let Some(zdb) = form_data.get("zdb").and_then(Value::as_str) {
            main.zdb = zdb.to_string();
        }
        if let Some(ipf) = form_data.get("ipf").and_then(Value::as_str) {
            main.ipf = ipf.to_string();
        }
        boards.push(main);
        info!("migrated legacy single-board form data");
    }
    if !boards.iter().any(|b| b.id == MAIN_BOARD_ID) {
        warn!("persisted boards missing the main board, re-adding it");
        boards.insert(0, create_main_board());
    }

    let mut circuits: Vec<Circuit> = match form_data.get("scheduleOfTests") {
        Some(raw) if raw.is_array() => serde_json::from_value(raw.clone())?,
        _ => Vec::new(),
    };

    let board_ids: Vec<String> = boards.iter().map(|b| b.id.clone()).collect();
    for circuit in circuits.iter_mut() {
        if circuit.board_id.is_empty() || !board_ids.contains(&circuit.board_id) {
            circuit.board_id = MAIN_BOARD_ID.to_string();
        }
        scrub_invalid_curve(circuit);
    }

    Ok((boards, circuits))
}

/// Older exports carried manufacturer curve letters (K, Z) that the
/// certificate dropdowns don't accept; breakers keep only B/C/D and
/// non-breaker devices carry no curve at all.
fn scrub_invalid_curve(circuit: &mut Circuit) {
    if circuit.protective_device_curve.is_empty() {
        return;
    }
    let needs_curve = DeviceKind::classify(&circuit.bs_standard)
        .or_else(|| DeviceKind::classify(&circuit.protective_device_type))
        .map(|k| k.requires_curve())
        .unwrap_or(false);

    if !needs_curve || !VALID_CURVES.contains(&circuit.protective_device_curve.as_str()) {
        circuit.protective_device_curve = String::new();
    }
}

/// Form-data keys for the board list: the `distributionBoards` array
/// itself plus the legacy top-level keys mirrored from the main board,
/// so old form consumers keep working.
pub fn format_boards_for_form_data(boards: &[DistributionBoard]) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "distributionBoards".to_string(),
        serde_json::to_value(boards).unwrap_or(Value::Null),
    );
    if let Some(main) = boards.iter().find(|b| b.is_main()) {
        map.insert("dbReference".to_string(), json!(main.reference));
        map.insert("zdb".to_string(), json!(main.zdb));
        map.insert("ipf".to_string(), json!(main.ipf));
    }
    map
}

/// Content hash over the values the certificate actually renders.
/// Cheap change detection, not cryptographic.
pub fn compute_schedule_hash(circuits: &[Circuit]) -> String {
    circuits
        .iter()
        .map(|c| {
            format!(
                "{}:{}:{}:{}:{}",
                c.id, c.circuit_designation, c.zs, c.max_zs, c.protective_device_rating
            )
        })
        .collect::<Vec<String>>()
        .join("|")
}

/// Owns the schedule and pushes committed changes to the sink.
///
/// `commit` is the debounced path and skips the write when the content
/// hash is unchanged; `flush` is the teardown path and always writes.
pub struct ScheduleController<S: UpdateSink> {
    pub schedule: Schedule,
    sink: S,
    last_flushed_hash: String,
}

impl<S: UpdateSink> ScheduleController<S> {
    pub fn new(schedule: Schedule, sink: S) -> Self {
        ScheduleController {
            schedule,
            sink,
            last_flushed_hash: String::new(),
        }
    }

    /// Load persisted form data into a fresh controller.
    pub fn from_form_data(form_data: &Value, sink: S) -> Result<Self, ScheduleError> {
        let (boards, circuits) = migrate_to_multi_board(form_data)?;
        let schedule = if circuits.is_empty() {
            let mut s = Schedule::default();
            s.boards = boards;
            s
        } else {
            Schedule::from_parts(circuits, boards)
        };
        Ok(ScheduleController::new(schedule, sink))
    }

    /// Write the circuit list to the sink if it changed since the last
    /// flush. Returns whether a write happened.
    pub fn commit(&mut self) -> bool {
        let hash = compute_schedule_hash(&self.schedule.circuits);
        if hash == self.last_flushed_hash {
            return false;
        }
        self.write_circuits(hash);
        true
    }

    /// Unconditional write, for teardown.
    pub fn flush(&mut self) {
        let hash = compute_schedule_hash(&self.schedule.circuits);
        self.write_circuits(hash);
    }

    /// Push every board-derived form key. Boards have no content hash;
    /// callers invoke this only on board changes.
    pub fn commit_boards(&mut self) {
        for (key, value) in format_boards_for_form_data(&self.schedule.boards) {
            self.sink.on_update(&key, value);
        }
    }

    fn write_circuits(&mut self, hash: String) {
        let value = serde_json::to_value(&self.schedule.circuits).unwrap_or(Value::Null);
        self.sink.on_update("scheduleOfTests", value);
        self.last_flushed_hash = hash;
    }
}
