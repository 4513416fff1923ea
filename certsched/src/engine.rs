//! Mutation engine: the single authority for schedule state changes.
//!
//! Every producer — manual table edits, voice commands, bulk tools,
//! AI ingestion — mutates the schedule through the operations here, so
//! the invariants (designation sync, legacy-field mirroring,
//! autoFilled clearing, primary-board protection) hold no matter who
//! triggered the change. Operations are total: unknown ids and
//! out-of-range indices degrade to no-ops, and the only "errors" are
//! advisory outcome values for the caller to relay.

use tracing::{debug, info};

use crate::model::{
    create_default_board, create_main_board, generate_board_id, next_sub_board_name, BoardField,
    Circuit, DistributionBoard, Field, MAIN_BOARD_ID,
};

/// Snapshot of a removed circuit, kept for one level of undo.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedCircuit {
    pub circuit: Circuit,
    /// Index in the full circuit list at the moment of deletion.
    pub index: usize,
}

/// Outcome of `move_circuit`; the message is advisory, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Moved { message: String },
    Rejected { message: String },
}

impl MoveOutcome {
    pub fn message(&self) -> &str {
        match self {
            MoveOutcome::Moved { message } | MoveOutcome::Rejected { message } => message,
        }
    }
}

/// Completion summary used by progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub percent: u32,
}

/// The schedule aggregate: every circuit and board on the certificate,
/// plus the single-slot deletion history.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub circuits: Vec<Circuit>,
    pub boards: Vec<DistributionBoard>,
    last_deleted: Option<DeletedCircuit>,
}

impl Default for Schedule {
    /// A fresh schedule: the main board and one empty circuit "1", the
    /// state a new certificate opens with when nothing was persisted.
    fn default() -> Self {
        Schedule {
            circuits: vec![Circuit::blank("1", MAIN_BOARD_ID)],
            boards: vec![create_main_board()],
            last_deleted: None,
        }
    }
}

impl Schedule {
    /// Rebuild a schedule from already-migrated persisted state.
    pub fn from_parts(circuits: Vec<Circuit>, boards: Vec<DistributionBoard>) -> Self {
        let boards = if boards.is_empty() {
            vec![create_main_board()]
        } else {
            boards
        };
        Schedule {
            circuits,
            boards,
            last_deleted: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    pub fn circuit(&self, id: &str) -> Option<&Circuit> {
        self.circuits.iter().find(|c| c.id == id)
    }

    pub fn board(&self, board_id: &str) -> Option<&DistributionBoard> {
        self.boards.iter().find(|b| b.id == board_id)
    }

    /// Circuits on one board, in schedule order.
    pub fn circuits_for_board(&self, board_id: &str) -> Vec<&Circuit> {
        self.circuits
            .iter()
            .filter(|c| c.board_id == board_id)
            .collect()
    }

    /// Find a circuit on a board by its spoken number ("3" or "C3").
    pub fn circuit_by_number(&self, board_id: &str, number: &str) -> Option<&Circuit> {
        let bare = number.trim().trim_start_matches(['C', 'c']);
        self.circuits
            .iter()
            .find(|c| c.board_id == board_id && c.circuit_number == bare)
    }

    // ---- circuit operations -------------------------------------------

    /// Append a circuit to a board. Numbering is per-board: the new
    /// number is the count of circuits already on that board plus one.
    pub fn add_circuit(&mut self, board_id: &str, template: Option<Circuit>) -> &Circuit {
        let board_id = if self.board(board_id).is_some() {
            board_id
        } else {
            MAIN_BOARD_ID
        };
        let number = (self.circuits_for_board(board_id).len() + 1).to_string();

        let mut circuit = template.unwrap_or_default();
        circuit.id = uuid::Uuid::new_v4().to_string();
        circuit.board_id = board_id.to_string();
        circuit.circuit_number = number.clone();
        circuit.circuit_designation = format!("C{number}");

        debug!(board = board_id, number = %number, "circuit added");
        self.circuits.push(circuit);
        self.circuits.last().expect("just pushed")
    }

    /// Write one field, applying every invariant from the data model.
    /// Unknown ids leave the schedule unchanged.
    pub fn update_field(&mut self, id: &str, field: Field, value: &str) -> bool {
        let Some(circuit) = self.circuits.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        apply_field_write(circuit, field, value);
        true
    }

    /// Merge several field writes atomically, with the same
    /// normalization rules as a single-field update.
    pub fn bulk_update(&mut self, id: &str, fields: &[(Field, String)]) -> bool {
        let Some(circuit) = self.circuits.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        for (field, value) in fields {
            apply_field_write(circuit, *field, value);
        }
        true
    }

    /// Table-style single delete: removes the circuit without
    /// renumbering its siblings and records the undo slot.
    pub fn delete_circuit(&mut self, id: &str) -> Option<Circuit> {
        let index = self.circuits.iter().position(|c| c.id == id)?;
        let circuit = self.circuits.remove(index);
        info!(designation = %circuit.circuit_designation, "circuit deleted");
        self.last_deleted = Some(DeletedCircuit {
            circuit: circuit.clone(),
            index,
        });
        Some(circuit)
    }

    /// Voice-style delete: removes the circuit and renumbers the
    /// board's remaining circuits 1..N. Callers rely on the
    /// distinction from `delete_circuit`, so the two stay separate.
    pub fn delete_circuit_renumbered(&mut self, id: &str) -> Option<Circuit> {
        let board_id = self.circuit(id)?.board_id.clone();
        let removed = self.delete_circuit(id)?;
        self.renumber_board(&board_id);
        Some(removed)
    }

    /// Re-insert the most recently deleted circuit at its original
    /// position. One slot only: a second deletion discards the first.
    pub fn undo_delete(&mut self) -> bool {
        let Some(DeletedCircuit { circuit, index }) = self.last_deleted.take() else {
            return false;
        };
        let index = index.min(self.circuits.len());
        self.circuits.insert(index, circuit);
        true
    }

    /// Remove every circuit. Boards are kept; the undo slot is not.
    pub fn clear_circuits(&mut self) {
        self.circuits.clear();
        self.last_deleted = None;
    }

    /// Renumber a board's circuits 1..N in schedule order and
    /// regenerate their designations.
    pub fn renumber_board(&mut self, board_id: &str) {
        let mut n = 0;
        for circuit in self.circuits.iter_mut().filter(|c| c.board_id == board_id) {
            n += 1;
            circuit.circuit_number = n.to_string();
            circuit.circuit_designation = format!("C{n}");
        }
    }

    /// Move a circuit to a 1-based position within its board, then
    /// renumber the board 1..N. Out-of-range targets and moves to the
    /// current position are rejected with a descriptive message and no
    /// state change.
    pub fn move_circuit(&mut self, id: &str, to_position: usize) -> MoveOutcome {
        let Some(circuit) = self.circuit(id) else {
            return MoveOutcome::Rejected {
                message: "Circuit not found".to_string(),
            };
        };
        let board_id = circuit.board_id.clone();
        let designation = circuit.circuit_designation.clone();

        // Positions of this board's circuits within the full list.
        let slots: Vec<usize> = self
            .circuits
            .iter()
            .enumerate()
            .filter(|(_, c)| c.board_id == board_id)
            .map(|(i, _)| i)
            .collect();
        let count = slots.len();
        let from_position = slots
            .iter()
            .position(|&i| self.circuits[i].id == id)
            .expect("circuit is on its own board")
            + 1;

        if to_position < 1 || to_position > count {
            return MoveOutcome::Rejected {
                message: format!(
                    "Cannot move {designation} to position {to_position}: valid positions are 1 to {count}"
                ),
            };
        }
        if to_position == from_position {
            return MoveOutcome::Rejected {
                message: format!("{designation} is already at position {to_position}"),
            };
        }

        // Reorder within the board's slots, leaving other boards'
        // circuits exactly where they are.
        let mut board_circuits: Vec<Circuit> = slots
            .iter()
            .rev()
            .map(|&i| self.circuits.remove(i))
            .collect();
        board_circuits.reverse();
        let moving = board_circuits.remove(from_position - 1);
        board_circuits.insert(to_position - 1, moving);
        for (&slot, circuit) in slots.iter().zip(board_circuits) {
            self.circuits.insert(slot, circuit);
        }

        self.renumber_board(&board_id);
        info!(%designation, from = from_position, to = to_position, "circuit moved");
        MoveOutcome::Moved {
            message: format!("Moved {designation} from position {from_position} to {to_position}"),
        }
    }

    // ---- board operations ---------------------------------------------

    /// Add a sub-board with a generated id and the next free "DB n"
    /// name, appended at the end of the display order.
    pub fn add_board(&mut self) -> &DistributionBoard {
        let board = create_default_board(
            generate_board_id(),
            next_sub_board_name(&self.boards),
            self.boards.len(),
        );
        info!(name = %board.name, "board added");
        self.boards.push(board);
        self.boards.last().expect("just pushed")
    }

    /// Remove a sub-board, reassigning its circuits to the main board
    /// and compacting the remaining boards' order to stay dense from 0.
    /// The main board is protected: removing it fails with no change.
    pub fn remove_board(&mut self, board_id: &str) -> Result<usize, String> {
        if board_id == MAIN_BOARD_ID {
            return Err("Cannot remove Main CU".to_string());
        }
        if self.board(board_id).is_none() {
            return Err(format!("Board {board_id} not found"));
        }

        let mut reassigned = 0;
        for circuit in self.circuits.iter_mut() {
            if circuit.board_id == board_id {
                circuit.board_id = MAIN_BOARD_ID.to_string();
                reassigned += 1;
            }
        }

        self.boards.retain(|b| b.id != board_id);
        for (index, board) in self.boards.iter_mut().enumerate() {
            board.order = index;
        }
        info!(board = board_id, reassigned, "board removed");
        Ok(reassigned)
    }

    /// Write one board field. Unknown ids are a no-op.
    pub fn update_board(&mut self, board_id: &str, field: BoardField, value: &str) -> bool {
        let Some(board) = self.boards.iter_mut().find(|b| b.id == board_id) else {
            return false;
        };
        field.apply(board, value);
        true
    }

    /// Boards in display order.
    pub fn boards_ordered(&self) -> Vec<&DistributionBoard> {
        let mut boards: Vec<&DistributionBoard> = self.boards.iter().collect();
        boards.sort_by_key(|b| b.order);
        boards
    }

    // ---- derived views --------------------------------------------------

    pub fn completion_stats(&self) -> CompletionStats {
        let total = self.circuits.len();
        let completed = self.circuits.iter().filter(|c| c.is_complete()).count();
        let percent = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        CompletionStats {
            total,
            completed,
            pending: total - completed,
            percent,
        }
    }
}

/// The one normalization step every mutation path goes through.
///
/// Applies, in order: the raw write, designation sync, legacy-field
/// mirroring, and autoFilled degradation. Centralized here so the
/// rules cannot drift between single-field, bulk and voice paths.
pub fn apply_field_write(circuit: &mut Circuit, field: Field, value: &str) {
    circuit.set_raw(field, value);

    match field {
        Field::CircuitNumber => {
            if !value.is_empty() {
                circuit.circuit_designation = format!("C{value}");
            }
        }
        // The designation is derived; a direct write is overridden by
        // whatever the current number says.
        Field::CircuitDesignation => {
            circuit.circuit_designation = format!("C{}", circuit.circuit_number);
        }
        Field::LiveSize => circuit.cable_size = value.to_string(),
        Field::CableSize => circuit.live_size = value.to_string(),
        Field::ProtectiveDeviceRating => circuit.protective_device = value.to_string(),
        Field::ProtectiveDevice => {
            circuit.protective_device_rating =
                value.chars().filter(|c| c.is_ascii_digit()).collect();
        }
        _ => {}
    }

    // First hand edit of an auto-filled circuit downgrades its
    // provenance to hand-verified.
    if circuit.auto_filled && field != Field::AutoFilled {
        circuit.auto_filled = false;
    }
}
