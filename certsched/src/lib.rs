//! certsched - Circuit Schedule Engine for EICR/EIC certificates
//!
//! This library implements the Schedule of Test Results behind UK
//! electrical installation certificates: the circuit/board data model,
//! the mutation engine enforcing its invariants, AI proposal ingestion,
//! bulk infill, three-phase balance estimation, a voice command
//! dispatcher and persistence formatting.
//!
//! # Quick Start
//!
//! ```
//! use certsched::{Schedule, Field, MAIN_BOARD_ID};
//!
//! let mut schedule = Schedule::default();
//! let id = schedule.circuits[0].id.clone();
//! schedule.update_field(&id, Field::CircuitDescription, "Kitchen Ring");
//! schedule.update_field(&id, Field::ProtectiveDeviceRating, "32");
//!
//! assert_eq!(schedule.circuits[0].circuit_designation, "C1");
//! assert_eq!(schedule.circuits[0].protective_device, "32");
//! ```
//!
//! # Features
//!
//! - **Mutation engine**: add/update/move/delete circuits and boards
//!   with designation sync, legacy mirroring and undo
//! - **AI ingestion**: normalize vision proposals and fill blank rows
//!   before appending
//! - **Derivations**: max Zs per BS 7671, T&E CPC sizing, BS standards
//! - **Three-phase**: 3-pole group detection and load balance
//! - **Voice**: synchronous action dispatcher with spoken aliases

pub mod bulk;
pub mod core;
pub mod engine;
pub mod ingest;
pub mod model;
pub mod persist;
pub mod reference;
pub mod threephase;
pub mod voice;

// Re-export main types
pub use crate::core::ScheduleError;
pub use bulk::{bulk_infill, InfillMode, FILLABLE_FIELDS};
pub use engine::{apply_field_write, CompletionStats, DeletedCircuit, MoveOutcome, Schedule};
pub use ingest::{
    append_parsed_circuits, ingest_proposals, BoardScanMetadata, CircuitProposal, IngestSummary,
};
pub use model::{BoardField, Circuit, DistributionBoard, Field, MAIN_BOARD_ID};
pub use persist::{
    compute_schedule_hash, format_boards_for_form_data, migrate_to_multi_board,
    ScheduleController, UpdateSink,
};
pub use threephase::{
    calculate_phase_balance, detect_three_pole_groups, PhaseBalance, ThreePoleGroup,
};
pub use voice::{dispatch, VoiceSession};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        bulk_infill, calculate_phase_balance, dispatch, ingest_proposals, Circuit,
        CircuitProposal, DistributionBoard, Field, InfillMode, Schedule, ScheduleError,
        VoiceSession, MAIN_BOARD_ID,
    };
}
