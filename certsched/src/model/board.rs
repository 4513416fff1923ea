//! Distribution board records.
//!
//! Every schedule has at least the main consumer unit; sub-boards can
//! be added and removed freely, but the main board is permanent and is
//! where orphaned circuits land when their board is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved id of the primary board ("Main CU"). It can never be
/// removed and is the default home for new circuits.
pub const MAIN_BOARD_ID: &str = "main";

/// A consumer unit or sub-board hosting a group of circuits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistributionBoard {
    pub id: String,
    pub name: String,
    /// Board designation as written on the certificate (e.g. "DB1").
    pub reference: String,
    pub location: String,
    /// Display/processing order, dense from 0.
    pub order: usize,

    /// Measured impedance at the board, Ω.
    pub zdb: String,
    /// Prospective fault current at the board, kA.
    pub ipf: String,

    pub confirmed_correct_polarity: bool,
    pub confirmed_phase_sequence: bool,
    pub spd_operational_status: bool,
    pub spd_na: bool,
    pub spd_t1: bool,
    pub spd_t2: bool,
    pub spd_t3: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for DistributionBoard {
    fn default() -> Self {
        let now = Utc::now();
        DistributionBoard {
            id: String::new(),
            name: String::new(),
            reference: String::new(),
            location: String::new(),
            order: 0,
            zdb: String::new(),
            ipf: String::new(),
            confirmed_correct_polarity: false,
            confirmed_phase_sequence: false,
            spd_operational_status: false,
            spd_na: false,
            spd_t1: false,
            spd_t2: false,
            spd_t3: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl DistributionBoard {
    pub fn is_main(&self) -> bool {
        self.id == MAIN_BOARD_ID
    }
}

/// The main consumer unit every schedule starts with.
pub fn create_main_board() -> DistributionBoard {
    DistributionBoard {
        id: MAIN_BOARD_ID.to_string(),
        name: "Main CU".to_string(),
        reference: "DB0".to_string(),
        ..DistributionBoard::default()
    }
}

/// A fresh sub-board with a generated id at the given order slot.
pub fn create_default_board(id: String, name: String, order: usize) -> DistributionBoard {
    DistributionBoard {
        id,
        name,
        order,
        ..DistributionBoard::default()
    }
}

pub fn generate_board_id() -> String {
    Uuid::new_v4().to_string()
}

/// Next free "DB n" name, skipping names already taken.
pub fn next_sub_board_name(boards: &[DistributionBoard]) -> String {
    let mut n = boards.len();
    loop {
        let candidate = format!("DB{n}");
        if !boards.iter().any(|b| b.name == candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Writable board fields, validated at the voice/AI boundary like
/// circuit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardField {
    Name,
    Reference,
    Location,
    Zdb,
    Ipf,
    ConfirmedCorrectPolarity,
    ConfirmedPhaseSequence,
    SpdOperationalStatus,
    SpdNa,
    SpdT1,
    SpdT2,
    SpdT3,
}

impl BoardField {
    pub fn parse(name: &str) -> Option<BoardField> {
        Some(match name {
            "name" => BoardField::Name,
            "reference" => BoardField::Reference,
            "location" => BoardField::Location,
            "zdb" => BoardField::Zdb,
            "ipf" => BoardField::Ipf,
            "confirmedCorrectPolarity" => BoardField::ConfirmedCorrectPolarity,
            "confirmedPhaseSequence" => BoardField::ConfirmedPhaseSequence,
            "spdOperationalStatus" => BoardField::SpdOperationalStatus,
            "spdNA" => BoardField::SpdNa,
            "spdT1" => BoardField::SpdT1,
            "spdT2" => BoardField::SpdT2,
            "spdT3" => BoardField::SpdT3,
            _ => return None,
        })
    }

    pub fn apply(&self, board: &mut DistributionBoard, value: &str) {
        let flag = value.eq_ignore_ascii_case("true");
        match self {
            BoardField::Name => board.name = value.to_string(),
            BoardField::Reference => board.reference = value.to_string(),
            BoardField::Location => board.location = value.to_string(),
            BoardField::Zdb => board.zdb = value.to_string(),
            BoardField::Ipf => board.ipf = value.to_string(),
            BoardField::ConfirmedCorrectPolarity => board.confirmed_correct_polarity = flag,
            BoardField::ConfirmedPhaseSequence => board.confirmed_phase_sequence = flag,
            BoardField::SpdOperationalStatus => board.spd_operational_status = flag,
            BoardField::SpdNa => board.spd_na = flag,
            BoardField::SpdT1 => board.spd_t1 = flag,
            BoardField::SpdT2 => board.spd_t2 = flag,
            BoardField::SpdT3 => board.spd_t3 = flag,
        }
        board.updated_at = Utc::now();
    }
}
