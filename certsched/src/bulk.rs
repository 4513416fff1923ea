//! Bulk infill: one value across the fillable fields of every circuit.
//!
//! Used for sweeping "N/A" or "Satisfactory" across a schedule after a
//! visual-only inspection. Identity, description and type columns are
//! deliberately not fillable.

use tracing::info;

use crate::engine::Schedule;
use crate::model::Field;

/// The fields the bulk operator may write. Fixed set: everything a
/// tester fills per-circuit, excluding identifiers and descriptive
/// columns.
pub const FILLABLE_FIELDS: &[Field] = &[
    Field::TypeOfWiring,
    Field::ReferenceMethod,
    Field::PointsServed,
    Field::LiveSize,
    Field::CpcSize,
    Field::BsStandard,
    Field::ProtectiveDeviceType,
    Field::ProtectiveDeviceCurve,
    Field::ProtectiveDeviceRating,
    Field::ProtectiveDeviceKaRating,
    Field::MaxZs,
    Field::RcdBsStandard,
    Field::RcdType,
    Field::RcdRating,
    Field::RcdRatingA,
    Field::RingR1,
    Field::RingRn,
    Field::RingR2,
    Field::R1R2,
    Field::R2,
    Field::InsulationTestVoltage,
    Field::InsulationLiveNeutral,
    Field::InsulationLiveEarth,
    Field::Polarity,
    Field::Zs,
    Field::RcdOneX,
    Field::RcdTestButton,
    Field::AfddTest,
    Field::Pfc,
    Field::Notes,
];

/// Overwrite policy for [`bulk_infill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfillMode {
    /// Overwrite every fillable field.
    All,
    /// Overwrite only fields that are absent or whitespace after trim.
    EmptyOnly,
}

impl InfillMode {
    pub fn parse(mode: &str) -> Option<InfillMode> {
        match mode.to_lowercase().as_str() {
            "all" => Some(InfillMode::All),
            "empty" | "empty-only" | "emptyonly" => Some(InfillMode::EmptyOnly),
            _ => None,
        }
    }
}

/// Apply `value` to the fillable fields of every circuit.
///
/// Returns the number of individual field writes, not circuits
/// touched. Any circuit that received at least one write has its
/// autoFilled flag cleared: the sweep counts as a hand edit.
pub fn bulk_infill(schedule: &mut Schedule, value: &str, mode: InfillMode) -> usize {
    let mut writes = 0;

    for circuit in schedule.circuits.iter_mut() {
        let mut touched = false;
        for &field in FILLABLE_FIELDS {
            let overwrite = match mode {
                InfillMode::All => true,
                InfillMode::EmptyOnly => circuit.get(field).trim().is_empty(),
            };
            if overwrite {
                circuit.set_raw(field, value);
                touched = true;
                writes += 1;
            }
        }
        if touched {
            circuit.auto_filled = false;
        }
    }

    info!(writes, ?mode, "bulk infill applied");
    writes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MAIN_BOARD_ID;

    #[test]
    fn empty_mode_never_overwrites_non_empty_values() {
        let mut s = Schedule::default();
        s.add_circuit(MAIN_BOARD_ID, None);
        s.add_circuit(MAIN_BOARD_ID, None);
        let c2_id = s.circuits[1].id.clone();
        s.update_field(&c2_id, Field::Polarity, "Correct");

        bulk_infill(&mut s, "N/A", InfillMode::EmptyOnly);

        assert_eq!(s.circuits[0].polarity, "N/A");
        assert_eq!(s.circuits[1].polarity, "Correct");
        assert_eq!(s.circuits[2].polarity, "N/A");
    }

    #[test]
    fn all_mode_overwrites_everything_fillable() {
        let mut s = Schedule::default();
        let id = s.circuits[0].id.clone();
        s.update_field(&id, Field::Zs, "0.42");

        let writes = bulk_infill(&mut s, "N/A", InfillMode::All);
        assert_eq!(writes, FILLABLE_FIELDS.len());
        assert_eq!(s.circuits[0].zs, "N/A");
        // Descriptive and identity fields stay out of reach.
        assert_eq!(s.circuits[0].circuit_number, "1");
        assert_eq!(s.circuits[0].circuit_description, "");
    }

    #[test]
    fn returns_field_writes_not_circuits() {
        let mut s = Schedule::default();
        s.add_circuit(MAIN_BOARD_ID, None);
        let id = s.circuits[0].id.clone();
        s.update_field(&id, Field::Polarity, "Correct");

        let writes = bulk_infill(&mut s, "N/A", InfillMode::EmptyOnly);
        // Two circuits, one field already filled on one of them.
        assert_eq!(writes, FILLABLE_FIELDS.len() * 2 - 1);
    }

    #[test]
    fn touched_circuits_lose_auto_filled() {
        let mut s = Schedule::default();
        s.circuits[0].auto_filled = true;
        bulk_infill(&mut s, "N/A", InfillMode::EmptyOnly);
        assert!(!s.circuits[0].auto_filled);
    }

    #[test]
    fn whitespace_counts_as_empty() {
        let mut s = Schedule::default();
        s.circuits[0].notes = "   ".to_string();
        bulk_infill(&mut s, "N/A", InfillMode::EmptyOnly);
        assert_eq!(s.circuits[0].notes, "N/A");
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(InfillMode::parse("all"), Some(InfillMode::All));
        assert_eq!(InfillMode::parse("empty"), Some(InfillMode::EmptyOnly));
        assert_eq!(InfillMode::parse("sideways"), None);
    }
}
