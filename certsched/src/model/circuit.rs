//! Circuit (test result) record and typed field access.
//!
//! One `Circuit` is one row of the Schedule of Test Results: the
//! protective device, conductor sizes and measured values for a single
//! protected circuit. All instrument values are free-text strings on
//! the wire (an empty string means "not filled in yet"), matching the
//! certificate form-data blob this engine persists to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::board::MAIN_BOARD_ID;

/// A single circuit row on the schedule.
///
/// Field names serialize in camelCase so persisted JSON is
/// interchangeable with the certificate `scheduleOfTests` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Circuit {
    /// Opaque unique id, stable for the circuit's lifetime.
    pub id: String,
    /// Foreign key into the distribution board list.
    pub board_id: String,

    /// Positive-integer string, unique within a board.
    pub circuit_number: String,
    /// Always `"C" + circuit_number`; derived, never written directly.
    pub circuit_designation: String,

    pub circuit_description: String,
    pub circuit_type: String,
    pub type_of_wiring: String,
    pub reference_method: String,
    pub points_served: String,

    /// Live conductor csa in mm².
    pub live_size: String,
    /// Circuit protective conductor csa in mm².
    pub cpc_size: String,
    /// Legacy mirror of `live_size`.
    pub cable_size: String,

    pub protective_device_type: String,
    pub protective_device_curve: String,
    pub protective_device_rating: String,
    pub protective_device_ka_rating: String,
    pub protective_device_location: String,
    pub bs_standard: String,
    /// Legacy mirror of the device rating.
    pub protective_device: String,

    pub rcd_bs_standard: String,
    pub rcd_type: String,
    /// Residual operating current IΔn in mA.
    pub rcd_rating: String,
    /// RCD current rating in A.
    pub rcd_rating_a: String,
    /// Trip time at 1× IΔn.
    pub rcd_one_x: String,
    pub rcd_test_button: String,

    pub ring_r1: String,
    pub ring_rn: String,
    pub ring_r2: String,
    pub ring_continuity_live: String,
    pub ring_continuity_neutral: String,
    pub r1r2: String,
    pub r2: String,

    pub insulation_test_voltage: String,
    pub insulation_resistance: String,
    pub insulation_live_neutral: String,
    pub insulation_live_earth: String,
    pub insulation_neutral_earth: String,

    pub polarity: String,
    pub zs: String,
    pub max_zs: String,
    pub pfc: String,
    pub pfc_live_neutral: String,
    pub pfc_live_earth: String,
    pub functional_testing: String,
    pub afdd_test: String,
    pub notes: String,

    /// `"1P"` or `"3P"`; empty for circuits that predate phase capture.
    pub phase_type: String,
    pub phase_balance_l1: String,
    pub phase_balance_l2: String,
    pub phase_balance_l3: String,
    pub phase_rotation: String,
    pub line_to_line_voltage: String,

    /// True while every value came from a template or AI proposal and
    /// has not been hand-edited.
    pub auto_filled: bool,
}

impl Default for Circuit {
    fn default() -> Self {
        Circuit {
            id: String::new(),
            board_id: MAIN_BOARD_ID.to_string(),
            circuit_number: String::new(),
            circuit_designation: String::new(),
            circuit_description: String::new(),
            circuit_type: String::new(),
            type_of_wiring: String::new(),
            reference_method: String::new(),
            points_served: String::new(),
            live_size: String::new(),
            cpc_size: String::new(),
            cable_size: String::new(),
            protective_device_type: String::new(),
            protective_device_curve: String::new(),
            protective_device_rating: String::new(),
            protective_device_ka_rating: String::new(),
            protective_device_location: String::new(),
            bs_standard: String::new(),
            protective_device: String::new(),
            rcd_bs_standard: String::new(),
            rcd_type: String::new(),
            rcd_rating: String::new(),
            rcd_rating_a: String::new(),
            rcd_one_x: String::new(),
            rcd_test_button: String::new(),
            ring_r1: String::new(),
            ring_rn: String::new(),
            ring_r2: String::new(),
            ring_continuity_live: String::new(),
            ring_continuity_neutral: String::new(),
            r1r2: String::new(),
            r2: String::new(),
            insulation_test_voltage: String::new(),
            insulation_resistance: String::new(),
            insulation_live_neutral: String::new(),
            insulation_live_earth: String::new(),
            insulation_neutral_earth: String::new(),
            polarity: String::new(),
            zs: String::new(),
            max_zs: String::new(),
            pfc: String::new(),
            pfc_live_neutral: String::new(),
            pfc_live_earth: String::new(),
            functional_testing: String::new(),
            afdd_test: String::new(),
            notes: String::new(),
            phase_type: String::new(),
            phase_balance_l1: String::new(),
            phase_balance_l2: String::new(),
            phase_balance_l3: String::new(),
            phase_rotation: String::new(),
            line_to_line_voltage: String::new(),
            auto_filled: false,
        }
    }
}

impl Circuit {
    /// New empty circuit with the given number, assigned to a board.
    pub fn blank(circuit_number: &str, board_id: &str) -> Self {
        Circuit {
            id: Uuid::new_v4().to_string(),
            board_id: board_id.to_string(),
            circuit_number: circuit_number.to_string(),
            circuit_designation: format!("C{circuit_number}"),
            ..Circuit::default()
        }
    }

    /// A row is blank when nothing identifying has been entered yet.
    /// Blank rows are the slots the AI ingestion pipeline may fill.
    pub fn is_blank(&self) -> bool {
        self.circuit_description.is_empty()
            && self.protective_device_type.is_empty()
            && self.protective_device_rating.is_empty()
            && self.live_size.is_empty()
    }

    pub fn is_three_phase(&self) -> bool {
        self.phase_type == "3P"
    }

    /// Completion predicate used by progress reporting: the dead tests
    /// (Zs, polarity) plus at least one insulation reading.
    pub fn is_complete(&self) -> bool {
        !self.zs.is_empty()
            && !self.polarity.is_empty()
            && (!self.insulation_live_earth.is_empty() || !self.insulation_resistance.is_empty())
    }

    /// Read a field by tag. Boolean fields render as `"true"`/`"false"`.
    pub fn get(&self, field: Field) -> String {
        match field {
            Field::CircuitNumber => self.circuit_number.clone(),
            Field::CircuitDesignation => self.circuit_designation.clone(),
            Field::CircuitDescription => self.circuit_description.clone(),
            Field::CircuitType => self.circuit_type.clone(),
            Field::TypeOfWiring => self.type_of_wiring.clone(),
            Field::ReferenceMethod => self.reference_method.clone(),
            Field::PointsServed => self.points_served.clone(),
            Field::LiveSize => self.live_size.clone(),
            Field::CpcSize => self.cpc_size.clone(),
            Field::CableSize => self.cable_size.clone(),
            Field::ProtectiveDeviceType => self.protective_device_type.clone(),
            Field::ProtectiveDeviceCurve => self.protective_device_curve.clone(),
            Field::ProtectiveDeviceRating => self.protective_device_rating.clone(),
            Field::ProtectiveDeviceKaRating => self.protective_device_ka_rating.clone(),
            Field::ProtectiveDeviceLocation => self.protective_device_location.clone(),
            Field::BsStandard => self.bs_standard.clone(),
            Field::ProtectiveDevice => self.protective_device.clone(),
            Field::RcdBsStandard => self.rcd_bs_standard.clone(),
            Field::RcdType => self.rcd_type.clone(),
            Field::RcdRating => self.rcd_rating.clone(),
            Field::RcdRatingA => self.rcd_rating_a.clone(),
            Field::RcdOneX => self.rcd_one_x.clone(),
            Field::RcdTestButton => self.rcd_test_button.clone(),
            Field::RingR1 => self.ring_r1.clone(),
            Field::RingRn => self.ring_rn.clone(),
            Field::RingR2 => self.ring_r2.clone(),
            Field::RingContinuityLive => self.ring_continuity_live.clone(),
            Field::RingContinuityNeutral => self.ring_continuity_neutral.clone(),
            Field::R1R2 => self.r1r2.clone(),
            Field::R2 => self.r2.clone(),
            Field::InsulationTestVoltage => self.insulation_test_voltage.clone(),
            Field::InsulationResistance => self.insulation_resistance.clone(),
            Field::InsulationLiveNeutral => self.insulation_live_neutral.clone(),
            Field::InsulationLiveEarth => self.insulation_live_earth.clone(),
            Field::InsulationNeutralEarth => self.insulation_neutral_earth.clone(),
            Field::Polarity => self.polarity.clone(),
            Field::Zs => self.zs.clone(),
            Field::MaxZs => self.max_zs.clone(),
            Field::Pfc => self.pfc.clone(),
            Field::PfcLiveNeutral => self.pfc_live_neutral.clone(),
            Field::PfcLiveEarth => self.pfc_live_earth.clone(),
            Field::FunctionalTesting => self.functional_testing.clone(),
            Field::AfddTest => self.afdd_test.clone(),
            Field::Notes => self.notes.clone(),
            Field::PhaseType => self.phase_type.clone(),
            Field::PhaseBalanceL1 => self.phase_balance_l1.clone(),
            Field::PhaseBalanceL2 => self.phase_balance_l2.clone(),
            Field::PhaseBalanceL3 => self.phase_balance_l3.clone(),
            Field::PhaseRotation => self.phase_rotation.clone(),
            Field::LineToLineVoltage => self.line_to_line_voltage.clone(),
            Field::AutoFilled => self.auto_filled.to_string(),
        }
    }

    /// Raw field write without invariant maintenance. The mutation
    /// engine wraps this in `apply_field_write`, which is the only
    /// entry point external producers go through.
    pub(crate) fn set_raw(&mut self, field: Field, value: &str) {
        match field {
            Field::CircuitNumber => self.circuit_number = value.to_string(),
            Field::CircuitDesignation => self.circuit_designation = value.to_string(),
            Field::CircuitDescription => self.circuit_description = value.to_string(),
            Field::CircuitType => self.circuit_type = value.to_string(),
            Field::TypeOfWiring => self.type_of_wiring = value.to_string(),
            Field::ReferenceMethod => self.reference_method = value.to_string(),
            Field::PointsServed => self.points_served = value.to_string(),
            Field::LiveSize => self.live_size = value.to_string(),
            Field::CpcSize => self.cpc_size = value.to_string(),
            Field::CableSize => self.cable_size = value.to_string(),
            Field::ProtectiveDeviceType => self.protective_device_type = value.to_string(),
            Field::ProtectiveDeviceCurve => self.protective_device_curve = value.to_string(),
            Field::ProtectiveDeviceRating => self.protective_device_rating = value.to_string(),
            Field::ProtectiveDeviceKaRating => self.protective_device_ka_rating = value.to_string(),
            Field::ProtectiveDeviceLocation => self.protective_device_location = value.to_string(),
            Field::BsStandard => self.bs_standard = value.to_string(),
            Field::ProtectiveDevice => self.protective_device = value.to_string(),
            Field::RcdBsStandard => self.rcd_bs_standard = value.to_string(),
            Field::RcdType => self.rcd_type = value.to_string(),
            Field::RcdRating => self.rcd_rating = value.to_string(),
            Field::RcdRatingA => self.rcd_rating_a = value.to_string(),
            Field::RcdOneX => self.rcd_one_x = value.to_string(),
            Field::RcdTestButton => self.rcd_test_button = value.to_string(),
            Field::RingR1 => self.ring_r1 = value.to_string(),
            Field::RingRn => self.ring_rn = value.to_string(),
            Field::RingR2 => self.ring_r2 = value.to_string(),
            Field::RingContinuityLive => self.ring_continuity_live = value.to_string(),
            Field::RingContinuityNeutral => self.ring_continuity_neutral = value.to_string(),
            Field::R1R2 => self.r1r2 = value.to_string(),
            Field::R2 => self.r2 = value.to_string(),
            Field::InsulationTestVoltage => self.insulation_test_voltage = value.to_string(),
            Field::InsulationResistance => self.insulation_resistance = value.to_string(),
            Field::InsulationLiveNeutral => self.insulation_live_neutral = value.to_string(),
            Field::InsulationLiveEarth => self.insulation_live_earth = value.to_string(),
            Field::InsulationNeutralEarth => self.insulation_neutral_earth = value.to_string(),
            Field::Polarity => self.polarity = value.to_string(),
            Field::Zs => self.zs = value.to_string(),
            Field::MaxZs => self.max_zs = value.to_string(),
            Field::Pfc => self.pfc = value.to_string(),
            Field::PfcLiveNeutral => self.pfc_live_neutral = value.to_string(),
            Field::PfcLiveEarth => self.pfc_live_earth = value.to_string(),
            Field::FunctionalTesting => self.functional_testing = value.to_string(),
            Field::AfddTest => self.afdd_test = value.to_string(),
            Field::Notes => self.notes = value.to_string(),
            Field::PhaseType => self.phase_type = value.to_string(),
            Field::PhaseBalanceL1 => self.phase_balance_l1 = value.to_string(),
            Field::PhaseBalanceL2 => self.phase_balance_l2 = value.to_string(),
            Field::PhaseBalanceL3 => self.phase_balance_l3 = value.to_string(),
            Field::PhaseRotation => self.phase_rotation = value.to_string(),
            Field::LineToLineVoltage => self.line_to_line_voltage = value.to_string(),
            Field::AutoFilled => self.auto_filled = value.eq_ignore_ascii_case("true"),
        }
    }
}

/// Closed enumeration of every externally writable circuit field.
///
/// Voice and AI producers enter the engine through `Field::parse`, so
/// an unrecognized field name fails at the boundary instead of
/// silently creating a stray key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CircuitNumber,
    CircuitDesignation,
    CircuitDescription,
    CircuitType,
    TypeOfWiring,
    ReferenceMethod,
    PointsServed,
    LiveSize,
    CpcSize,
    CableSize,
    ProtectiveDeviceType,
    ProtectiveDeviceCurve,
    ProtectiveDeviceRating,
    ProtectiveDeviceKaRating,
    ProtectiveDeviceLocation,
    BsStandard,
    ProtectiveDevice,
    RcdBsStandard,
    RcdType,
    RcdRating,
    RcdRatingA,
    RcdOneX,
    RcdTestButton,
    RingR1,
    RingRn,
    RingR2,
    RingContinuityLive,
    RingContinuityNeutral,
    R1R2,
    R2,
    InsulationTestVoltage,
    InsulationResistance,
    InsulationLiveNeutral,
    InsulationLiveEarth,
    InsulationNeutralEarth,
    Polarity,
    Zs,
    MaxZs,
    Pfc,
    PfcLiveNeutral,
    PfcLiveEarth,
    FunctionalTesting,
    AfddTest,
    Notes,
    PhaseType,
    PhaseBalanceL1,
    PhaseBalanceL2,
    PhaseBalanceL3,
    PhaseRotation,
    LineToLineVoltage,
    AutoFilled,
}

impl Field {
    /// Parse the camelCase wire name used by the form-data blob.
    pub fn parse(name: &str) -> Option<Field> {
        Some(match name {
            "circuitNumber" => Field::CircuitNumber,
            "circuitDesignation" => Field::CircuitDesignation,
            "circuitDescription" => Field::CircuitDescription,
            "circuitType" => Field::CircuitType,
            "typeOfWiring" => Field::TypeOfWiring,
            "referenceMethod" => Field::ReferenceMethod,
            "pointsServed" => Field::PointsServed,
            "liveSize" => Field::LiveSize,
            "cpcSize" => Field::CpcSize,
            "cableSize" => Field::CableSize,
            "protectiveDeviceType" => Field::ProtectiveDeviceType,
            "protectiveDeviceCurve" => Field::ProtectiveDeviceCurve,
            "protectiveDeviceRating" => Field::ProtectiveDeviceRating,
            "protectiveDeviceKaRating" => Field::ProtectiveDeviceKaRating,
            "protectiveDeviceLocation" => Field::ProtectiveDeviceLocation,
            "bsStandard" => Field::BsStandard,
            "protectiveDevice" => Field::ProtectiveDevice,
            "rcdBsStandard" => Field::RcdBsStandard,
            "rcdType" => Field::RcdType,
            "rcdRating" => Field::RcdRating,
            "rcdRatingA" => Field::RcdRatingA,
            "rcdOneX" => Field::RcdOneX,
            "rcdTestButton" => Field::RcdTestButton,
            "ringR1" => Field::RingR1,
            "ringRn" => Field::RingRn,
            "ringR2" => Field::RingR2,
            "ringContinuityLive" => Field::RingContinuityLive,
            "ringContinuityNeutral" => Field::RingContinuityNeutral,
            "r1r2" => Field::R1R2,
            "r2" => Field::R2,
            "insulationTestVoltage" => Field::InsulationTestVoltage,
            "insulationResistance" => Field::InsulationResistance,
            "insulationLiveNeutral" => Field::InsulationLiveNeutral,
            "insulationLiveEarth" => Field::InsulationLiveEarth,
            "insulationNeutralEarth" => Field::InsulationNeutralEarth,
            "polarity" => Field::Polarity,
            "zs" => Field::Zs,
            "maxZs" => Field::MaxZs,
            "pfc" => Field::Pfc,
            "pfcLiveNeutral" => Field::PfcLiveNeutral,
            "pfcLiveEarth" => Field::PfcLiveEarth,
            "functionalTesting" => Field::FunctionalTesting,
            "afddTest" => Field::AfddTest,
            "notes" => Field::Notes,
            "phaseType" => Field::PhaseType,
            "phaseBalanceL1" => Field::PhaseBalanceL1,
            "phaseBalanceL2" => Field::PhaseBalanceL2,
            "phaseBalanceL3" => Field::PhaseBalanceL3,
            "phaseRotation" => Field::PhaseRotation,
            "lineToLineVoltage" => Field::LineToLineVoltage,
            "autoFilled" => Field::AutoFilled,
            _ => return None,
        })
    }

    /// Wire name of this field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::CircuitNumber => "circuitNumber",
            Field::CircuitDesignation => "circuitDesignation",
            Field::CircuitDescription => "circuitDescription",
            Field::CircuitType => "circuitType",
            Field::TypeOfWiring => "typeOfWiring",
            Field::ReferenceMethod => "referenceMethod",
            Field::PointsServed => "pointsServed",
            Field::LiveSize => "liveSize",
            Field::CpcSize => "cpcSize",
            Field::CableSize => "cableSize",
            Field::ProtectiveDeviceType => "protectiveDeviceType",
            Field::ProtectiveDeviceCurve => "protectiveDeviceCurve",
            Field::ProtectiveDeviceRating => "protectiveDeviceRating",
            Field::ProtectiveDeviceKaRating => "protectiveDeviceKaRating",
            Field::ProtectiveDeviceLocation => "protectiveDeviceLocation",
            Field::BsStandard => "bsStandard",
            Field::ProtectiveDevice => "protectiveDevice",
            Field::RcdBsStandard => "rcdBsStandard",
            Field::RcdType => "rcdType",
            Field::RcdRating => "rcdRating",
            Field::RcdRatingA => "rcdRatingA",
            Field::RcdOneX => "rcdOneX",
            Field::RcdTestButton => "rcdTestButton",
            Field::RingR1 => "ringR1",
            Field::RingRn => "ringRn",
            Field::RingR2 => "ringR2",
            Field::RingContinuityLive => "ringContinuityLive",
            Field::RingContinuityNeutral => "ringContinuityNeutral",
            Field::R1R2 => "r1r2",
            Field::R2 => "r2",
            Field::InsulationTestVoltage => "insulationTestVoltage",
            Field::InsulationResistance => "insulationResistance",
            Field::InsulationLiveNeutral => "insulationLiveNeutral",
            Field::InsulationLiveEarth => "insulationLiveEarth",
            Field::InsulationNeutralEarth => "insulationNeutralEarth",
            Field::Polarity => "polarity",
            Field::Zs => "zs",
            Field::MaxZs => "maxZs",
            Field::Pfc => "pfc",
            Field::PfcLiveNeutral => "pfcLiveNeutral",
            Field::PfcLiveEarth => "pfcLiveEarth",
            Field::FunctionalTesting => "functionalTesting",
            Field::AfddTest => "afddTest",
            Field::Notes => "notes",
            Field::PhaseType => "phaseType",
            Field::PhaseBalanceL1 => "phaseBalanceL1",
            Field::PhaseBalanceL2 => "phaseBalanceL2",
            Field::PhaseBalanceL3 => "phaseBalanceL3",
            Field::PhaseRotation => "phaseRotation",
            Field::LineToLineVoltage => "lineToLineVoltage",
            Field::AutoFilled => "autoFilled",
        }
    }
}
