//! Synchronous voice action router.
//!
//! The voice agent calls `dispatch` with an action name and a JSON
//! parameter map and expects one human-readable reply string back.
//! Every mutation goes through the engine operations, so voice edits
//! obey the same invariants as manual ones. Unknown actions and bad
//! parameters come back as messages, never errors.

use serde_json::Value;
use tracing::info;

use crate::engine::Schedule;
use crate::model::{Circuit, Field};
use crate::voice::aliases::{resolve_field, resolve_value};

/// Ephemeral per-conversation state: which board the tester is working
/// on and which circuit is selected within it. Not schedule data.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSession {
    /// Index into the current board's circuit list.
    pub selected: usize,
    pub board_id: String,
}

impl Default for VoiceSession {
    fn default() -> Self {
        VoiceSession {
            selected: 0,
            board_id: crate::model::MAIN_BOARD_ID.to_string(),
        }
    }
}

/// Fields `set_multiple_fields` accepts as direct parameter keys.
const MULTI_FIELD_KEYS: &[&str] = &[
    "zs",
    "r1r2",
    "polarity",
    "insulationTestVoltage",
    "insulationLiveEarth",
    "insulationLiveNeutral",
    "rcdOneX",
    "pfc",
];

/// Route one voice action. Always returns a reply for the agent to
/// speak back.
pub fn dispatch(
    schedule: &mut Schedule,
    session: &mut VoiceSession,
    action: &str,
    params: &Value,
) -> String {
    info!(action, "voice action");
    match action {
        "add_circuit" => add_circuit(schedule, session, params, None),
        "add_circuit_to_board" => {
            let board = match require_board(schedule, params) {
                Ok(b) => b,
                Err(msg) => return msg,
            };
            add_circuit(schedule, session, params, Some(board))
        }
        "update_field" => update_field(schedule, session, params),
        "next" => step_selection(schedule, session, 1),
        "previous" => step_selection(schedule, session, -1),
        "select" => select_circuit(schedule, session, params),
        "delete_circuit" => delete_circuit(schedule, session, params),
        "move_circuit" => move_circuit(schedule, session, params),
        "complete" => {
            let stats = schedule.completion_stats();
            format!(
                "{} of {} circuits complete ({}%)",
                stats.completed, stats.total, stats.percent
            )
        }
        "select_board" => select_board(schedule, session, params),
        "get_missing_tests" => get_missing_tests(schedule, session),
        "update_all_circuits" | "set_field_all_circuits" => set_field_all(schedule, params),
        "set_circuit_field" => set_circuit_field(schedule, session, params),
        "set_multiple_fields" => set_multiple_fields(schedule, session, params),
        "get_circuits_status" => circuits_status(&schedule.circuits.iter().collect::<Vec<_>>()),
        "set_board_field_all_circuits" => set_board_field_all(schedule, params),
        "get_board_status" => get_board_status(schedule, params),
        "scan_board" => {
            let board = param_str(params, "board").unwrap_or_default();
            if board.is_empty() {
                "Opening board scanner for: main board".to_string()
            } else {
                format!("Opening board scanner for: {board}")
            }
        }
        _ => "Unknown action".to_string(),
    }
}

// ---- parameter access ----------------------------------------------------

fn param_str(params: &Value, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn param_usize(params: &Value, key: &str) -> Option<usize> {
    match params.get(key)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().trim_start_matches(['C', 'c']).parse().ok(),
        _ => None,
    }
}

/// Resolve a spoken board name to its id, or a not-found message that
/// names the valid alternatives.
fn require_board(schedule: &Schedule, params: &Value) -> Result<String, String> {
    let Some(spoken) = param_str(params, "board").filter(|s| !s.trim().is_empty()) else {
        return Err("Missing board name".to_string());
    };
    resolve_board(schedule, &spoken)
}

fn resolve_board(schedule: &Schedule, spoken: &str) -> Result<String, String> {
    let needle = spoken.trim().to_lowercase();
    let found = schedule.boards.iter().find(|b| {
        b.id.to_lowercase() == needle
            || b.name.to_lowercase() == needle
            || b.name.to_lowercase().contains(&needle)
            || b.reference.to_lowercase() == needle
    });
    match found {
        Some(board) => Ok(board.id.clone()),
        None => {
            let names: Vec<&str> = schedule.boards.iter().map(|b| b.name.as_str()).collect();
            Err(format!(
                "Board '{spoken}' not found. Available boards: {}",
                names.join(", ")
            ))
        }
    }
}

/// Id of the circuit a command targets: an explicit number on the
/// session's board, or the current selection.
fn target_circuit_id(
    schedule: &Schedule,
    session: &VoiceSession,
    params: &Value,
) -> Result<String, String> {
    if let Some(number) = param_usize(params, "circuit_number") {
        return schedule
            .circuit_by_number(&session.board_id, &number.to_string())
            .map(|c| c.id.clone())
            .ok_or_else(|| format!("Circuit {number} not found"));
    }
    schedule
        .circuits_for_board(&session.board_id)
        .get(session.selected)
        .map(|c| c.id.clone())
        .ok_or_else(|| "No circuit selected".to_string())
}

// ---- actions ---------------------------------------------------------------

fn add_circuit(
    schedule: &mut Schedule,
    session: &mut VoiceSession,
    params: &Value,
    board_id: Option<String>,
) -> String {
    let circuit_type = param_str(params, "type").unwrap_or_default();
    let rating = param_str(params, "rating").unwrap_or_default();
    let description = param_str(params, "description")
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| circuit_type.clone());
    let board_id = board_id.unwrap_or_else(|| session.board_id.clone());

    let mut template = Circuit::default();
    template.circuit_description = description;
    template.circuit_type = circuit_type.clone();
    template.protective_device_rating = rating.clone();
    template.protective_device = rating;

    let added = schedule.add_circuit(&board_id, Some(template));
    let designation = added.circuit_designation.clone();

    session.board_id = board_id.clone();
    session.selected = schedule.circuits_for_board(&board_id).len() - 1;

    let board_name = schedule
        .board(&board_id)
        .map(|b| b.name.clone())
        .unwrap_or_default();
    if circuit_type.is_empty() {
        format!("Added circuit {designation} to {board_name}")
    } else {
        format!("Added circuit {designation} ({circuit_type}) to {board_name}")
    }
}

fn update_field(schedule: &mut Schedule, session: &mut VoiceSession, params: &Value) -> String {
    if schedule.is_empty() {
        return "No circuits to update. Add a circuit first.".to_string();
    }
    let Some(field_name) = param_str(params, "field") else {
        return "Missing field or value".to_string();
    };
    let Some(value) = param_str(params, "value") else {
        return "Missing field or value".to_string();
    };
    let Some(field) = resolve_field(&field_name) else {
        return format!("Unknown field '{field_name}'");
    };

    let id = match target_circuit_id(schedule, session, params) {
        Ok(id) => id,
        Err(msg) => return msg,
    };
    let resolved = resolve_value(field, &value);
    schedule.update_field(&id, field, &resolved);
    format!("Set {} to {resolved}", field.name())
}

fn step_selection(schedule: &Schedule, session: &mut VoiceSession, delta: isize) -> String {
    let circuits = schedule.circuits_for_board(&session.board_id);
    if circuits.is_empty() {
        return "No circuits on this board".to_string();
    }
    let next = session.selected as isize + delta;
    if next < 0 {
        return "Already on the first circuit".to_string();
    }
    if next as usize >= circuits.len() {
        return "Already on the last circuit".to_string();
    }
    session.selected = next as usize;
    format!(
        "Now on circuit {}",
        circuits[session.selected].circuit_designation
    )
}

fn select_circuit(schedule: &Schedule, session: &mut VoiceSession, params: &Value) -> String {
    let Some(number) = param_usize(params, "circuit_number") else {
        return "Missing circuit number".to_string();
    };
    let circuits = schedule.circuits_for_board(&session.board_id);
    match circuits
        .iter()
        .position(|c| c.circuit_number == number.to_string())
    {
        Some(index) => {
            session.selected = index;
            format!("Selected circuit C{number}")
        }
        None => format!("Circuit {number} not found"),
    }
}

fn delete_circuit(schedule: &mut Schedule, session: &mut VoiceSession, params: &Value) -> String {
    if schedule.circuits_for_board(&session.board_id).is_empty() {
        return "No circuits to delete".to_string();
    }
    let id = match target_circuit_id(schedule, session, params) {
        Ok(id) => id,
        Err(msg) => return msg,
    };
    // Voice deletes renumber so spoken numbers stay meaningful.
    let removed = match schedule.delete_circuit_renumbered(&id) {
        Some(c) => c,
        None => return "Circuit not found".to_string(),
    };
    let remaining = schedule.circuits_for_board(&session.board_id).len();
    if session.selected >= remaining && session.selected > 0 {
        session.selected -= 1;
    }
    format!("Deleted circuit {}", removed.circuit_designation)
}

fn move_circuit(schedule: &mut Schedule, session: &VoiceSession, params: &Value) -> String {
    let number = param_usize(params, "circuit_number");
    let position = param_usize(params, "position");
    let (Some(number), Some(position)) = (number, position) else {
        return "Missing circuit number or target position".to_string();
    };
    let Some(circuit) = schedule.circuit_by_number(&session.board_id, &number.to_string()) else {
        return format!("Circuit {number} not found");
    };
    let id = circuit.id.clone();
    schedule.move_circuit(&id, position).message().to_string()
}

fn select_board(schedule: &Schedule, session: &mut VoiceSession, params: &Value) -> String {
    let board_id = match require_board(schedule, params) {
        Ok(b) => b,
        Err(msg) => return msg,
    };
    session.board_id = board_id.clone();
    session.selected = 0;
    let name = schedule
        .board(&board_id)
        .map(|b| b.name.clone())
        .unwrap_or(board_id);
    format!("Selected board: {name}")
}

/// Missing-test checklist for one circuit, mirroring what the status
/// summaries report.
fn missing_tests(circuit: &Circuit) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if circuit.zs.is_empty() {
        missing.push("Zs");
    }
    if circuit.r1r2.is_empty() {
        missing.push("R1+R2");
    }
    if circuit.insulation_test_voltage.is_empty() {
        missing.push("IR voltage");
    }
    if circuit.insulation_live_earth.is_empty() {
        missing.push("IR L-E");
    }
    if circuit.insulation_live_neutral.is_empty() {
        missing.push("IR L-N");
    }
    if circuit.polarity.is_empty() {
        missing.push("polarity");
    }
    if circuit.rcd_one_x.is_empty() && !circuit.rcd_type.is_empty() {
        missing.push("RCD time");
    }
    missing
}

fn get_missing_tests(schedule: &Schedule, session: &VoiceSession) -> String {
    let circuits = schedule.circuits_for_board(&session.board_id);
    let Some(circuit) = circuits.get(session.selected) else {
        return "No circuit selected".to_string();
    };
    let missing = missing_tests(circuit);
    if missing.is_empty() {
        format!("{}: Complete", circuit.circuit_designation)
    } else {
        format!(
            "{} missing: {}",
            circuit.circuit_designation,
            missing.join(", ")
        )
    }
}

fn circuits_status(circuits: &[&Circuit]) -> String {
    if circuits.is_empty() {
        return "No circuits in schedule".to_string();
    }
    circuits
        .iter()
        .map(|c| {
            let missing = missing_tests(c);
            if missing.is_empty() {
                format!("{}: Complete", c.circuit_designation)
            } else {
                format!("{}: Missing: {}", c.circuit_designation, missing.join(", "))
            }
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn set_field_all(schedule: &mut Schedule, params: &Value) -> String {
    let (Some(field_name), Some(value)) = (param_str(params, "field"), param_str(params, "value"))
    else {
        return "Missing field or value".to_string();
    };
    let Some(field) = resolve_field(&field_name) else {
        return format!("Unknown field '{field_name}'");
    };
    let resolved = resolve_value(field, &value);
    let ids: Vec<String> = schedule.circuits.iter().map(|c| c.id.clone()).collect();
    let count = ids.len();
    for id in ids {
        schedule.update_field(&id, field, &resolved);
    }
    format!("Set {field_name} to {resolved} for all {count} circuits")
}

fn set_circuit_field(schedule: &mut Schedule, session: &VoiceSession, params: &Value) -> String {
    let number = param_usize(params, "circuit_number");
    let field_name = param_str(params, "field");
    let value = param_str(params, "value");
    let (Some(number), Some(field_name), Some(value)) = (number, field_name, value) else {
        return "Missing circuit number, field, or value".to_string();
    };
    let Some(field) = resolve_field(&field_name) else {
        return format!("Unknown field '{field_name}'");
    };
    let Some(circuit) = schedule.circuit_by_number(&session.board_id, &number.to_string()) else {
        return format!("Circuit {number} not found");
    };
    let id = circuit.id.clone();
    let resolved = resolve_value(field, &value);
    schedule.update_field(&id, field, &resolved);
    format!("Set circuit {number} {field_name} to {resolved}")
}

fn set_multiple_fields(
    schedule: &mut Schedule,
    session: &VoiceSession,
    params: &Value,
) -> String {
    let id = match target_circuit_id(schedule, session, params) {
        Ok(id) => id,
        Err(msg) => return msg,
    };

    let mut writes: Vec<(Field, String)> = Vec::new();
    for key in MULTI_FIELD_KEYS {
        if let Some(value) = param_str(params, key) {
            if let Some(field) = Field::parse(key) {
                writes.push((field, resolve_value(field, &value)));
            }
        }
    }
    if writes.is_empty() {
        return "No valid fields provided".to_string();
    }
    let count = writes.len();
    schedule.bulk_update(&id, &writes);
    let designation = schedule
        .circuit(&id)
        .map(|c| c.circuit_designation.clone())
        .unwrap_or_default();
    format!("Updated {count} fields on circuit {designation}")
}

fn set_board_field_all(schedule: &mut Schedule, params: &Value) -> String {
    let board_id = match require_board(schedule, params) {
        Ok(b) => b,
        Err(msg) => return msg,
    };
    let (Some(field_name), Some(value)) = (param_str(params, "field"), param_str(params, "value"))
    else {
        return "Missing field or value".to_string();
    };
    let Some(field) = resolve_field(&field_name) else {
        return format!("Unknown field '{field_name}'");
    };
    let resolved = resolve_value(field, &value);
    let ids: Vec<String> = schedule
        .circuits_for_board(&board_id)
        .iter()
        .map(|c| c.id.clone())
        .collect();
    let count = ids.len();
    for id in ids {
        schedule.update_field(&id, field, &resolved);
    }
    let name = schedule
        .board(&board_id)
        .map(|b| b.name.clone())
        .unwrap_or(board_id);
    format!("Set {field_name} to {resolved} for {count} circuits on {name}")
}

fn get_board_status(schedule: &Schedule, params: &Value) -> String {
    let spoken = param_str(params, "board").filter(|s| !s.trim().is_empty());
    match spoken {
        Some(spoken) => {
            let board_id = match resolve_board(schedule, &spoken) {
                Ok(b) => b,
                Err(msg) => return msg,
            };
            let circuits = schedule.circuits_for_board(&board_id);
            let name = schedule
                .board(&board_id)
                .map(|b| b.name.clone())
                .unwrap_or(board_id);
            if circuits.is_empty() {
                return format!("No circuits found on board: {name}");
            }
            format!(
                "{name} ({} circuits):\n{}",
                circuits.len(),
                circuits_status(&circuits)
            )
        }
        None => {
            let circuits: Vec<&Circuit> = schedule.circuits.iter().collect();
            if circuits.is_empty() {
                return "No circuits in schedule".to_string();
            }
            format!(
                "All boards ({} circuits):\n{}",
                circuits.len(),
                circuits_status(&circuits)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup() -> (Schedule, VoiceSession) {
        (Schedule::default(), VoiceSession::default())
    }

    #[test]
    fn add_and_update_via_voice() {
        let (mut s, mut session) = setup();
        let reply = dispatch(&mut s, &mut session, "add_circuit", &json!({"type": "Ring Final", "rating": "32"}));
        assert_eq!(reply, "Added circuit C2 (Ring Final) to Main CU");
        assert_eq!(session.selected, 1);

        let reply = dispatch(&mut s, &mut session, "update_field", &json!({"field": "zed s", "value": "0.42"}));
        assert_eq!(reply, "Set zs to 0.42");
        assert_eq!(s.circuits[1].zs, "0.42");
    }

    #[test]
    fn spoken_values_are_resolved() {
        let (mut s, mut session) = setup();
        dispatch(&mut s, &mut session, "update_field", &json!({"field": "polarity", "value": "ok"}));
        assert_eq!(s.circuits[0].polarity, "Satisfactory");
    }

    #[test]
    fn unknown_action_and_unknown_field() {
        let (mut s, mut session) = setup();
        assert_eq!(dispatch(&mut s, &mut session, "launch_rocket", &json!({})), "Unknown action");
        assert_eq!(
            dispatch(&mut s, &mut session, "update_field", &json!({"field": "frequency", "value": "50"})),
            "Unknown field 'frequency'"
        );
    }

    #[test]
    fn navigation_bounds() {
        let (mut s, mut session) = setup();
        assert_eq!(dispatch(&mut s, &mut session, "previous", &json!({})), "Already on the first circuit");
        assert_eq!(dispatch(&mut s, &mut session, "next", &json!({})), "Already on the last circuit");

        dispatch(&mut s, &mut session, "add_circuit", &json!({}));
        session.selected = 0;
        assert_eq!(dispatch(&mut s, &mut session, "next", &json!({})), "Now on circuit C2");
    }

    #[test]
    fn select_by_number() {
        let (mut s, mut session) = setup();
        dispatch(&mut s, &mut session, "add_circuit", &json!({}));
        assert_eq!(dispatch(&mut s, &mut session, "select", &json!({"circuit_number": 1})), "Selected circuit C1");
        assert_eq!(session.selected, 0);
        assert_eq!(dispatch(&mut s, &mut session, "select", &json!({"circuit_number": 9})), "Circuit 9 not found");
    }

    #[test]
    fn voice_delete_renumbers() {
        let (mut s, mut session) = setup();
        dispatch(&mut s, &mut session, "add_circuit", &json!({}));
        dispatch(&mut s, &mut session, "add_circuit", &json!({}));

        let reply = dispatch(&mut s, &mut session, "delete_circuit", &json!({"circuit_number": 1}));
        assert_eq!(reply, "Deleted circuit C1");
        let numbers: Vec<String> = s.circuits.iter().map(|c| c.circuit_number.clone()).collect();
        assert_eq!(numbers, ["1", "2"]);
    }

    #[test]
    fn move_requires_both_params() {
        let (mut s, mut session) = setup();
        assert_eq!(
            dispatch(&mut s, &mut session, "move_circuit", &json!({"circuit_number": 1})),
            "Missing circuit number or target position"
        );
        dispatch(&mut s, &mut session, "add_circuit", &json!({}));
        let reply = dispatch(&mut s, &mut session, "move_circuit", &json!({"circuit_number": 2, "position": 1}));
        assert_eq!(reply, "Moved C2 from position 2 to 1");
    }

    #[test]
    fn board_selection_names_alternatives() {
        let (mut s, mut session) = setup();
        s.add_board(); // DB1
        let reply = dispatch(&mut s, &mut session, "select_board", &json!({"board": "garage"}));
        assert_eq!(reply, "Board 'garage' not found. Available boards: Main CU, DB1");

        let reply = dispatch(&mut s, &mut session, "select_board", &json!({"board": "db1"}));
        assert_eq!(reply, "Selected board: DB1");
        assert_ne!(session.board_id, crate::model::MAIN_BOARD_ID);
    }

    #[test]
    fn board_scoped_add_and_status() {
        let (mut s, mut session) = setup();
        s.add_board();
        let reply = dispatch(&mut s, &mut session, "add_circuit_to_board", &json!({"board": "DB1", "type": "Lights"}));
        assert_eq!(reply, "Added circuit C1 (Lights) to DB1");

        let reply = dispatch(&mut s, &mut session, "get_board_status", &json!({"board": "DB1"}));
        assert!(reply.starts_with("DB1 (1 circuits):"));
        assert!(reply.contains("C1: Missing:"));
    }

    #[test]
    fn bulk_field_updates() {
        let (mut s, mut session) = setup();
        dispatch(&mut s, &mut session, "add_circuit", &json!({}));

        let reply = dispatch(
            &mut s,
            &mut session,
            "set_field_all_circuits",
            &json!({"field": "insulation test voltage", "value": "500"}),
        );
        assert_eq!(reply, "Set insulation test voltage to 500V for all 2 circuits");
        assert!(s.circuits.iter().all(|c| c.insulation_test_voltage == "500V"));

        assert_eq!(
            dispatch(&mut s, &mut session, "set_field_all_circuits", &json!({"field": "zs"})),
            "Missing field or value"
        );
    }

    #[test]
    fn multiple_fields_on_one_circuit() {
        let (mut s, mut session) = setup();
        let reply = dispatch(
            &mut s,
            &mut session,
            "set_multiple_fields",
            &json!({"circuit_number": 1, "zs": "0.3", "polarity": "ok", "r1r2": "0.15"}),
        );
        assert_eq!(reply, "Updated 3 fields on circuit C1");
        assert_eq!(s.circuits[0].polarity, "Satisfactory");
        assert_eq!(s.circuits[0].r1r2, "0.15");

        assert_eq!(
            dispatch(&mut s, &mut session, "set_multiple_fields", &json!({"circuit_number": 1})),
            "No valid fields provided"
        );
    }

    #[test]
    fn missing_tests_report() {
        let (mut s, mut session) = setup();
        let reply = dispatch(&mut s, &mut session, "get_missing_tests", &json!({}));
        assert!(reply.starts_with("C1 missing:"));
        assert!(reply.contains("Zs"));

        let id = s.circuits[0].id.clone();
        s.bulk_update(
            &id,
            &[
                (Field::Zs, "0.4".into()),
                (Field::R1R2, "0.2".into()),
                (Field::InsulationTestVoltage, "500V".into()),
                (Field::InsulationLiveEarth, ">999".into()),
                (Field::InsulationLiveNeutral, ">999".into()),
                (Field::Polarity, "Satisfactory".into()),
            ],
        );
        assert_eq!(dispatch(&mut s, &mut session, "get_missing_tests", &json!({})), "C1: Complete");
    }

    #[test]
    fn completion_summary() {
        let (mut s, mut session) = setup();
        assert_eq!(dispatch(&mut s, &mut session, "complete", &json!({})), "0 of 1 circuits complete (0%)");
    }
}
