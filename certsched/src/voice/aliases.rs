//! Spoken-name resolution for voice commands.
//!
//! Voice agents send field names the way testers say them ("breaker
//! rating", "zed s", "loop impedance") and values the way they are
//! spoken ("polarity ok", "five hundred volts"). Both are resolved
//! here before anything reaches the engine, so a misheard field fails
//! with a message instead of writing a stray key.

use crate::model::Field;

/// Resolve a spoken field name to a typed field.
///
/// Accepts the canonical camelCase wire name, the snake_case tool
/// name, and the common spoken aliases.
pub fn resolve_field(spoken: &str) -> Option<Field> {
    // Exact wire name first.
    if let Some(field) = Field::parse(spoken) {
        return Some(field);
    }

    let key = spoken.trim().to_lowercase().replace(['_', '-'], " ");
    let field = match key.as_str() {
        "circuit number" | "circuit" | "number" | "circuit num" => Field::CircuitNumber,
        "circuit description" | "description" | "desc" | "circuit desc" => {
            Field::CircuitDescription
        }
        "circuit type" | "type" => Field::CircuitType,
        "type of wiring" | "wiring" | "wiring type" => Field::TypeOfWiring,
        "protective device rating" | "rating" | "breaker rating" | "mcb rating"
        | "device rating" => Field::ProtectiveDeviceRating,
        "protective device type" | "device type" | "breaker type" | "mcb type" | "device" => {
            Field::ProtectiveDeviceType
        }
        "protective device curve" | "curve" | "trip curve" => Field::ProtectiveDeviceCurve,
        "bs standard" | "standard" => Field::BsStandard,
        "cable size" | "cable" | "live size" | "conductor size" => Field::LiveSize,
        "cpc size" | "cpc" | "earth size" | "earth conductor" => Field::CpcSize,
        "reference method" | "ref method" | "installation method" => Field::ReferenceMethod,
        "zs" | "earth fault loop" | "impedance" | "loop impedance" | "zed s" => Field::Zs,
        "max zs" | "max impedance" | "maximum zs" | "max zed s" => Field::MaxZs,
        "r1r2" | "r1 plus r2" | "continuity" | "r1 r2" => Field::R1R2,
        "r2" | "earth continuity" | "r 2" => Field::R2,
        "insulation resistance" | "ir" | "insulation" | "meg" => Field::InsulationResistance,
        "insulation test voltage" | "ir voltage" | "test voltage" => Field::InsulationTestVoltage,
        "insulation live earth" | "ir l e" | "ir live earth" => Field::InsulationLiveEarth,
        "insulation live neutral" | "ir l n" | "ir live neutral" => Field::InsulationLiveNeutral,
        "polarity" | "pol" => Field::Polarity,
        "rcd type" | "rcd" | "residual current device type" => Field::RcdType,
        "rcd rating" | "rcd ma" | "rcd milliamps" | "trip rating" => Field::RcdRating,
        "rcd trip time" | "trip time" | "rcd time" | "disconnect time" | "rcd one x" => {
            Field::RcdOneX
        }
        "rcd test button" | "test button" => Field::RcdTestButton,
        "afdd" | "afdd test" => Field::AfddTest,
        "pfc" | "fault current" | "prospective fault current" => Field::Pfc,
        "points served" | "points" | "outlets" => Field::PointsServed,
        "functional testing" | "functional" => Field::FunctionalTesting,
        "notes" | "note" | "comment" | "remarks" => Field::Notes,
        _ => return None,
    };
    Some(field)
}

/// Resolve a spoken value to the dropdown token the schedule stores.
/// Fields without a constrained vocabulary pass the value through.
pub fn resolve_value(field: Field, spoken: &str) -> String {
    let lower = spoken.trim().to_lowercase();
    match field {
        Field::Polarity | Field::FunctionalTesting | Field::RcdTestButton | Field::AfddTest => {
            match lower.as_str() {
                "ok" | "okay" | "good" | "pass" | "passed" | "correct" | "satisfactory"
                | "yes" | "tick" => "Satisfactory".to_string(),
                "fail" | "failed" | "bad" | "unsatisfactory" | "no" => {
                    "Unsatisfactory".to_string()
                }
                "n/a" | "na" | "not applicable" => "N/A".to_string(),
                _ => spoken.trim().to_string(),
            }
        }
        Field::InsulationTestVoltage => match lower.as_str() {
            "250" | "250 volts" | "two fifty" => "250V".to_string(),
            "500" | "500 volts" | "five hundred" | "five hundred volts" => "500V".to_string(),
            "1000" | "1000 volts" | "one thousand" => "1000V".to_string(),
            _ => spoken.trim().to_string(),
        },
        Field::ReferenceMethod => {
            let upper = spoken.trim().to_uppercase();
            match upper.as_str() {
                "A" | "B" | "C" => upper,
                "100" | "101" | "102" | "103" => {
                    crate::reference::normalise_reference_method(spoken)
                }
                _ => spoken.trim().to_string(),
            }
        }
        Field::RcdType => match lower.as_str() {
            "a" | "type a" => "A".to_string(),
            "ac" | "type ac" => "AC".to_string(),
            "b" | "type b" => "B".to_string(),
            "f" | "type f" => "F".to_string(),
            _ => spoken.trim().to_string(),
        },
        Field::ProtectiveDeviceCurve => {
            let upper = spoken.trim().to_uppercase();
            let upper = upper.trim_start_matches("TYPE ").trim().to_string();
            if crate::reference::VALID_CURVES.contains(&upper.as_str()) {
                upper
            } else {
                spoken.trim().to_string()
            }
        }
        _ => spoken.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spoken_aliases() {
        assert_eq!(resolve_field("breaker rating"), Some(Field::ProtectiveDeviceRating));
        assert_eq!(resolve_field("zed s"), Some(Field::Zs));
        assert_eq!(resolve_field("r1 plus r2"), Some(Field::R1R2));
        assert_eq!(resolve_field("earth size"), Some(Field::CpcSize));
        assert_eq!(resolve_field("trip_time"), Some(Field::RcdOneX));
    }

    #[test]
    fn wire_names_resolve_directly() {
        assert_eq!(resolve_field("protectiveDeviceRating"), Some(Field::ProtectiveDeviceRating));
        assert_eq!(resolve_field("insulationLiveEarth"), Some(Field::InsulationLiveEarth));
    }

    #[test]
    fn unknown_field_names_fail() {
        assert_eq!(resolve_field("frequency"), None);
    }

    #[test]
    fn polarity_vocabulary() {
        assert_eq!(resolve_value(Field::Polarity, "ok"), "Satisfactory");
        assert_eq!(resolve_value(Field::Polarity, "pass"), "Satisfactory");
        assert_eq!(resolve_value(Field::Polarity, "failed"), "Unsatisfactory");
        assert_eq!(resolve_value(Field::Polarity, "Reversed L-N"), "Reversed L-N");
    }

    #[test]
    fn insulation_voltage_vocabulary() {
        assert_eq!(resolve_value(Field::InsulationTestVoltage, "500"), "500V");
        assert_eq!(resolve_value(Field::InsulationTestVoltage, "five hundred"), "500V");
    }

    #[test]
    fn curve_vocabulary() {
        assert_eq!(resolve_value(Field::ProtectiveDeviceCurve, "type b"), "B");
        assert_eq!(resolve_value(Field::ProtectiveDeviceCurve, "c"), "C");
    }

    #[test]
    fn free_text_fields_pass_through() {
        assert_eq!(resolve_value(Field::Zs, "0.42"), "0.42");
        assert_eq!(resolve_value(Field::Notes, "verify later"), "verify later");
    }
}
