//! Maximum earth-fault loop impedance (max Zs) derivation.
//!
//! BS 7671 tabulates the Zs that guarantees 0.4 s disconnection for
//! each device. Measured values are compared against 80% of the
//! tabulated limit (Regulation 411.4.4) to allow for conductor
//! temperature during the test, so the derated figure is what the
//! schedule records.

use crate::reference::device::DeviceKind;

/// 230 V nominal supply, pre-derated to 80%.
const DERATED_VOLTAGE: f64 = 230.0 * 0.8;
const DERATING: f64 = 0.8;

/// BS 3036 semi-enclosed (rewirable) fuses, 0.4 s disconnection.
const BS_3036_ZS: &[(u32, f64)] = &[(5, 10.45), (15, 2.67), (20, 1.85), (30, 1.14), (45, 0.62)];

/// BS 1361 cartridge fuses, 0.4 s disconnection.
const BS_1361_ZS: &[(u32, f64)] = &[(5, 10.9), (15, 3.43), (20, 1.86), (30, 1.2), (45, 0.6)];

fn fuse_table_lookup(table: &[(u32, f64)], rating: u32) -> Option<f64> {
    table.iter().find(|(r, _)| *r == rating).map(|(_, zs)| *zs)
}

/// Instantaneous-trip multiple of In for each MCB/RCBO curve.
fn curve_multiplier(curve: &str) -> Option<f64> {
    match curve.trim().to_uppercase().as_str() {
        "B" => Some(5.0),
        "C" => Some(10.0),
        "D" => Some(20.0),
        _ => None,
    }
}

/// Derated max Zs, Ω. Breakers disconnect magnetically at a fixed
/// multiple of In, so their limit is computed (U0 / (k × In)) rather
/// than tabulated; fuse limits come from the 0.4 s tables.
fn derated_max_zs(bs_standard: &str, curve: &str, rating: u32) -> Option<f64> {
    let upper = bs_standard.to_uppercase();

    if upper.contains("60898") || upper.contains("61009") {
        let k = curve_multiplier(curve)?;
        return Some(DERATED_VOLTAGE / (k * rating as f64));
    }

    if upper.contains("3036") {
        return fuse_table_lookup(BS_3036_ZS, rating).map(|zs| zs * DERATING);
    }
    if upper.contains("1361") {
        return fuse_table_lookup(BS_1361_ZS, rating).map(|zs| zs * DERATING);
    }

    // Label carries a device name rather than a standard number.
    match DeviceKind::classify(bs_standard) {
        Some(kind) if kind.requires_curve() => {
            let k = curve_multiplier(curve)?;
            Some(DERATED_VOLTAGE / (k * rating as f64))
        }
        Some(DeviceKind::Fuse) => fuse_table_lookup(BS_1361_ZS, rating).map(|zs| zs * DERATING),
        _ => None,
    }
}

/// Max Zs for the device, derated to 80% per Regulation 411.4.4,
/// formatted to two decimal places.
///
/// Empty when the BS standard or rating is missing, or when the device
/// needs a curve (MCB/RCBO) and none was given.
pub fn max_zs_for_device(bs_standard: &str, curve: &str, rating: &str) -> String {
    if bs_standard.trim().is_empty() || rating.trim().is_empty() {
        return String::new();
    }
    let rating: u32 = match rating.trim().parse() {
        Ok(r) if r > 0 => r,
        _ => return String::new(),
    };

    match derated_max_zs(bs_standard, curve, rating) {
        Some(zs) => format!("{zs:.2}"),
        None => String::new(),
    }
}
