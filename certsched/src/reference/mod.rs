//! Static reference data and derivation rules: cable sizes, device
//! standards, and the max-Zs tables from BS 7671.

pub mod cable;
pub mod device;
pub mod zs;

pub use cable::{normalise_cable_size, twin_and_earth_cpc_for};
pub use device::{
    base_device_type, default_bs_standard, fix_device_type_naming, normalise_rating,
    normalise_reference_method, DeviceKind, VALID_CURVES,
};
pub use zs::max_zs_for_device;
