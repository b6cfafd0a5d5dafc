//! Physical constants shared by the channel transforms.

/// Electron rest energy in eV.
pub const ELECTRON_REST_ENERGY_EV: f64 = 510_998.95_f64;
/// Speed of light in cm/s.
pub const SPEED_OF_LIGHT_CM_S: f64 = 29_979_245_800.0_f64;
/// Electron molar mass in g/mol.
pub const ELECTRON_MOLAR_MASS: f64 = 5.485_799_090_65e-4_f64;
pub const EV_TO_MEV: f64 = 1.0e-6;
/// Energy factor of the second synthetic leading row.
pub const BOOTSTRAP_ENERGY_FACTOR: f64 = 0.99;

/// Pair-production threshold `2 m_e c^2` in MeV.
pub fn pair_threshold_mev() -> f64 {
    2.0 * ELECTRON_REST_ENERGY_EV * EV_TO_MEV
}
