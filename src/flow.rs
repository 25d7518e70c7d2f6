use std::f64::consts::FRAC_PI_4;

use crate::constants::N_C;

/// Mass flow in lbm/h.
pub fn mass_flow(c_d: f64, orifice_d: f64, differential: f64, e_v: f64, rho_f: f64, y: f64) -> f64 {
    FRAC_PI_4 * N_C * c_d * e_v * y * orifice_d.powi(2) * (2.0 * rho_f * differential).sqrt()
}

/// Volumetric flow at flowing conditions, ft³/h.
pub fn actual_flow(
    c_d: f64,
    orifice_d: f64,
    differential: f64,
    e_v: f64,
    rho_f: f64,
    y: f64,
) -> f64 {
    mass_flow(c_d, orifice_d, differential, e_v, rho_f, y) / rho_f
}

/// Volumetric flow referred to base conditions, ft³/h.
pub fn base_flow(
    c_d: f64,
    orifice_d: f64,
    differential: f64,
    e_v: f64,
    rho_b: f64,
    rho_f: f64,
    y: f64,
) -> f64 {
    mass_flow(c_d, orifice_d, differential, e_v, rho_f, y) / rho_b
}
