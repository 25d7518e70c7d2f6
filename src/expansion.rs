use crate::constants::N3;

/// Ratio of differential to upstream absolute static pressure.
pub fn x_factor(differential: f64, p_abs: f64) -> f64 {
    differential / (N3 * p_abs)
}

/// Expansion factor referred to the upstream tap.
///
/// `differential` in inH2O, `p_abs` in psia. Only meaningful for `k > 0`;
/// see [`expansion_factor_or_unity`].
pub fn expansion_factor(beta: f64, differential: f64, p_abs: f64, k: f64) -> f64 {
    let y_p = (0.41 + 0.35 * beta.powi(4)) / k;
    1.0 - y_p * x_factor(differential, p_abs)
}

/// As [`expansion_factor`], but exactly `1.0` when no isentropic exponent is given.
pub fn expansion_factor_or_unity(beta: f64, differential: f64, p_abs: f64, k: f64) -> f64 {
    if k > 0.0 {
        expansion_factor(beta, differential, p_abs, k)
    } else {
        1.0
    }
}
