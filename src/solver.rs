//! Newton iteration on the discharge coefficient / Reynolds number coupling.

use log::debug;
use thiserror::Error;

use crate::constants::{MAX_FLOW_FACTOR, N_IC};
use crate::discharge::DischargeTerms;

/// Iteration limit and convergence tolerance for the discharge coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    max_iters: usize,
    tolerance: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SolverConfigError {
    #[error("max_iters must be at least 1")]
    MaxIters,

    #[error("tolerance must be finite and positive")]
    Tolerance,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iters: 20,
            tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    /// # Errors
    ///
    /// Returns an error if `max_iters` is zero or `tolerance` is not a
    /// positive finite number.
    pub fn new(max_iters: usize, tolerance: f64) -> Result<Self, SolverConfigError> {
        if max_iters == 0 {
            return Err(SolverConfigError::MaxIters);
        }
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(SolverConfigError::Tolerance);
        }
        Ok(Self {
            max_iters,
            tolerance,
        })
    }

    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// Whether the last Newton step met the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Converged,
    MaxIters,
}

/// Discharge coefficient after iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeSolution {
    pub status: Status,
    pub c_d: f64,
    /// `X = 4000 / Re_D` at the reported coefficient.
    pub x: f64,
    pub iters: usize,
}

impl DischargeSolution {
    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Pipe Reynolds number implied by the reported coefficient.
    pub fn reynolds(&self) -> f64 {
        4000.0 / self.x
    }
}

/// Flow factor `F_I` with `X = F_I / C_d`.
///
/// Bores in inches, `differential` in inH2O, viscosity in cP and density in
/// lbm/ft³. Clamped to 1000 as the flow vanishes; NaN inputs give NaN.
pub fn iteration_flow_factor(
    orifice_d: f64,
    meter_d: f64,
    differential: f64,
    e_v: f64,
    mu: f64,
    rho_f: f64,
    y: f64,
) -> f64 {
    let f_ic = 4000.0 * N_IC * meter_d * mu / (e_v * y * orifice_d.powi(2));
    let f_ip = (2.0 * rho_f * differential).sqrt();

    if f_ic >= MAX_FLOW_FACTOR * f_ip {
        MAX_FLOW_FACTOR
    } else {
        f_ic / f_ip
    }
}

/// Solves `C_d = F(F_I / C_d)` starting from the infinite-Reynolds value.
///
/// Never fails: when the tolerance is not met within the iteration limit the
/// last iterate is returned with [`Status::MaxIters`].
pub fn solve(terms: &DischargeTerms, flow_factor: f64, config: &SolverConfig) -> DischargeSolution {
    let mut c_d = terms.c_d0;

    for iter in 1..=config.max_iters {
        let x = flow_factor / c_d;
        let eval = terms.evaluate(x);
        let delta = (c_d - eval.value) / (1.0 + eval.log_slope / c_d);
        c_d -= delta;

        debug!("iter {iter}: X = {x:.6e}, C_d = {c_d:.8}, dC_d = {delta:.3e}");

        if delta.abs() < config.tolerance {
            return DischargeSolution {
                status: Status::Converged,
                c_d,
                x: flow_factor / c_d,
                iters: iter,
            };
        }
    }

    DischargeSolution {
        status: Status::MaxIters,
        c_d,
        x: flow_factor / c_d,
        iters: config.max_iters,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn terms() -> DischargeTerms {
        DischargeTerms::new(3.826, 2.0 / 3.826)
    }

    #[test]
    fn config_validation() {
        assert_eq!(SolverConfig::new(0, 1e-6), Err(SolverConfigError::MaxIters));
        assert_eq!(SolverConfig::new(20, 0.0), Err(SolverConfigError::Tolerance));
        assert_eq!(SolverConfig::new(20, f64::NAN), Err(SolverConfigError::Tolerance));
        assert_eq!(SolverConfig::new(20, 1e-6), Ok(SolverConfig::default()));
    }

    #[test]
    fn flow_factor_for_three_inch_run() {
        let beta: f64 = 2.0 / 3.826;
        let e_v = 1.0 / (1.0 - beta.powi(4)).sqrt();
        let f_i = iteration_flow_factor(2.0, 3.826, 50.0, e_v, 0.012, 1.6, 0.998807324);
        assert_relative_eq!(f_i, 0.00217985, max_relative = 1e-5);
    }

    #[test]
    fn flow_factor_clamps_for_vanishing_flow() {
        assert_eq!(iteration_flow_factor(0.25, 3.826, 1e-4, 1.0, 0.012, 0.01, 1.0), 1000.0);
        assert_eq!(iteration_flow_factor(2.0, 3.826, 0.0, 1.04, 0.012, 1.6, 1.0), 1000.0);
    }

    #[test]
    fn flow_factor_does_not_clamp_nan() {
        assert!(iteration_flow_factor(2.0, 3.826, 50.0, 1.04, f64::NAN, 1.6, 1.0).is_nan());
        assert!(iteration_flow_factor(2.0, 3.826, f64::NAN, 1.04, 0.012, 1.6, 1.0).is_nan());
        assert!(iteration_flow_factor(2.0, 3.826, 50.0, 1.04, 0.012, 1.6, f64::NAN).is_nan());
    }

    #[test]
    fn converges_at_high_reynolds() {
        let solution = solve(&terms(), 0.0021798501376016303, &SolverConfig::default());

        assert_eq!(solution.status, Status::Converged);
        assert!(solution.iters <= 3);
        assert_relative_eq!(solution.c_d, 0.603888787, epsilon = 1e-8);
        assert_relative_eq!(solution.reynolds(), 1.108129e6, max_relative = 1e-5);
    }

    #[test]
    fn solution_is_a_fixed_point() {
        let t = terms();
        for f_i in [1e-4, 0.05, 0.9, 30.0, 1000.0] {
            let solution = solve(&t, f_i, &SolverConfig::default());
            assert!(solution.converged(), "F_I = {f_i}");
            assert_relative_eq!(t.evaluate(solution.x).value, solution.c_d, epsilon = 1e-6);
        }
    }

    #[test]
    fn zero_flow_factor_returns_c_d0() {
        let t = terms();
        let solution = solve(&t, 0.0, &SolverConfig::default());
        assert!(solution.converged());
        assert_eq!(solution.iters, 1);
        assert_eq!(solution.c_d, t.c_d0);
    }

    #[test]
    fn nan_flow_factor_stops_at_limit() {
        let solution = solve(&terms(), f64::NAN, &SolverConfig::default());
        assert_eq!(solution.status, Status::MaxIters);
        assert_eq!(solution.iters, 20);
    }

    #[test]
    fn near_unity_beta_in_small_run_oscillates() {
        // beta 0.98 in a 2 in run at F_I = 20 cycles without settling
        let solution = solve(&DischargeTerms::new(2.0, 0.98), 20.0, &SolverConfig::default());
        assert_eq!(solution.status, Status::MaxIters);
        assert_eq!(solution.iters, 20);
        assert!(!solution.converged());
    }

    #[test]
    fn tight_budget_reports_last_iterate() {
        let config = SolverConfig::new(1, 1e-6).unwrap();
        let solution = solve(&terms(), 0.0021798501376016303, &config);

        assert_eq!(solution.status, Status::MaxIters);
        assert_eq!(solution.iters, 1);
        assert_relative_eq!(solution.c_d, 0.60388878, epsilon = 1e-6);
    }
}
