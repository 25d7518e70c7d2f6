//! Reader-Harris/Gallagher discharge coefficient for flange-tapped plates.
//!
//! The correlation is written in terms of `X = 4000 / Re_D` so that the
//! Reynolds dependence separates into five geometry-only terms:
//!
//! ```text
//! C_d(X) = C_d0 + C_d1·X^0.7 + C_d2·X^0.35 + C_d3·X^1.15 + C_d4·X^0.8
//! ```
//!
//! Past `X_C` the `X^0.35` factor is replaced by `A - B/X`.

use crate::constants::{
    A0, A1, A2, A3, A4, A5, A6, LOW_RE_A, LOW_RE_B, N4, S1, S2, S3, S4, S5, S6, S7, S8, X_C,
};

/// The Reynolds-independent terms of the correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeTerms {
    pub c_d0: f64,
    pub c_d1: f64,
    pub c_d2: f64,
    pub c_d3: f64,
    pub c_d4: f64,
}

/// Value of the correlation at `X` together with `X·dC_d/dX`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub log_slope: f64,
}

impl DischargeTerms {
    /// Terms for corrected tube bore `meter_d` (inches) and diameter ratio `beta`.
    pub fn new(meter_d: f64, beta: f64) -> Self {
        let l1 = N4 / meter_d;
        let m2 = 2.0 * l1 / (1.0 - beta);
        let beta4 = beta.powi(4);

        let t_u = (S2 + S3 * (-8.5 * l1).exp() + S4 * (-6.0 * l1).exp()) * beta4 / (1.0 - beta4);
        let t_d = S6 * (m2 + S7 * m2.powf(1.3)) * beta.powf(1.1);
        let t_s = if meter_d >= A4 * N4 {
            0.0
        } else {
            A3 * (1.0 - beta) * (A4 - meter_d / N4)
        };

        let re_scale = 250.0_f64.powf(0.35);
        let a_scale = (4.75 * beta).powf(0.8);

        Self {
            c_d0: A0 + A1 * beta.powi(2) + A2 * beta.powi(8) + t_u + t_d + t_s,
            c_d1: A5 * (250.0 * beta).powf(0.7),
            c_d2: A6 * beta4 * re_scale,
            c_d3: S1 * beta4 * a_scale * re_scale,
            c_d4: (S5 * t_u + S8 * t_d) * a_scale,
        }
    }

    /// Evaluates the correlation at `x = 4000 / Re_D`.
    pub fn evaluate(&self, x: f64) -> Evaluation {
        let x_08 = x.powf(0.8);

        if x < X_C {
            let x_035 = x.powf(0.35);
            Evaluation {
                value: self.c_d0
                    + (self.c_d1 * x_035 + self.c_d2 + self.c_d3 * x_08) * x_035
                    + self.c_d4 * x_08,
                log_slope: (0.7 * self.c_d1 * x_035 + 0.35 * self.c_d2 + 1.15 * self.c_d3 * x_08)
                    * x_035
                    + 0.8 * self.c_d4 * x_08,
            }
        } else {
            let blend = LOW_RE_A - LOW_RE_B / x;
            let x_07 = x.powf(0.7);
            let inner = self.c_d2 + self.c_d3 * x_08;
            Evaluation {
                value: self.c_d0 + self.c_d1 * x_07 + inner * blend + self.c_d4 * x_08,
                log_slope: 0.7 * self.c_d1 * x_07
                    + inner * LOW_RE_B / x
                    + 0.8 * self.c_d3 * x_08 * blend
                    + 0.8 * self.c_d4 * x_08,
            }
        }
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
    fn terms_for_three_inch_run() {
        let t = terms();
        assert_relative_eq!(t.c_d0, 0.602068, epsilon = 1e-6);
        assert_relative_eq!(t.c_d1, 0.015480, epsilon = 1e-6);
        assert_relative_eq!(t.c_d2, 0.010830, epsilon = 1e-6);
        assert_relative_eq!(t.c_d3, 0.005231, epsilon = 1e-6);
        assert_relative_eq!(t.c_d4, -0.000203, epsilon = 1e-6);
    }

    #[test]
    fn infinite_reynolds_is_c_d0() {
        let t = terms();
        let eval = t.evaluate(0.0);
        assert_eq!(eval.value, t.c_d0);
        assert_eq!(eval.log_slope, 0.0);
    }

    #[test]
    fn continuous_across_low_reynolds_switch() {
        let t = terms();
        let below = t.evaluate(X_C * (1.0 - 1e-12)).value;
        let above = t.evaluate(X_C).value;
        assert_relative_eq!(below, above, epsilon = 1e-9);
    }

    #[test]
    fn log_slope_matches_finite_difference() {
        let t = terms();
        for x in [0.01, 0.3, 2.5, 40.0] {
            let h = x * 1e-6;
            let numeric = x * (t.evaluate(x + h).value - t.evaluate(x - h).value) / (2.0 * h);
            assert_relative_eq!(t.evaluate(x).log_slope, numeric, max_relative = 1e-5);
        }
    }

    #[test]
    fn small_pipe_term_vanishes_at_threshold() {
        let beta = 0.5;
        let at = DischargeTerms::new(A4 * N4, beta);
        let just_below = DischargeTerms::new(A4 * N4 * (1.0 - 1e-12), beta);
        assert_relative_eq!(at.c_d0, just_below.c_d0, epsilon = 1e-9);

        let small = DischargeTerms::new(2.0, beta);
        assert!(small.c_d0 > A0);
    }
}
