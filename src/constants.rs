//! AGA Report No. 3 constants, US customary units.
//!
//! Lengths in inches, differential pressure in inches of water at 60 °F,
//! static pressure in psi, temperature in °F, density in lbm/ft³ and
//! viscosity in centipoise.

/// Mass flow unit conversion: lbm/h from in, lbm/ft³ and inH2O.
pub const N_C: f64 = 323.279;
/// Inches of water (60 °F) per psi.
pub const N3: f64 = 27.7070;
/// Tap position unit conversion (inches).
pub const N4: f64 = 1.0;
/// Iteration flow factor unit conversion, viscosity in cP.
pub const N_IC: f64 = 6.23582e-4;

/// Reference temperature of the plate and tube bore measurements.
pub const T_R: f64 = 68.0;

// Reader-Harris/Gallagher coefficients, flange taps.
pub const A0: f64 = 0.5961;
pub const A1: f64 = 0.0291;
pub const A2: f64 = -0.2290;
pub const A3: f64 = 0.003;
pub const A4: f64 = 2.8;
pub const A5: f64 = 0.000511;
pub const A6: f64 = 0.0210;
pub const S1: f64 = 0.0049;
pub const S2: f64 = 0.0433;
pub const S3: f64 = 0.0712;
pub const S4: f64 = -0.1145;
pub const S5: f64 = -0.2300;
pub const S6: f64 = -0.0116;
pub const S7: f64 = -0.5200;
pub const S8: f64 = -0.1400;

/// `X = 4000 / Re_D` above which the low Reynolds number form applies.
pub const X_C: f64 = 1.142139337256165;
/// Low Reynolds number blend constants, continuous with `X^0.35` at `X_C`.
pub const LOW_RE_A: f64 = 4.343524261523267;
pub const LOW_RE_B: f64 = 3.764387693320165;

/// Upper bound on the iteration flow factor for vanishing flow.
pub const MAX_FLOW_FACTOR: f64 = 1000.0;
