//! Single-reading flow computation.

use log::{debug, warn};

use crate::discharge::DischargeTerms;
use crate::error::FlowError;
use crate::expansion::expansion_factor_or_unity;
use crate::flow::mass_flow;
use crate::geometry::MeterGeometry;
use crate::meter::MeterConfig;
use crate::reading::{Reading, SkipReason};
use crate::solver::{iteration_flow_factor, solve, DischargeSolution};

/// Flows and the intermediate values that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowResult {
    /// Volumetric flow at flowing conditions, ft³/h.
    pub q_actual: f64,
    /// Volumetric flow at base conditions, ft³/h.
    pub q_base: f64,
    /// lbm/h
    pub q_mass: f64,
    pub geometry: MeterGeometry,
    /// Upstream absolute static pressure used for `y`, psia.
    pub p_upstream: f64,
    pub y: f64,
    pub flow_factor: f64,
    pub discharge: DischargeSolution,
}

impl FlowResult {
    pub fn converged(&self) -> bool {
        self.discharge.converged()
    }
}

/// Outcome of one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowOutcome {
    Computed(FlowResult),
    /// No flow to compute; both flows are absent.
    Uncomputable(SkipReason),
}

impl FlowOutcome {
    pub fn q_actual(&self) -> Option<f64> {
        match self {
            Self::Computed(result) => Some(result.q_actual),
            Self::Uncomputable(_) => None,
        }
    }

    pub fn q_base(&self) -> Option<f64> {
        match self {
            Self::Computed(result) => Some(result.q_base),
            Self::Uncomputable(_) => None,
        }
    }

    pub fn result(&self) -> Option<&FlowResult> {
        match self {
            Self::Computed(result) => Some(result),
            Self::Uncomputable(_) => None,
        }
    }
}

/// Computes flow for one reading against a validated meter config.
///
/// # Errors
///
/// Returns [`FlowError::InvalidGeometry`] when the bores corrected to the
/// flowing temperature do not describe an orifice smaller than its pipe,
/// [`FlowError::InvalidPressure`] or [`FlowError::ExpansionFactor`] when the
/// static pressure cannot support the differential, and
/// [`FlowError::Diverged`] when the iteration leaves the real numbers.
pub fn compute(reading: &Reading, meter: &MeterConfig) -> Result<FlowOutcome, FlowError> {
    let reading = match reading.validate() {
        Ok(valid) => valid,
        Err(reason) => {
            debug!("skipping reading: {reason}");
            return Ok(FlowOutcome::Uncomputable(reason));
        }
    };

    let bores = meter.bores(reading.orifice_d);
    let geometry = MeterGeometry::at_temperature(&bores, reading.temperature)?;
    let terms = DischargeTerms::new(geometry.meter_d, geometry.beta());

    let p_upstream = meter.tap.normalize(reading.static_pressure, reading.differential)
        + meter.atmospheric_pressure;
    if !p_upstream.is_finite() || p_upstream <= 0.0 {
        return Err(FlowError::InvalidPressure(p_upstream));
    }
    let y = expansion_factor_or_unity(geometry.beta(), reading.differential, p_upstream, meter.k);
    if !y.is_finite() || y <= 0.0 {
        return Err(FlowError::ExpansionFactor(y));
    }

    let flow_factor = iteration_flow_factor(
        geometry.orifice_d,
        geometry.meter_d,
        reading.differential,
        geometry.e_v(),
        meter.mu,
        reading.density,
        y,
    );
    let discharge = solve(&terms, flow_factor, &meter.solver);
    if !discharge.c_d.is_finite() || discharge.c_d <= 0.0 {
        return Err(FlowError::Diverged {
            iters: discharge.iters,
        });
    }
    if !discharge.converged() {
        warn!(
            "discharge coefficient not converged after {} iterations, C_d = {}",
            discharge.iters, discharge.c_d
        );
    }

    let q_mass = mass_flow(
        discharge.c_d,
        geometry.orifice_d,
        reading.differential,
        geometry.e_v(),
        reading.density,
        y,
    );

    Ok(FlowOutcome::Computed(FlowResult {
        q_actual: q_mass / reading.density,
        q_base: q_mass / meter.rho_base,
        q_mass,
        geometry,
        p_upstream,
        y,
        flow_factor,
        discharge,
    }))
}

/// Computes each reading independently, in input order.
pub fn compute_batch<'a, I>(
    readings: I,
    meter: &'a MeterConfig,
) -> impl Iterator<Item = Result<FlowOutcome, FlowError>> + 'a
where
    I: IntoIterator<Item = &'a Reading>,
    I::IntoIter: 'a,
{
    readings.into_iter().map(move |reading| compute(reading, meter))
}
