use thiserror::Error;

/// Errors raised by meter geometry that cannot carry flow.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("{name} must be finite and positive, got {value}")]
    Diameter { name: &'static str, value: f64 },

    #[error("diameter ratio {0} is outside (0, 1): orifice must be smaller than pipe")]
    Beta(f64),
}

/// Corrects a length measured at `t_ref` to the flowing temperature `t_flow`.
pub fn corrected_length(alpha: f64, l_ref: f64, t_ref: f64, t_flow: f64) -> f64 {
    l_ref * (1.0 + alpha * (t_flow - t_ref))
}

/// Diameter ratio `d / D`, rejected unless strictly inside (0, 1).
pub fn diameter_ratio(orifice_d: f64, pipe_d: f64) -> Result<f64, GeometryError> {
    check_diameter("orifice diameter", orifice_d)?;
    check_diameter("pipe diameter", pipe_d)?;

    let beta = orifice_d / pipe_d;
    if beta <= 0.0 || beta >= 1.0 {
        return Err(GeometryError::Beta(beta));
    }
    Ok(beta)
}

/// Velocity of approach factor `1 / sqrt(1 - beta^4)`.
pub fn velocity_factor(beta: f64) -> f64 {
    1.0 / (1.0 - beta.powi(4)).sqrt()
}

fn check_diameter(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GeometryError::Diameter { name, value });
    }
    Ok(())
}

/// Plate and tube bores at their reference temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceBores {
    pub orifice_d: f64,
    pub pipe_d: f64,
    pub alpha_orifice: f64,
    pub alpha_pipe: f64,
    pub t_ref: f64,
}

/// Meter geometry corrected to flowing temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterGeometry {
    pub orifice_d: f64,
    pub meter_d: f64,
    beta: f64,
    e_v: f64,
}

impl MeterGeometry {
    /// Corrects both bores to `t_flow` and derives beta and `E_v`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] when a corrected bore is non-positive or the
    /// corrected orifice is not smaller than the corrected pipe.
    pub fn at_temperature(bores: &ReferenceBores, t_flow: f64) -> Result<Self, GeometryError> {
        let orifice_d = corrected_length(bores.alpha_orifice, bores.orifice_d, bores.t_ref, t_flow);
        let meter_d = corrected_length(bores.alpha_pipe, bores.pipe_d, bores.t_ref, t_flow);
        Self::new(orifice_d, meter_d)
    }

    /// Builds geometry from bores already at flowing temperature.
    pub fn new(orifice_d: f64, meter_d: f64) -> Result<Self, GeometryError> {
        let beta = diameter_ratio(orifice_d, meter_d)?;

        Ok(Self {
            orifice_d,
            meter_d,
            beta,
            e_v: velocity_factor(beta),
        })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn e_v(&self) -> f64 {
        self.e_v
    }
}
