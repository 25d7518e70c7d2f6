use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::T_R;
use crate::geometry::ReferenceBores;
use crate::pressure::TapLocation;
use crate::solver::SolverConfig;

/// Constants shared by every reading at one meter run.
///
/// Missing keys in a config file take the defaults of a 3 in (3.826 in bore)
/// stainless plate in a carbon steel run on pipeline gas.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Meter tube bore at `t_ref`, inches.
    pub pipe_d: f64,
    /// Orifice plate linear expansion coefficient, 1/°F.
    pub alpha_orifice: f64,
    /// Meter tube linear expansion coefficient, 1/°F.
    pub alpha_pipe: f64,
    /// Temperature at which the bores were measured, °F.
    pub t_ref: f64,
    /// Isentropic exponent. Zero or negative disables the expansion correction.
    pub k: f64,
    /// Dynamic viscosity, cP.
    pub mu: f64,
    /// Density at base conditions, lbm/ft³.
    pub rho_base: f64,
    pub tap: TapLocation,
    /// Added to static readings to make them absolute, psi.
    pub atmospheric_pressure: f64,
    #[serde(skip)]
    pub solver: SolverConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be finite")]
    NotFinite(&'static str),

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("failed to read meter config")]
    Io(#[from] std::io::Error),

    #[error("failed to parse meter config")]
    Parse(#[from] toml::de::Error),
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            pipe_d: 3.826,
            alpha_orifice: 9.25e-6,
            alpha_pipe: 6.2e-6,
            t_ref: T_R,
            k: 1.3198,
            mu: 0.012,
            rho_base: 0.05003,
            tap: TapLocation::Upstream,
            atmospheric_pressure: 0.0,
            solver: SolverConfig::default(),
        }
    }
}

impl MeterConfig {
    /// Loads and validates a TOML meter config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if any value is non-finite, or if the pipe bore,
    /// viscosity or base density is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("pipe_d", self.pipe_d),
            ("alpha_orifice", self.alpha_orifice),
            ("alpha_pipe", self.alpha_pipe),
            ("t_ref", self.t_ref),
            ("k", self.k),
            ("mu", self.mu),
            ("rho_base", self.rho_base),
            ("atmospheric_pressure", self.atmospheric_pressure),
        ];
        if let Some(&(name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NotFinite(name));
        }

        let positive = [
            ("pipe_d", self.pipe_d),
            ("mu", self.mu),
            ("rho_base", self.rho_base),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive(name));
            }
        }
        Ok(())
    }

    /// Plate and tube bores at reference temperature for one plate size.
    pub fn bores(&self, orifice_d: f64) -> ReferenceBores {
        ReferenceBores {
            orifice_d,
            pipe_d: self.pipe_d,
            alpha_orifice: self.alpha_orifice,
            alpha_pipe: self.alpha_pipe,
            t_ref: self.t_ref,
        }
    }
}
