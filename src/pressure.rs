use serde::Deserialize;

use crate::constants::N3;

/// Which side of the plate the static pressure sensor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapLocation {
    #[default]
    Upstream,
    Downstream,
}

/// Upstream static pressure (psi) from a downstream reading and dP (inH2O).
pub fn upstream_pressure(p_downstream: f64, differential: f64) -> f64 {
    p_downstream + differential / N3
}

impl TapLocation {
    /// Static pressure referred to the upstream tap.
    pub fn normalize(self, p_static: f64, differential: f64) -> f64 {
        match self {
            TapLocation::Upstream => p_static,
            TapLocation::Downstream => upstream_pressure(p_static, differential),
        }
    }
}
