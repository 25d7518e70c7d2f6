//! Per-reading field measurements.

use thiserror::Error;

/// Value field loggers write in place of a missing measurement.
pub const MISSING_SENTINEL: f64 = -99999.0;

/// A field measurement that may be absent.
pub type Measurement = Option<f64>;

/// Maps a raw field value to a measurement, treating the sentinel and NaN as absent.
pub fn from_raw(raw: f64) -> Measurement {
    if raw.is_nan() || raw == MISSING_SENTINEL {
        None
    } else {
        Some(raw)
    }
}

/// One set of simultaneous measurements at a meter.
///
/// Units: differential in inH2O, static pressure in psi, temperature in °F,
/// orifice bore in inches at reference temperature, density in lbm/ft³.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub differential: Measurement,
    pub static_pressure: Measurement,
    pub temperature: Measurement,
    pub orifice_d: Measurement,
    pub density: Measurement,
}

/// Why a reading produced no flow.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("differential not positive")]
    NonPositiveDifferential,

    #[error("density not positive")]
    NonPositiveDensity,
}

/// A reading whose required fields are present and physically usable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidReading {
    pub differential: f64,
    pub static_pressure: f64,
    pub temperature: f64,
    pub orifice_d: f64,
    pub density: f64,
}

impl Reading {
    /// Applies the skip policy.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when a required field is absent or the
    /// differential or density is not strictly positive.
    pub fn validate(&self) -> Result<ValidReading, SkipReason> {
        let differential = self.differential.ok_or(SkipReason::Missing("differential"))?;
        let static_pressure = self.static_pressure.ok_or(SkipReason::Missing("static pressure"))?;
        let temperature = self.temperature.ok_or(SkipReason::Missing("temperature"))?;
        let orifice_d = self.orifice_d.ok_or(SkipReason::Missing("orifice diameter"))?;
        let density = self.density.ok_or(SkipReason::Missing("density"))?;

        if differential.is_nan() || differential <= 0.0 {
            return Err(SkipReason::NonPositiveDifferential);
        }
        if density.is_nan() || density <= 0.0 {
            return Err(SkipReason::NonPositiveDensity);
        }

        Ok(ValidReading {
            differential,
            static_pressure,
            temperature,
            orifice_d,
            density,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Reading {
        Reading {
            differential: Some(50.0),
            static_pressure: Some(500.0),
            temperature: Some(68.0),
            orifice_d: Some(2.0),
            density: Some(1.6),
        }
    }

    #[test]
    fn sentinel_is_absent() {
        assert_eq!(from_raw(MISSING_SENTINEL), None);
        assert_eq!(from_raw(f64::NAN), None);
        assert_eq!(from_raw(-99998.0), Some(-99998.0));
        assert_eq!(from_raw(0.0), Some(0.0));
    }

    #[test]
    fn full_reading_is_valid() {
        let valid = full().validate().unwrap();
        assert_eq!(valid.differential, 50.0);
        assert_eq!(valid.density, 1.6);
    }

    #[test]
    fn each_missing_field_is_reported() {
        let cases = [
            (Reading { differential: None, ..full() }, "differential"),
            (Reading { static_pressure: None, ..full() }, "static pressure"),
            (Reading { temperature: None, ..full() }, "temperature"),
            (Reading { orifice_d: None, ..full() }, "orifice diameter"),
            (Reading { density: None, ..full() }, "density"),
        ];
        for (reading, field) in cases {
            assert_eq!(reading.validate(), Err(SkipReason::Missing(field)));
        }
    }

    #[test]
    fn non_positive_values_are_skipped() {
        for dp in [0.0, -1.0, f64::NAN] {
            let reading = Reading { differential: Some(dp), ..full() };
            assert_eq!(reading.validate(), Err(SkipReason::NonPositiveDifferential));
        }
        for rho in [0.0, -0.5] {
            let reading = Reading { density: Some(rho), ..full() };
            assert_eq!(reading.validate(), Err(SkipReason::NonPositiveDensity));
        }
    }

    #[test]
    fn skip_reasons_read_as_messages() {
        assert_eq!(SkipReason::Missing("temperature").to_string(), "missing temperature");
        assert_eq!(
            SkipReason::NonPositiveDifferential.to_string(),
            "differential not positive"
        );
        assert_eq!(SkipReason::NonPositiveDensity.to_string(), "density not positive");
    }
}
