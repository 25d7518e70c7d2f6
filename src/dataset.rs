//! Logger exports in CSV form.
//!
//! Readings are taken from the named columns of each row; any other columns
//! are carried through untouched. Results are written back as the input rows
//! with actual and base flow in MCF/D appended, empty where a row produced
//! no flow.

use std::io;

use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use log::debug;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::engine::FlowOutcome;
use crate::error::FlowError;
use crate::reading::{from_raw, Measurement, Reading};
use crate::report::mcf_per_day;

pub const DIFFERENTIAL_COLUMN: &str = "Gas Diff";
pub const STATIC_PRESSURE_COLUMN: &str = "Static Pressure";
pub const TEMPERATURE_COLUMN: &str = "Modeled Gas Temp (degF)";
pub const ORIFICE_COLUMN: &str = "Plate";
pub const DENSITY_COLUMN: &str = "Density-DryGas";

pub const ACTUAL_FLOW_COLUMN: &str = "q_v_MCFD";
pub const BASE_FLOW_COLUMN: &str = "q_b_MCFD";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid row {row}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("{outcomes} outcomes for {rows} rows")]
    Length { rows: usize, outcomes: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct LoggedReading {
    #[serde(rename = "Gas Diff", deserialize_with = "measurement")]
    differential: Measurement,
    #[serde(rename = "Static Pressure", deserialize_with = "measurement")]
    static_pressure: Measurement,
    #[serde(rename = "Modeled Gas Temp (degF)", deserialize_with = "measurement")]
    temperature: Measurement,
    #[serde(rename = "Plate", deserialize_with = "measurement")]
    orifice_d: Measurement,
    #[serde(rename = "Density-DryGas", deserialize_with = "measurement")]
    density: Measurement,
}

/// Empty cells, the sentinel and NaN are all absent.
fn measurement<'de, D>(deserializer: D) -> Result<Measurement, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.and_then(from_raw))
}

impl From<LoggedReading> for Reading {
    fn from(logged: LoggedReading) -> Self {
        Self {
            differential: logged.differential,
            static_pressure: logged.static_pressure,
            temperature: logged.temperature,
            orifice_d: logged.orifice_d,
            density: logged.density,
        }
    }
}

/// An exported table and the reading parsed from each of its rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    readings: Vec<Reading>,
}

impl Dataset {
    /// Parses a CSV export with a header row.
    ///
    /// # Errors
    ///
    /// Fails on malformed CSV, on a missing reading column, and on a
    /// reading cell that is neither empty nor a number. Rows are numbered
    /// from zero, excluding the header.
    pub fn read<R: io::Read>(source: R) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        let mut readings = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|source| DatasetError::Row { row, source })?;
            let logged: LoggedReading = record
                .deserialize(Some(&headers))
                .map_err(|source| DatasetError::Row { row, source })?;
            readings.push(Reading::from(logged));
            rows.push(record);
        }
        debug!("parsed {} rows with {} columns", rows.len(), headers.len());

        Ok(Self {
            headers,
            rows,
            readings,
        })
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes every input row followed by its flows in MCF/D.
    ///
    /// # Errors
    ///
    /// Fails if `outcomes` does not hold one entry per row, or on a write
    /// error.
    pub fn write_results<W: io::Write>(
        &self,
        outcomes: &[Result<FlowOutcome, FlowError>],
        sink: W,
    ) -> Result<(), DatasetError> {
        if outcomes.len() != self.rows.len() {
            return Err(DatasetError::Length {
                rows: self.rows.len(),
                outcomes: outcomes.len(),
            });
        }

        let mut writer = Writer::from_writer(sink);
        writer.write_record(
            self.headers
                .iter()
                .chain([ACTUAL_FLOW_COLUMN, BASE_FLOW_COLUMN]),
        )?;

        for (row, outcome) in self.rows.iter().zip(outcomes) {
            let flows = outcome.as_ref().ok();
            let actual = cell(flows.and_then(FlowOutcome::q_actual));
            let base = cell(flows.and_then(FlowOutcome::q_base));
            writer.write_record(row.iter().chain([actual.as_str(), base.as_str()]))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn cell(cf_per_hour: Option<f64>) -> String {
    cf_per_hour
        .map(|q| mcf_per_day(q).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::engine::compute_batch;
    use crate::meter::MeterConfig;

    const EXPORT: &str = "\
Meter ID,Gas Diff,Static Pressure,Modeled Gas Temp (degF),Plate,Density-DryGas
A-1,50,500,68,2.0,1.6
A-2,-99999,500,68,2.0,1.6
A-3,50,500,,2.0,1.6
A-4,50,500,68,4.0,1.6
";

    #[test]
    fn maps_logger_columns() {
        let dataset = Dataset::read(EXPORT.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 4);

        let first = dataset.readings()[0];
        assert_eq!(first.differential, Some(50.0));
        assert_eq!(first.static_pressure, Some(500.0));
        assert_eq!(first.temperature, Some(68.0));
        assert_eq!(first.orifice_d, Some(2.0));
        assert_eq!(first.density, Some(1.6));

        assert_eq!(dataset.readings()[1].differential, None);
        assert_eq!(dataset.readings()[2].temperature, None);
    }

    #[test]
    fn results_round_trip_through_csv() {
        let meter = MeterConfig::default();
        let dataset = Dataset::read(EXPORT.as_bytes()).unwrap();
        let outcomes: Vec<_> = compute_batch(dataset.readings(), &meter).collect();

        let mut out = Vec::new();
        dataset.write_results(&outcomes, &mut out).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            [
                "Meter ID",
                DIFFERENTIAL_COLUMN,
                STATIC_PRESSURE_COLUMN,
                TEMPERATURE_COLUMN,
                ORIFICE_COLUMN,
                DENSITY_COLUMN,
                ACTUAL_FLOW_COLUMN,
                BASE_FLOW_COLUMN,
            ]
        );

        let rows: Vec<StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[1][0], "A-2");
        assert_eq!(&rows[1][1], "-99999");

        let q_v: f64 = rows[0][6].parse().unwrap();
        let q_b: f64 = rows[0][7].parse().unwrap();
        assert_eq!(q_v, mcf_per_day(outcomes[0].as_ref().unwrap().q_actual().unwrap()));
        assert_relative_eq!(q_v, 120.82831, max_relative = 1e-6);
        assert_relative_eq!(q_b, 3864.1877, max_relative = 1e-6);

        // sentinel, gap and bad geometry all leave the flow cells empty
        for row in &rows[1..] {
            assert_eq!(&row[6], "");
            assert_eq!(&row[7], "");
        }

        let reread = Dataset::read(out.as_slice()).unwrap();
        assert_eq!(reread.readings(), dataset.readings());
    }

    #[test]
    fn missing_reading_column_is_rejected() {
        let text = "Gas Diff,Static Pressure,Plate,Density-DryGas\n50,500,2.0,1.6\n";
        let err = Dataset::read(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Row { row: 0, .. }), "{err}");
    }

    #[test]
    fn non_numeric_cell_names_its_row() {
        let text = format!(
            "{DIFFERENTIAL_COLUMN},{STATIC_PRESSURE_COLUMN},{TEMPERATURE_COLUMN},\
             {ORIFICE_COLUMN},{DENSITY_COLUMN}\n\
             50,500,68,2.0,1.6\n\
             50,n/a,68,2.0,1.6\n"
        );
        let err = Dataset::read(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Row { row: 1, .. }), "{err}");
    }

    #[test]
    fn outcome_count_must_match_rows() {
        let dataset = Dataset::read(EXPORT.as_bytes()).unwrap();
        let err = dataset.write_results(&[], Vec::new()).unwrap_err();
        assert!(matches!(err, DatasetError::Length { rows: 4, outcomes: 0 }));
    }
}
