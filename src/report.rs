use tabled::{Table, Tabled};

use crate::engine::FlowOutcome;
use crate::error::FlowError;

/// Thousands of cubic feet per day from cubic feet per hour.
pub fn mcf_per_day(cf_per_hour: f64) -> f64 {
    cf_per_hour * 24.0 / 1000.0
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub status: String,
    pub beta: String,
    #[tabled(rename = "C_d")]
    pub c_d: String,
    #[tabled(rename = "Re_D")]
    pub reynolds: String,
    #[tabled(rename = "Y")]
    pub y: String,
    #[tabled(rename = "Qv (MCF/D)")]
    pub actual_mcfd: String,
    #[tabled(rename = "Qb (MCF/D)")]
    pub base_mcfd: String,
}

const ABSENT: &str = "-";

impl ReportRow {
    pub fn new(index: usize, outcome: &Result<FlowOutcome, FlowError>) -> Self {
        let blank = |status: String| Self {
            index,
            status,
            beta: ABSENT.into(),
            c_d: ABSENT.into(),
            reynolds: ABSENT.into(),
            y: ABSENT.into(),
            actual_mcfd: ABSENT.into(),
            base_mcfd: ABSENT.into(),
        };

        match outcome {
            Ok(FlowOutcome::Computed(result)) => Self {
                index,
                status: if result.converged() {
                    "ok".into()
                } else {
                    format!("unconverged ({} iters)", result.discharge.iters)
                },
                beta: format!("{:.5}", result.geometry.beta()),
                c_d: format!("{:.6}", result.discharge.c_d),
                reynolds: format!("{:.0}", result.discharge.reynolds()),
                y: format!("{:.6}", result.y),
                actual_mcfd: format!("{:.3}", mcf_per_day(result.q_actual)),
                base_mcfd: format!("{:.3}", mcf_per_day(result.q_base)),
            },
            Ok(FlowOutcome::Uncomputable(reason)) => blank(format!("skipped: {reason}")),
            Err(err) => blank(format!("error: {err}")),
        }
    }
}

/// Renders one row per outcome, numbered from zero in input order.
pub fn render<'a, I>(outcomes: I) -> String
where
    I: IntoIterator<Item = &'a Result<FlowOutcome, FlowError>>,
{
    let rows: Vec<ReportRow> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| ReportRow::new(index, outcome))
        .collect();
    Table::new(rows).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;
    use crate::reading::SkipReason;

    #[test]
    fn converts_hourly_to_mcf_per_day() {
        assert_eq!(mcf_per_day(1000.0), 24.0);
        assert_eq!(mcf_per_day(0.0), 0.0);
    }

    #[test]
    fn skipped_rows_are_blank() {
        let outcome = Ok(FlowOutcome::Uncomputable(SkipReason::NonPositiveDifferential));
        let row = ReportRow::new(3, &outcome);
        assert_eq!(row.index, 3);
        assert_eq!(row.status, "skipped: differential not positive");
        assert_eq!(row.actual_mcfd, ABSENT);
        assert_eq!(row.base_mcfd, ABSENT);
    }

    #[test]
    fn errors_are_reported_inline() {
        let outcome: Result<FlowOutcome, FlowError> =
            Err(FlowError::InvalidGeometry(GeometryError::Beta(1.2)));
        let table = render([&outcome]);
        assert!(table.contains("error: invalid geometry"));
        assert!(table.contains("Qb (MCF/D)"));
    }
}
