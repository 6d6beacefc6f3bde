//! New daily admissions from cumulative occupancy.
use crate::disposition::Dispositions;
use crate::error::EpiError;
use crate::table::{Column, Table};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdmissionsRow {
    pub day: usize,
    pub hosp: f64,
    pub icu: f64,
    pub vent: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdmissionsTable {
    rows: Vec<AdmissionsRow>,
}

impl AdmissionsTable {
    /// Builds a table from explicit rows. Rows are re-indexed so `day` runs from 0.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = AdmissionsRow>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(day, row)| AdmissionsRow { day, ..row })
            .collect();
        AdmissionsTable { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[AdmissionsRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row with the most new hospital admissions.
    #[must_use]
    pub fn peak_hosp(&self) -> Option<&AdmissionsRow> {
        self.rows.iter().max_by(|a, b| a.hosp.total_cmp(&b.hosp))
    }

    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.push_column(
            "day",
            Column::Integer(self.rows.iter().map(|row| row.day as i64).collect()),
        );
        table.push_column("hosp", Column::Float(self.rows.iter().map(|r| r.hosp).collect()));
        table.push_column("icu", Column::Float(self.rows.iter().map(|r| r.icu).collect()));
        table.push_column("vent", Column::Float(self.rows.iter().map(|r| r.vent).collect()));
        table
    }
}

/// First-differences cumulative occupancy into new admissions per day.
///
/// For series of length `n_days + 1` the table has `n_days` rows, and row `t` holds
/// `cumulative[t + 1] - cumulative[t]`. Negative differences are kept as they are, since the
/// census window needs signed deltas.
///
/// # Errors
///
/// Returns `EpiError::ConfigurationError` if the three series have different lengths.
pub fn build_admissions(cumulative: &Dispositions) -> Result<AdmissionsTable, EpiError> {
    let n = cumulative.hosp.len();
    if cumulative.icu.len() != n || cumulative.vent.len() != n {
        return Err(EpiError::config(format!(
            "disposition series lengths differ: hosp {}, icu {}, vent {}",
            n,
            cumulative.icu.len(),
            cumulative.vent.len()
        )));
    }
    let rows = (1..n)
        .map(|t| AdmissionsRow {
            day: t - 1,
            hosp: cumulative.hosp[t] - cumulative.hosp[t - 1],
            icu: cumulative.icu[t] - cumulative.icu[t - 1],
            vent: cumulative.vent[t] - cumulative.vent[t - 1],
        })
        .collect();
    Ok(AdmissionsTable { rows })
}
