//! Daily occupied beds from daily admissions.
//!
//! A patient admitted on day `a` occupies a resource for `los` days, so the census on day `t` is
//! the sum of admissions over the last `los` days, `cumsum[t] - cumsum[t - los]`, rounded up to
//! whole beds. Personal protective equipment demand is a linear projection of the ward and ICU
//! census.
//!
//! The last [`CENSUS_TAIL_DAYS`] days of the horizon are dropped from the table.
use crate::admissions::{AdmissionsRow, AdmissionsTable};
use crate::error::EpiError;
use crate::numeric::almost_eq;
use crate::table::{Column, Table};
use serde::{Deserialize, Serialize};

/// Number of trailing days removed from every census table.
pub const CENSUS_TAIL_DAYS: usize = 10;

/// Lengths of stay, in whole days, per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthsOfStay {
    pub hosp: usize,
    pub icu: usize,
    pub vent: usize,
}

impl LengthsOfStay {
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if any length of stay is zero.
    pub fn validate(&self) -> Result<(), EpiError> {
        for (name, los) in [("hosp", self.hosp), ("icu", self.icu), ("vent", self.vent)] {
            if los == 0 {
                return Err(EpiError::config(format!(
                    "{name} length of stay must be at least one day"
                )));
            }
        }
        Ok(())
    }
}

impl Default for LengthsOfStay {
    fn default() -> Self {
        LengthsOfStay {
            hosp: 5,
            icu: 9,
            vent: 6,
        }
    }
}

/// Sets of protective equipment used per occupied bed per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PpeRates {
    pub mild_lower: f64,
    pub mild_upper: f64,
    pub severe_lower: f64,
    pub severe_upper: f64,
}

impl Default for PpeRates {
    fn default() -> Self {
        PpeRates {
            mild_lower: 14.0,
            mild_upper: 15.0,
            severe_lower: 15.0,
            severe_upper: 24.0,
        }
    }
}

impl PpeRates {
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if a rate is negative or a lower bound exceeds its
    /// upper bound.
    pub fn validate(&self) -> Result<(), EpiError> {
        let rates = [
            self.mild_lower,
            self.mild_upper,
            self.severe_lower,
            self.severe_upper,
        ];
        if rates.iter().any(|rate| !rate.is_finite() || *rate < 0.0) {
            return Err(EpiError::config("PPE rates must be non-negative numbers"));
        }
        if self.mild_lower > self.mild_upper || self.severe_lower > self.severe_upper {
            return Err(EpiError::config(
                "PPE lower bounds must not exceed their upper bounds",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CensusRow {
    pub day: usize,
    pub hosp: f64,
    pub icu: f64,
    pub vent: f64,
    pub ppe_mild_lower: f64,
    pub ppe_mild_upper: f64,
    pub ppe_severe_lower: f64,
    pub ppe_severe_upper: f64,
    pub ppe_mild_mean: f64,
    pub ppe_severe_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CensusTable {
    rows: Vec<CensusRow>,
}

impl CensusTable {
    #[must_use]
    pub fn rows(&self) -> &[CensusRow] {
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

    /// The row with the highest ward census.
    #[must_use]
    pub fn peak_hosp(&self) -> Option<&CensusRow> {
        self.rows.iter().max_by(|a, b| a.hosp.total_cmp(&b.hosp))
    }

    #[must_use]
    pub fn to_table(&self) -> Table {
        let float = |f: fn(&CensusRow) -> f64| Column::Float(self.rows.iter().map(f).collect());
        let mut table = Table::new();
        table.push_column(
            "day",
            Column::Integer(self.rows.iter().map(|row| row.day as i64).collect()),
        );
        table.push_column("hosp", float(|r| r.hosp));
        table.push_column("icu", float(|r| r.icu));
        table.push_column("vent", float(|r| r.vent));
        table.push_column("ppe_mild_lower", float(|r| r.ppe_mild_lower));
        table.push_column("ppe_mild_upper", float(|r| r.ppe_mild_upper));
        table.push_column("ppe_severe_lower", float(|r| r.ppe_severe_lower));
        table.push_column("ppe_severe_upper", float(|r| r.ppe_severe_upper));
        table.push_column("ppe_mild_mean", float(|r| r.ppe_mild_mean));
        table.push_column("ppe_severe_mean", float(|r| r.ppe_severe_mean));
        table
    }
}

/// Rounding error allowed in a window sum, relative to the prefix sum it was taken from.
const WINDOW_TOLERANCE: f64 = 1e-12;

/// Rounds a window sum up to whole beds. Sums within rounding error of a whole number are
/// taken as that number, so prefix-sum drift never adds a bed. `scale` is the magnitude of the
/// prefix sums the window was taken from.
fn whole_beds(occupancy: f64, scale: f64) -> f64 {
    let nearest = occupancy.round();
    if almost_eq(occupancy, nearest, WINDOW_TOLERANCE * scale.abs().max(1.0)) {
        nearest
    } else {
        occupancy.ceil()
    }
}

/// Sums the last `los` values of `admits` for every day, rounding up to whole beds.
fn windowed_occupancy(admits: &[f64], los: usize) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(admits.len());
    let mut running = 0.0_f64;
    for value in admits {
        running += *value;
        cumulative.push(running);
    }
    (0..cumulative.len())
        .map(|t| {
            let discharged = if t >= los { cumulative[t - los] } else { 0.0 };
            whole_beds(cumulative[t] - discharged, cumulative[t])
        })
        .collect()
}

/// Turns daily admissions into a daily census per resource plus PPE demand.
///
/// The table covers days `0..n_days - CENSUS_TAIL_DAYS`, where `n_days` is the number of
/// admission rows.
///
/// # Errors
///
/// Returns `EpiError::ConfigurationError` if a length of stay is zero, the PPE rates are invalid,
/// or the admissions span `CENSUS_TAIL_DAYS` days or fewer.
pub fn build_census(
    admissions: &AdmissionsTable,
    lengths_of_stay: &LengthsOfStay,
    ppe: &PpeRates,
) -> Result<CensusTable, EpiError> {
    lengths_of_stay.validate()?;
    ppe.validate()?;
    let n_days = admissions.len();
    if n_days <= CENSUS_TAIL_DAYS {
        return Err(EpiError::config(format!(
            "a census needs more than {CENSUS_TAIL_DAYS} days of admissions, got {n_days}"
        )));
    }

    let column = |f: fn(&AdmissionsRow) -> f64| -> Vec<f64> {
        admissions.rows().iter().map(f).collect()
    };
    let hosp = windowed_occupancy(&column(|r| r.hosp), lengths_of_stay.hosp);
    let icu = windowed_occupancy(&column(|r| r.icu), lengths_of_stay.icu);
    let vent = windowed_occupancy(&column(|r| r.vent), lengths_of_stay.vent);

    let rows = (0..n_days - CENSUS_TAIL_DAYS)
        .map(|day| {
            let ppe_mild_lower = hosp[day] * ppe.mild_lower;
            let ppe_mild_upper = hosp[day] * ppe.mild_upper;
            let ppe_severe_lower = icu[day] * ppe.severe_lower;
            let ppe_severe_upper = icu[day] * ppe.severe_upper;
            CensusRow {
                day,
                hosp: hosp[day],
                icu: icu[day],
                vent: vent[day],
                ppe_mild_lower,
                ppe_mild_upper,
                ppe_severe_lower,
                ppe_severe_upper,
                ppe_mild_mean: (ppe_mild_lower + ppe_mild_upper) / 2.0,
                ppe_severe_mean: (ppe_severe_lower + ppe_severe_upper) / 2.0,
            }
        })
        .collect();
    Ok(CensusTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    fn constant_admissions(value: f64, n_days: usize) -> AdmissionsTable {
        AdmissionsTable::from_rows((0..n_days).map(|day| AdmissionsRow {
            day,
            hosp: value,
            icu: value,
            vent: value,
        }))
    }

    #[test]
    fn truncates_the_final_ten_days() {
        let census = build_census(
            &constant_admissions(1.0, 180),
            &LengthsOfStay::default(),
            &PpeRates::default(),
        )
        .unwrap();
        assert_eq!(census.len(), 170);
        assert_eq!(census.rows()[169].day, 169);

        let census = build_census(
            &constant_admissions(1.0, 11),
            &LengthsOfStay::default(),
            &PpeRates::default(),
        )
        .unwrap();
        assert_eq!(census.len(), 1);
    }

    #[test]
    fn short_horizons_are_rejected() {
        for n_days in [0, 5, 10] {
            let result = build_census(
                &constant_admissions(1.0, n_days),
                &LengthsOfStay::default(),
                &PpeRates::default(),
            );
            assert!(
                matches!(result, Err(EpiError::ConfigurationError(_))),
                "n_days = {n_days}"
            );
        }
    }

    #[test]
    fn constant_admissions_fill_los_beds() {
        let los = LengthsOfStay {
            hosp: 4,
            icu: 7,
            vent: 1,
        };
        let census = build_census(&constant_admissions(2.5, 60), &los, &PpeRates::default())
            .unwrap();
        for row in census.rows() {
            if row.day >= los.hosp {
                assert_almost_eq!(row.hosp, 10.0, 1e-12, "hosp on day {}", row.day);
            }
            if row.day >= los.icu {
                assert_almost_eq!(row.icu, 17.5_f64.ceil(), 1e-12, "icu on day {}", row.day);
            }
            assert_almost_eq!(row.vent, 3.0, 1e-12, "vent on day {}", row.day);
        }
        // While the ward fills, day t holds t + 1 days of admissions.
        assert_almost_eq!(census.rows()[0].hosp, 3.0, 1e-12);
        assert_almost_eq!(census.rows()[1].hosp, 5.0, 1e-12);
    }

    #[test]
    fn inexact_rates_fill_exactly_ceil_a_times_l_beds() {
        // (daily admissions, length of stay, beds once the ward is full)
        let cases = [
            (0.1, 10, 1.0),
            (0.2, 5, 1.0),
            (0.3, 10, 3.0),
            (0.7, 10, 7.0),
            (1.1, 10, 11.0),
            (0.05, 20, 1.0),
            (0.3, 7, 3.0),
        ];
        for (rate, los, beds) in cases {
            let census = build_census(
                &constant_admissions(rate, 200),
                &LengthsOfStay {
                    hosp: los,
                    icu: los,
                    vent: los,
                },
                &PpeRates::default(),
            )
            .unwrap();
            for row in census.rows().iter().filter(|row| row.day >= los) {
                assert_eq!(row.hosp, beds, "A = {rate}, L = {los}, day {}", row.day);
                assert_eq!(row.icu, beds, "A = {rate}, L = {los}, day {}", row.day);
                assert_eq!(row.vent, beds, "A = {rate}, L = {los}, day {}", row.day);
            }
        }
    }

    #[test]
    fn near_whole_window_sums_snap() {
        assert_eq!(whole_beds(1.0000000000000002, 14.0), 1.0);
        assert_eq!(whole_beds(4.4e-16, 4.0), 0.0);
        assert_eq!(whole_beds(1.000001, 14.0), 2.0);
        assert_eq!(whole_beds(0.1, 4.0), 1.0);
    }

    #[test]
    fn drift_never_adds_a_bed_when_admissions_stop() {
        let mut rows: Vec<AdmissionsRow> = (0..40)
            .map(|day| AdmissionsRow {
                day,
                hosp: 0.1,
                icu: 0.1,
                vent: 0.1,
            })
            .collect();
        rows.extend((40..80).map(|day| AdmissionsRow {
            day,
            hosp: 0.0,
            icu: 0.0,
            vent: 0.0,
        }));
        let census = build_census(
            &AdmissionsTable::from_rows(rows),
            &LengthsOfStay::default(),
            &PpeRates::default(),
        )
        .unwrap();
        for row in census.rows().iter().filter(|row| row.day >= 50) {
            assert_eq!(row.hosp, 0.0, "day {}", row.day);
            assert_eq!(row.ppe_mild_mean, 0.0, "day {}", row.day);
        }
    }

    #[test]
    fn occupancy_is_rounded_up() {
        let census = build_census(
            &constant_admissions(0.1, 20),
            &LengthsOfStay {
                hosp: 1,
                icu: 1,
                vent: 1,
            },
            &PpeRates::default(),
        )
        .unwrap();
        assert!(census.rows().iter().all(|row| row.hosp == 1.0));
    }

    #[test]
    fn ppe_is_linear_in_census() {
        let census = build_census(
            &constant_admissions(2.0, 30),
            &LengthsOfStay {
                hosp: 5,
                icu: 5,
                vent: 5,
            },
            &PpeRates::default(),
        )
        .unwrap();
        let row = census.rows()[10];
        assert_almost_eq!(row.hosp, 10.0, 1e-12);
        assert_almost_eq!(row.ppe_mild_lower, 140.0, 1e-9);
        assert_almost_eq!(row.ppe_mild_upper, 150.0, 1e-9);
        assert_almost_eq!(row.ppe_mild_mean, 145.0, 1e-9);
        assert_almost_eq!(row.ppe_severe_lower, 150.0, 1e-9);
        assert_almost_eq!(row.ppe_severe_upper, 240.0, 1e-9);
        assert_almost_eq!(row.ppe_severe_mean, 195.0, 1e-9);
    }

    #[test]
    fn zero_length_of_stay_is_rejected() {
        let result = build_census(
            &constant_admissions(1.0, 30),
            &LengthsOfStay {
                hosp: 0,
                icu: 9,
                vent: 6,
            },
            &PpeRates::default(),
        );
        assert!(matches!(result, Err(EpiError::ConfigurationError(_))));
    }

    #[test]
    fn table_view_uses_stable_column_names() {
        let census = build_census(
            &constant_admissions(1.0, 20),
            &LengthsOfStay::default(),
            &PpeRates::default(),
        )
        .unwrap();
        let table = census.to_table();
        assert_eq!(table.column_names()[..4], ["day", "hosp", "icu", "vent"]);
        assert_eq!(table.column_names().len(), 10);
        assert_eq!(table.row_count(), 10);
    }
}
