//! Piecewise time-varying transmission ("phase-adjusted decay").
//!
//! A [`DistancingSchedule`] is an ordered list of phases, each with an inclusive last day and a
//! relative reduction in contact, followed by the reduction that applies after the last phase
//! ends. The transmission rate on a day is `beta * (1 - reduction)` for the phase containing that
//! day. Boundaries must be strictly increasing.
use crate::error::EpiError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistancingPhase {
    /// The last day (inclusive, counted from the start date) this phase applies to. Signed so
    /// that a negative day in a parameter file is reported by `validate`.
    pub until_day: i64,
    /// Relative reduction in contact, in [0, 1].
    pub reduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistancingSchedule {
    phases: Vec<DistancingPhase>,
    /// Reduction applied after the last phase.
    after: f64,
}

fn day_offset(day: usize) -> Result<i64, EpiError> {
    i64::try_from(day)
        .map_err(|_| EpiError::config(format!("distancing boundary day {day} is out of range")))
}

fn check_reduction(reduction: f64) -> Result<(), EpiError> {
    if (0.0..=1.0).contains(&reduction) {
        Ok(())
    } else {
        Err(EpiError::config(format!(
            "distancing reduction must be in [0, 1], got {reduction}"
        )))
    }
}

impl DistancingSchedule {
    /// Builds a schedule from its phases and the reduction that follows them.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the phase boundaries are not strictly increasing
    /// or any reduction lies outside [0, 1].
    pub fn new(phases: Vec<DistancingPhase>, after: f64) -> Result<Self, EpiError> {
        let schedule = DistancingSchedule { phases, after };
        schedule.validate()?;
        Ok(schedule)
    }

    /// The four-phase schedule: `reductions[0]` through `first_change`, `reductions[1]` through
    /// `second_change`, `reductions[2]` through `end`, and `reductions[3]` afterwards.
    ///
    /// # Errors
    ///
    /// See [`DistancingSchedule::new`].
    pub fn four_phase(
        first_change: usize,
        second_change: usize,
        end: usize,
        reductions: [f64; 4],
    ) -> Result<Self, EpiError> {
        DistancingSchedule::new(
            vec![
                DistancingPhase {
                    until_day: day_offset(first_change)?,
                    reduction: reductions[0],
                },
                DistancingPhase {
                    until_day: day_offset(second_change)?,
                    reduction: reductions[1],
                },
                DistancingPhase {
                    until_day: day_offset(end)?,
                    reduction: reductions[2],
                },
            ],
            reductions[3],
        )
    }

    /// Converts calendar boundary dates into day offsets from `start`.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if a boundary falls before `start`, in addition to
    /// the checks in [`DistancingSchedule::new`].
    pub fn from_dates(
        start: NaiveDate,
        boundaries: &[(NaiveDate, f64)],
        after: f64,
    ) -> Result<Self, EpiError> {
        let phases = boundaries
            .iter()
            .map(|&(date, reduction)| {
                let until_day = (date - start).num_days();
                if until_day < 0 {
                    return Err(EpiError::config(format!(
                        "distancing boundary {date} falls before the start date {start}"
                    )));
                }
                Ok(DistancingPhase {
                    until_day,
                    reduction,
                })
            })
            .collect::<Result<Vec<_>, EpiError>>()?;
        DistancingSchedule::new(phases, after)
    }

    /// A schedule with no reduction on any day.
    #[must_use]
    pub fn none() -> Self {
        DistancingSchedule {
            phases: Vec::new(),
            after: 0.0,
        }
    }

    /// Checks ordering and ranges. Schedules that arrive through deserialization bypass `new`,
    /// so the pipeline calls this again before a run.
    ///
    /// # Errors
    ///
    /// See [`DistancingSchedule::new`].
    pub fn validate(&self) -> Result<(), EpiError> {
        if let Some(phase) = self.phases.iter().find(|phase| phase.until_day < 0) {
            return Err(EpiError::config(format!(
                "distancing boundary day {} is before the start date",
                phase.until_day
            )));
        }
        for pair in self.phases.windows(2) {
            if pair[1].until_day <= pair[0].until_day {
                return Err(EpiError::config(format!(
                    "distancing boundaries must be strictly increasing, got day {} after day {}",
                    pair[1].until_day, pair[0].until_day
                )));
            }
        }
        for phase in &self.phases {
            check_reduction(phase.reduction)?;
        }
        check_reduction(self.after)
    }

    #[must_use]
    pub fn phases(&self) -> &[DistancingPhase] {
        &self.phases
    }

    /// Every reduction in the order it takes effect, ending with the post-schedule reduction.
    #[must_use]
    pub fn reductions(&self) -> Vec<f64> {
        self.phases
            .iter()
            .map(|phase| phase.reduction)
            .chain(std::iter::once(self.after))
            .collect()
    }

    /// The reduction in effect on `day`.
    #[must_use]
    pub fn reduction_on(&self, day: usize) -> f64 {
        self.phases
            .iter()
            .find(|phase| i64::try_from(day).is_ok_and(|day| day <= phase.until_day))
            .map_or(self.after, |phase| phase.reduction)
    }

    /// The factor `1 - reduction` that multiplies the base transmission rate on `day`.
    #[must_use]
    pub fn multiplier(&self, day: usize) -> f64 {
        1.0 - self.reduction_on(day)
    }
}

impl Default for DistancingSchedule {
    fn default() -> Self {
        DistancingSchedule::none()
    }
}

/// How the transmission rate evolves over a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Transmission {
    Constant(f64),
    Phased {
        base: f64,
        schedule: DistancingSchedule,
    },
}

impl Transmission {
    /// The transmission rate used to step from `day` to `day + 1`.
    #[must_use]
    pub fn beta_on(&self, day: usize) -> f64 {
        match self {
            Transmission::Constant(beta) => *beta,
            Transmission::Phased { base, schedule } => base * schedule.multiplier(day),
        }
    }

    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` for a negative or non-finite rate or an invalid
    /// schedule.
    pub fn validate(&self) -> Result<(), EpiError> {
        let base = match self {
            Transmission::Constant(beta) => *beta,
            Transmission::Phased { base, schedule } => {
                schedule.validate()?;
                *base
            }
        };
        if base.is_finite() && base >= 0.0 {
            Ok(())
        } else {
            Err(EpiError::config(format!(
                "transmission rate must be a non-negative number, got {base}"
            )))
        }
    }
}
