use crate::compartments::Compartments;
use crate::error::EpiError;
use crate::models::StepFunction;
use crate::schedule::Transmission;
use crate::table::{Column, Table};
use log::{debug, trace};

/// The states of one simulated scenario for days `0..=n_days`. Index 0 is the initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<C: Compartments> {
    states: Vec<C>,
}

impl<C: Compartments> Trajectory<C> {
    #[must_use]
    pub fn states(&self) -> &[C] {
        &self.states
    }

    /// Number of states, `n_days + 1`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The simulated horizon in days.
    #[must_use]
    pub fn n_days(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    #[must_use]
    pub fn last(&self) -> Option<&C> {
        self.states.last()
    }

    /// The time series of one compartment, by column name.
    #[must_use]
    pub fn series(&self, label: &str) -> Option<Vec<f64>> {
        let index = C::LABELS.iter().position(|l| *l == label)?;
        Some(
            self.states
                .iter()
                .map(|state| state.values()[index])
                .collect(),
        )
    }

    /// The "ever infected" population on each day.
    #[must_use]
    pub fn cumulative_cases(&self) -> Vec<f64> {
        self.states.iter().map(Compartments::cumulative_cases).collect()
    }

    /// A `day` column followed by one float column per compartment.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.push_column("day", Column::Integer((0..self.states.len() as i64).collect()));
        for (index, label) in C::LABELS.iter().enumerate() {
            let values = self.states.iter().map(|state| state.values()[index]);
            table.push_column(label, Column::Float(values.collect()));
        }
        table
    }
}

/// Runs `step` forward from `initial` for `n_days` days.
///
/// The population used for conservation is the total of `initial`. On each day `t` in
/// `0..n_days` the state advances with the transmission rate `transmission.beta_on(t)`.
///
/// # Errors
///
/// Returns `EpiError::ConfigurationError` if the step function's rates, the transmission rate or
/// the initial state are invalid, and `EpiError::NumericDegeneracy` if a step collapses the
/// population.
pub fn simulate<F: StepFunction>(
    step: &F,
    initial: F::State,
    transmission: &Transmission,
    n_days: usize,
) -> Result<Trajectory<F::State>, EpiError> {
    step.validate()?;
    transmission.validate()?;
    if initial.values().iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(EpiError::config(format!(
            "initial compartments must be non-negative, got {initial:?}"
        )));
    }
    let population = initial.total();
    if population <= 0.0 {
        return Err(EpiError::config("initial population must be positive"));
    }

    debug!(
        "Simulating {} for {} days with population {}",
        step.name(),
        n_days,
        population
    );
    let mut states = Vec::with_capacity(n_days + 1);
    states.push(initial);
    let mut current = initial;
    for day in 0..n_days {
        let beta = transmission.beta_on(day);
        trace!("{} day {} beta {}", step.name(), day, beta);
        current = step
            .advance(&current, beta, population)
            .map_err(|error| match error {
                EpiError::NumericDegeneracy(message) => {
                    EpiError::NumericDegeneracy(format!("on day {day}: {message}"))
                }
                other => other,
            })?;
        states.push(current);
    }
    Ok(Trajectory { states })
}
