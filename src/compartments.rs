//! Compartment states and the conservation discipline every step function shares.
//!
//! A compartment state is a fixed set of non-negative population counts whose sum is the total
//! population `N`. The state types are defined with [`define_compartments!`], which gives each
//! one named fields (`s`, `e`, `i`, ...) as well as the [`Compartments`] trait used by the
//! simulator and the tables.
//!
//! After a forward-Euler update a step function hands the raw next state to [`conserve`], which
//! clamps every component at zero and rescales the result so it sums to `N` again.
use crate::define_compartments;
use crate::error::EpiError;
use std::fmt::Debug;

pub trait Compartments: Copy + Debug + PartialEq {
    /// Column names, in field order.
    const LABELS: &'static [&'static str];

    /// The compartment values, in the same order as `LABELS`.
    fn values(&self) -> Vec<f64>;

    /// Applies `f` to every compartment.
    #[must_use]
    fn map<F: FnMut(f64) -> f64>(self, f: F) -> Self;

    fn total(&self) -> f64;

    /// The population that has ever been infected: the sum of every compartment downstream of
    /// infection. This is what the hospital dispositions are taken from.
    fn cumulative_cases(&self) -> f64;

    /// Looks up a compartment by its column name.
    fn get(&self, label: &str) -> Option<f64> {
        Self::LABELS
            .iter()
            .position(|l| *l == label)
            .map(|index| self.values()[index])
    }
}

/// Clamps each component of `raw` at zero, then rescales so the components sum to `population`.
///
/// # Errors
///
/// Returns `EpiError::NumericDegeneracy` if the clamped total is zero or not finite, since the
/// rescale would divide by it.
pub fn conserve<C: Compartments>(raw: C, population: f64) -> Result<C, EpiError> {
    let clamped = raw.map(|value| value.max(0.0));
    let total = clamped.total();
    if total <= 0.0 || !total.is_finite() {
        return Err(EpiError::NumericDegeneracy(format!(
            "compartment total {total} cannot be rescaled to a population of {population}"
        )));
    }
    let scale = population / total;
    Ok(clamped.map(|value| value * scale))
}

define_compartments!(
    /// The classic three compartment model.
    SirState {
        s => "susceptible",
        i => "infected",
        r => "recovered",
    },
    cases: [i, r]
);

define_compartments!(
    /// SIR with an exposed (latent) compartment between S and I.
    SeirState {
        s => "susceptible",
        e => "exposed",
        i => "infected",
        r => "recovered",
    },
    cases: [i, r]
);

define_compartments!(
    /// SEIR where a fraction of the recovery flow is fatal.
    SeirdState {
        s => "susceptible",
        e => "exposed",
        i => "infected",
        r => "recovered",
        d => "dead",
    },
    cases: [i, r, d]
);

define_compartments!(
    /// SEIRD with a hospitalized compartment `j` that still contributes to transmission.
    SeijrdState {
        s => "susceptible",
        e => "exposed",
        i => "infected",
        j => "hospitalized",
        r => "recovered",
        d => "dead",
    },
    cases: [i, j, r, d]
);

define_compartments!(
    /// SEIRD with both a hospitalized compartment `j` and a critical (ICU) compartment `c`.
    SeijcrdState {
        s => "susceptible",
        e => "exposed",
        i => "infected",
        j => "hospitalized",
        c => "critical",
        r => "recovered",
        d => "dead",
    },
    cases: [i, j, c, r, d]
);
