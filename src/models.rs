//! Single-day step functions for each model variant.
//!
//! Every variant implements [`StepFunction`]: `flows` is the forward-Euler update of the
//! underlying ODE system for one day (`next = current + inflow - outflow`, with flows that are
//! products of rates and current compartment values), and the provided `advance` passes that
//! raw update through [`conserve`] so the result is non-negative and sums to `N`.
//!
//! The transmission rate `beta` is supplied per call rather than stored, since the simulator
//! may vary it by day according to a distancing schedule. `beta` is the per-capita, per-day
//! contact rate: new infections are `beta * S * I`.
use crate::compartments::{
    conserve, Compartments, SeijcrdState, SeijrdState, SeirState, SeirdState, SirState,
};
use crate::error::EpiError;

pub trait StepFunction {
    type State: Compartments;

    /// Short name used for logging and report file names.
    fn name(&self) -> &'static str;

    /// The raw forward-Euler update, before clamping and rescaling.
    fn flows(&self, state: &Self::State, beta: f64) -> Self::State;

    /// Advances `state` by one day and restores the population to `population`.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::NumericDegeneracy` if the updated compartments sum to zero.
    fn advance(
        &self,
        state: &Self::State,
        beta: f64,
        population: f64,
    ) -> Result<Self::State, EpiError> {
        conserve(self.flows(state, beta), population)
    }

    /// Checks the variant's own rates. Called once before a run.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` naming the first invalid rate.
    fn validate(&self) -> Result<(), EpiError>;
}

fn check_rate(name: &str, value: f64) -> Result<(), EpiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EpiError::config(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), EpiError> {
    check_rate(name, value)?;
    if value > 1.0 {
        return Err(EpiError::config(format!(
            "{name} must be a fraction in [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_duration(name: &str, value: f64) -> Result<(), EpiError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EpiError::config(format!(
            "{name} must be a positive number of days, got {value}"
        )))
    }
}

/// Susceptible → infected → recovered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sir {
    /// Recovery rate (1 / days infected).
    pub gamma: f64,
}

impl StepFunction for Sir {
    type State = SirState;

    fn name(&self) -> &'static str {
        "sir"
    }

    fn flows(&self, state: &SirState, beta: f64) -> SirState {
        let infections = beta * state.s * state.i;
        let recoveries = self.gamma * state.i;
        SirState {
            s: state.s - infections,
            i: state.i + infections - recoveries,
            r: state.r + recoveries,
        }
    }

    fn validate(&self) -> Result<(), EpiError> {
        check_rate("gamma", self.gamma)
    }
}

/// Susceptible → exposed → infected → recovered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seir {
    pub gamma: f64,
    /// Incubation progression rate (1 / incubation period).
    pub alpha: f64,
}

impl StepFunction for Seir {
    type State = SeirState;

    fn name(&self) -> &'static str {
        "seir"
    }

    fn flows(&self, state: &SeirState, beta: f64) -> SeirState {
        let infections = beta * state.s * state.i;
        let onsets = self.alpha * state.e;
        let recoveries = self.gamma * state.i;
        SeirState {
            s: state.s - infections,
            e: state.e + infections - onsets,
            i: state.i + onsets - recoveries,
            r: state.r + recoveries,
        }
    }

    fn validate(&self) -> Result<(), EpiError> {
        check_rate("gamma", self.gamma)?;
        check_rate("alpha", self.alpha)
    }
}

/// SEIR where the outflow from I splits into recovered and dead by `fatal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seird {
    pub gamma: f64,
    pub alpha: f64,
    /// Fraction of resolved infections that are fatal.
    pub fatal: f64,
}

impl StepFunction for Seird {
    type State = SeirdState;

    fn name(&self) -> &'static str {
        "seird"
    }

    fn flows(&self, state: &SeirdState, beta: f64) -> SeirdState {
        let infections = beta * state.s * state.i;
        let onsets = self.alpha * state.e;
        let resolved = self.gamma * state.i;
        SeirdState {
            s: state.s - infections,
            e: state.e + infections - onsets,
            i: state.i + onsets - resolved,
            r: state.r + (1.0 - self.fatal) * resolved,
            d: state.d + self.fatal * resolved,
        }
    }

    fn validate(&self) -> Result<(), EpiError> {
        check_rate("gamma", self.gamma)?;
        check_rate("alpha", self.alpha)?;
        check_fraction("fatal", self.fatal)
    }
}

/// SEIRD with a hospitalized compartment `J`.
///
/// Infected people leave `I` at `hosp_rate + gamma`: `hosp_rate * I` are admitted to `J` and
/// `gamma * I` resolve in the community. Hospitalized people keep infecting others at a reduced
/// contact factor and are discharged at `hosp_day_rate`. Deaths split each resolving flow by its
/// own fatality fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seijrd {
    pub gamma: f64,
    pub alpha: f64,
    /// Community fatality fraction.
    pub fatal: f64,
    /// In-hospital fatality fraction.
    pub fatal_hosp: f64,
    /// Daily rate at which infected people are admitted.
    pub hosp_rate: f64,
    /// Daily discharge rate (1 / hospital length of stay).
    pub hosp_day_rate: f64,
    /// Relative infectiousness of hospitalized people.
    pub contact_factor: f64,
}

impl StepFunction for Seijrd {
    type State = SeijrdState;

    fn name(&self) -> &'static str {
        "seijrd"
    }

    fn flows(&self, state: &SeijrdState, beta: f64) -> SeijrdState {
        let infections = beta * state.s * (state.i + self.contact_factor * state.j);
        let onsets = self.alpha * state.e;
        let admissions = self.hosp_rate * state.i;
        let community_resolved = self.gamma * state.i;
        let discharges = self.hosp_day_rate * state.j;
        SeijrdState {
            s: state.s - infections,
            e: state.e + infections - onsets,
            i: state.i + onsets - admissions - community_resolved,
            j: state.j + admissions - discharges,
            r: state.r
                + (1.0 - self.fatal) * community_resolved
                + (1.0 - self.fatal_hosp) * discharges,
            d: state.d + self.fatal * community_resolved + self.fatal_hosp * discharges,
        }
    }

    fn validate(&self) -> Result<(), EpiError> {
        check_rate("gamma", self.gamma)?;
        check_rate("alpha", self.alpha)?;
        check_fraction("fatal", self.fatal)?;
        check_fraction("fatal_hosp", self.fatal_hosp)?;
        check_rate("hosp_rate", self.hosp_rate)?;
        check_rate("hosp_day_rate", self.hosp_day_rate)?;
        check_rate("contact_factor", self.contact_factor)
    }
}

/// SEIRD with a hospital ward `J` and a critical-care compartment `C`.
///
/// Resolving infections are admitted to the ward with probability `hosp_rate`. Ward patients
/// leave after `ward_days` on average, moving to critical care with probability `icu_rate` and
/// recovering otherwise. Critical patients leave after `icu_days`, dying with probability
/// `fatal_hosp`. Everyone in `I`, `J` and `C` counts toward the force of infection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seijcrd {
    pub gamma: f64,
    pub alpha: f64,
    pub fatal_hosp: f64,
    pub hosp_rate: f64,
    pub icu_rate: f64,
    /// Mean days on the ward before moving on.
    pub ward_days: f64,
    /// Mean days in critical care before recovery or death.
    pub icu_days: f64,
}

impl StepFunction for Seijcrd {
    type State = SeijcrdState;

    fn name(&self) -> &'static str {
        "seijcrd"
    }

    fn flows(&self, state: &SeijcrdState, beta: f64) -> SeijcrdState {
        let infections = beta * state.s * (state.i + state.j + state.c);
        let onsets = self.alpha * state.e;
        let resolved = self.gamma * state.i;
        let ward_exits = state.j / self.ward_days;
        let icu_exits = state.c / self.icu_days;
        SeijcrdState {
            s: state.s - infections,
            e: state.e + infections - onsets,
            i: state.i + onsets - resolved,
            j: state.j + self.hosp_rate * resolved - ward_exits,
            c: state.c + self.icu_rate * ward_exits - icu_exits,
            r: state.r
                + (1.0 - self.hosp_rate) * resolved
                + (1.0 - self.icu_rate) * ward_exits
                + (1.0 - self.fatal_hosp) * icu_exits,
            d: state.d + self.fatal_hosp * icu_exits,
        }
    }

    fn validate(&self) -> Result<(), EpiError> {
        check_rate("gamma", self.gamma)?;
        check_rate("alpha", self.alpha)?;
        check_fraction("fatal_hosp", self.fatal_hosp)?;
        check_fraction("hosp_rate", self.hosp_rate)?;
        check_fraction("icu_rate", self.icu_rate)?;
        check_duration("ward_days", self.ward_days)?;
        check_duration("icu_days", self.icu_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use crate::numeric::conserves;

    #[test]
    fn sir_step_matches_hand_computation() {
        let state = SirState {
            s: 990.0,
            i: 10.0,
            r: 0.0,
        };
        let next = Sir { gamma: 0.1 }.advance(&state, 0.0001, 1000.0).unwrap();
        // 0.99 new infections, 1 recovery; the raw update already sums to N.
        assert_almost_eq!(next.s, 989.01, 1e-9);
        assert_almost_eq!(next.i, 9.99, 1e-9);
        assert_almost_eq!(next.r, 1.0, 1e-9);
    }

    #[test]
    fn overshoot_is_clamped_and_rescaled() {
        // beta * S * I is far larger than S, so S would go negative.
        let state = SirState {
            s: 500.0,
            i: 500.0,
            r: 0.0,
        };
        let next = Sir { gamma: 0.5 }.advance(&state, 0.01, 1000.0).unwrap();
        assert_almost_eq!(next.s, 0.0, 1e-12);
        assert!(next.i > 0.0 && next.r > 0.0);
        assert!(conserves(&next.values(), 1000.0));
    }

    #[test]
    fn seird_splits_resolutions_by_fatality() {
        let state = SeirdState {
            s: 0.0,
            e: 0.0,
            i: 100.0,
            r: 0.0,
            d: 0.0,
        };
        let model = Seird {
            gamma: 0.5,
            alpha: 0.2,
            fatal: 0.1,
        };
        let next = model.advance(&state, 0.0, 100.0).unwrap();
        assert_almost_eq!(next.i, 50.0, 1e-9);
        assert_almost_eq!(next.r, 45.0, 1e-9);
        assert_almost_eq!(next.d, 5.0, 1e-9);
    }

    #[test]
    fn hospital_variants_conserve_without_rescaling() {
        let seijrd = Seijrd {
            gamma: 1.0 / 3.0,
            alpha: 1.0 / 5.8,
            fatal: 0.006,
            fatal_hosp: 0.04,
            hosp_rate: 0.025,
            hosp_day_rate: 0.2,
            contact_factor: 0.8,
        };
        let state = SeijrdState {
            s: 9_000.0,
            e: 400.0,
            i: 300.0,
            j: 100.0,
            r: 180.0,
            d: 20.0,
        };
        let raw = seijrd.flows(&state, 1e-6);
        assert!(conserves(&raw.values(), 10_000.0));

        let seijcrd = Seijcrd {
            gamma: 1.0 / 3.0,
            alpha: 1.0 / 5.8,
            fatal_hosp: 0.04,
            hosp_rate: 0.025,
            icu_rate: 0.0125,
            ward_days: 4.0,
            icu_days: 6.0,
        };
        let state = SeijcrdState {
            s: 9_000.0,
            e: 400.0,
            i: 300.0,
            j: 60.0,
            c: 40.0,
            r: 180.0,
            d: 20.0,
        };
        let raw = seijcrd.flows(&state, 1e-6);
        assert!(conserves(&raw.values(), 10_000.0));
    }

    #[test]
    fn validate_rejects_bad_rates() {
        assert!(Sir { gamma: -0.1 }.validate().is_err());
        assert!(Seird {
            gamma: 0.1,
            alpha: 0.2,
            fatal: 1.5,
        }
        .validate()
        .is_err());
        assert!(Seijcrd {
            gamma: 0.1,
            alpha: 0.2,
            fatal_hosp: 0.04,
            hosp_rate: 0.025,
            icu_rate: 0.0125,
            ward_days: 0.0,
            icu_days: 6.0,
        }
        .validate()
        .is_err());
        assert!(Seir {
            gamma: 0.1,
            alpha: f64::NAN,
        }
        .validate()
        .is_err());
    }
}
