//! The parameter bundle: every input a projection run needs, as one immutable value.
//!
//! Nothing in the core reads ambient state; each pipeline stage receives what it needs from a
//! `ParameterBundle`. Bundles are built in code with `ParameterBundleBuilder` or loaded from a
//! JSON file with [`load_parameters`]; any field missing from the file takes its default.
//!
//! Defaults describe an early-2020 projection for a mid-sized region: a five-day doubling time,
//! 2.5 % of infections hospitalized, and stepped distancing of 0 %, 15 %, 40 % and 20 %.
use crate::census::{LengthsOfStay, PpeRates, CENSUS_TAIL_DAYS};
use crate::compartments::{SeijcrdState, SeijrdState, SeirState, SeirdState, SirState};
use crate::disposition::ResourceRates;
use crate::error::EpiError;
use crate::models::{Seijcrd, Seijrd, Seir, Seird, Sir};
use crate::schedule::{DistancingSchedule, Transmission};
use crate::summary;
use chrono::NaiveDate;
use derive_builder::Builder;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

fn default_start_date() -> NaiveDate {
    date(2020, 3, 1)
}

fn default_distancing() -> DistancingSchedule {
    DistancingSchedule::four_phase(17, 24, 75, [0.0, 0.15, 0.4, 0.2])
        .expect("default distancing schedule is valid")
}

fn default_resource_rates() -> ResourceRates {
    ResourceRates {
        hosp: 0.025,
        icu: 0.0125,
        vent: 0.01,
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("preset dates are valid")
}

/// Regions with a preset population and first-case date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    UnitedStates,
    NewYorkState,
    ErieCounty,
}

impl Region {
    #[must_use]
    pub fn population(self) -> f64 {
        match self {
            Region::UnitedStates => 328_000_000.0,
            Region::NewYorkState => 19_450_000.0,
            Region::ErieCounty => 1_500_000.0,
        }
    }

    /// Suspected first contact in the region; day 0 of its projections.
    #[must_use]
    pub fn first_case_date(self) -> NaiveDate {
        match self {
            Region::UnitedStates => date(2020, 1, 20),
            Region::NewYorkState => date(2020, 3, 1),
            Region::ErieCounty => date(2020, 3, 16),
        }
    }

    /// The default reductions with boundaries at the school closure (2020-03-18), the
    /// shelter-in-place order (2020-03-25) and the end of the order (2020-05-15), counted from
    /// the region's first case.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the schedule cannot be built.
    pub fn distancing(self) -> Result<DistancingSchedule, EpiError> {
        DistancingSchedule::from_dates(
            self.first_case_date(),
            &[
                (date(2020, 3, 18), 0.0),
                (date(2020, 3, 25), 0.15),
                (date(2020, 5, 15), 0.4),
            ],
            0.2,
        )
    }
}

impl FromStr for Region {
    type Err = EpiError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "united-states" | "us" => Ok(Region::UnitedStates),
            "new-york-state" | "ny" => Ok(Region::NewYorkState),
            "erie-county" | "erie" => Ok(Region::ErieCounty),
            other => Err(EpiError::config(format!(
                "unknown region '{other}', expected united-states, new-york-state or erie-county"
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[serde(default)]
pub struct ParameterBundle {
    /// Regional population `N`.
    #[builder(default = "1_500_000.0")]
    pub population: f64,

    /// People exposed but not yet infectious on day 0.
    #[builder(default = "100.0")]
    pub initial_exposed: f64,

    #[builder(default = "50.0")]
    pub initial_infected: f64,

    #[builder(default = "0.0")]
    pub initial_recovered: f64,

    #[builder(default = "0.0")]
    pub initial_dead: f64,

    /// Observed doubling time of cases, in days. Transmission rates are derived from it.
    #[builder(default = "5.0")]
    pub doubling_time: f64,

    /// Reduction in contact for the constant-rate runs. Phased runs take their reductions from
    /// `distancing` alone.
    #[builder(default = "0.0")]
    pub relative_contact_rate: f64,

    /// Days to recover in the SIR model (`gamma = 1 / recovery_days`).
    #[builder(default = "14.0")]
    pub recovery_days: f64,

    /// Days infectious in the SEIR family (`gamma = 1 / infectious_period`).
    #[builder(default = "3.0")]
    pub infectious_period: f64,

    /// Days from exposure to infectiousness (`alpha = 1 / incubation_period`).
    #[builder(default = "5.8")]
    pub incubation_period: f64,

    /// Overall fatality fraction of resolved infections.
    #[builder(default = "0.006")]
    pub fatal: f64,

    /// Fatality fraction of hospitalized (critical) patients.
    #[builder(default = "0.04")]
    pub fatal_hosp: f64,

    #[builder(default = "default_resource_rates()")]
    pub resource_rates: ResourceRates,

    /// Share of the region's patients that go to the hospitals being planned for.
    #[builder(default = "1.0")]
    pub regional_hosp_share: f64,

    #[builder(default)]
    pub lengths_of_stay: LengthsOfStay,

    #[builder(default)]
    pub ppe: PpeRates,

    /// Relative infectiousness of hospitalized patients.
    #[builder(default = "0.8")]
    pub hosp_contact_factor: f64,

    /// Mean days on the ward before moving to critical care or recovering.
    #[builder(default = "4.0")]
    pub ward_days: f64,

    /// Mean days in critical care before recovery or death.
    #[builder(default = "6.0")]
    pub icu_days: f64,

    /// Projection horizon in days.
    #[builder(default = "180")]
    pub n_days: usize,

    /// Calendar date of day 0.
    #[builder(default = "default_start_date()")]
    pub start_date: NaiveDate,

    #[builder(default = "default_distancing()")]
    pub distancing: DistancingSchedule,
}

impl Default for ParameterBundle {
    fn default() -> Self {
        ParameterBundleBuilder::default().build().unwrap()
    }
}

fn positive(name: &str, value: f64) -> Result<(), EpiError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EpiError::config(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), EpiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EpiError::config(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

fn fraction(name: &str, value: f64) -> Result<(), EpiError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EpiError::config(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

impl ParameterBundle {
    /// The default bundle with the region's population, start date and distancing dates.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the region's schedule cannot be built.
    pub fn for_region(region: Region) -> Result<Self, EpiError> {
        Ok(ParameterBundle {
            population: region.population(),
            start_date: region.first_case_date(),
            distancing: region.distancing()?,
            ..ParameterBundle::default()
        })
    }

    /// Checks every field. Called before any simulation begins; no field is silently replaced.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` describing the first invalid field.
    pub fn validate(&self) -> Result<(), EpiError> {
        positive("population", self.population)?;
        non_negative("initial_exposed", self.initial_exposed)?;
        non_negative("initial_infected", self.initial_infected)?;
        non_negative("initial_recovered", self.initial_recovered)?;
        non_negative("initial_dead", self.initial_dead)?;
        if self.initial_exposed + self.initial_infected <= 0.0 {
            return Err(EpiError::config(
                "at least one person must be exposed or infected on day 0",
            ));
        }
        if self.seeded() > self.population {
            return Err(EpiError::config(format!(
                "initial exposed, infected, recovered and dead ({}) exceed the population ({})",
                self.seeded(),
                self.population
            )));
        }
        positive("doubling_time", self.doubling_time)?;
        fraction("relative_contact_rate", self.relative_contact_rate)?;
        positive("recovery_days", self.recovery_days)?;
        positive("infectious_period", self.infectious_period)?;
        positive("incubation_period", self.incubation_period)?;
        fraction("fatal", self.fatal)?;
        fraction("fatal_hosp", self.fatal_hosp)?;
        self.resource_rates.validate()?;
        fraction("resource_rates.hosp", self.resource_rates.hosp)?;
        fraction("resource_rates.icu", self.resource_rates.icu)?;
        fraction("resource_rates.vent", self.resource_rates.vent)?;
        fraction("regional_hosp_share", self.regional_hosp_share)?;
        self.lengths_of_stay.validate()?;
        self.ppe.validate()?;
        non_negative("hosp_contact_factor", self.hosp_contact_factor)?;
        positive("ward_days", self.ward_days)?;
        positive("icu_days", self.icu_days)?;
        if self.n_days <= CENSUS_TAIL_DAYS {
            return Err(EpiError::config(format!(
                "n_days must exceed {CENSUS_TAIL_DAYS} to produce a census, got {}",
                self.n_days
            )));
        }
        self.distancing.validate()
    }

    fn seeded(&self) -> f64 {
        self.initial_exposed + self.initial_infected + self.initial_recovered + self.initial_dead
    }

    fn susceptible(&self) -> f64 {
        self.population - self.seeded()
    }

    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the doubling time is not positive.
    pub fn growth_rate(&self) -> Result<f64, EpiError> {
        summary::intrinsic_growth_rate(self.doubling_time)
    }

    #[must_use]
    pub fn sir_gamma(&self) -> f64 {
        1.0 / self.recovery_days
    }

    #[must_use]
    pub fn seir_gamma(&self) -> f64 {
        1.0 / self.infectious_period
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        1.0 / self.incubation_period
    }

    /// # Errors
    ///
    /// See [`ParameterBundle::growth_rate`].
    pub fn sir_beta(&self) -> Result<f64, EpiError> {
        Ok(summary::sir_beta(
            self.growth_rate()?,
            self.sir_gamma(),
            self.population,
            self.relative_contact_rate,
        ))
    }

    /// # Errors
    ///
    /// See [`ParameterBundle::growth_rate`].
    pub fn seir_beta(&self) -> Result<f64, EpiError> {
        Ok(summary::seir_beta(
            self.growth_rate()?,
            self.alpha(),
            self.seir_gamma(),
            self.population,
            self.relative_contact_rate,
        ))
    }

    /// The SEIR transmission rate before any contact reduction, which distancing phases scale.
    ///
    /// # Errors
    ///
    /// See [`ParameterBundle::growth_rate`].
    pub fn seir_base_beta(&self) -> Result<f64, EpiError> {
        Ok(summary::seir_beta(
            self.growth_rate()?,
            self.alpha(),
            self.seir_gamma(),
            self.population,
            0.0,
        ))
    }

    /// The base SEIR rate scaled by the distancing schedule.
    ///
    /// # Errors
    ///
    /// See [`ParameterBundle::growth_rate`].
    pub fn phased_transmission(&self) -> Result<Transmission, EpiError> {
        Ok(Transmission::Phased {
            base: self.seir_base_beta()?,
            schedule: self.distancing.clone(),
        })
    }

    #[must_use]
    pub fn sir(&self) -> Sir {
        Sir {
            gamma: self.sir_gamma(),
        }
    }

    #[must_use]
    pub fn seir(&self) -> Seir {
        Seir {
            gamma: self.seir_gamma(),
            alpha: self.alpha(),
        }
    }

    #[must_use]
    pub fn seird(&self) -> Seird {
        Seird {
            gamma: self.seir_gamma(),
            alpha: self.alpha(),
            fatal: self.fatal,
        }
    }

    #[must_use]
    pub fn seijrd(&self) -> Seijrd {
        Seijrd {
            gamma: self.seir_gamma(),
            alpha: self.alpha(),
            fatal: self.fatal,
            fatal_hosp: self.fatal_hosp,
            hosp_rate: self.resource_rates.hosp,
            hosp_day_rate: 1.0 / self.lengths_of_stay.hosp as f64,
            contact_factor: self.hosp_contact_factor,
        }
    }

    #[must_use]
    pub fn seijcrd(&self) -> Seijcrd {
        Seijcrd {
            gamma: self.seir_gamma(),
            alpha: self.alpha(),
            fatal_hosp: self.fatal_hosp,
            hosp_rate: self.resource_rates.hosp,
            icu_rate: self.resource_rates.icu,
            ward_days: self.ward_days,
            icu_days: self.icu_days,
        }
    }

    /// The SIR model has no latent compartment, so the initially exposed start out infected and
    /// the initially dead are counted with the removed.
    #[must_use]
    pub fn sir_initial(&self) -> SirState {
        SirState {
            s: self.susceptible(),
            i: self.initial_exposed + self.initial_infected,
            r: self.initial_recovered + self.initial_dead,
        }
    }

    /// The initially dead are counted with the removed.
    #[must_use]
    pub fn seir_initial(&self) -> SeirState {
        SeirState {
            s: self.susceptible(),
            e: self.initial_exposed,
            i: self.initial_infected,
            r: self.initial_recovered + self.initial_dead,
        }
    }

    #[must_use]
    pub fn seird_initial(&self) -> SeirdState {
        SeirdState {
            s: self.susceptible(),
            e: self.initial_exposed,
            i: self.initial_infected,
            r: self.initial_recovered,
            d: self.initial_dead,
        }
    }

    #[must_use]
    pub fn seijrd_initial(&self) -> SeijrdState {
        SeijrdState {
            s: self.susceptible(),
            e: self.initial_exposed,
            i: self.initial_infected,
            j: 0.0,
            r: self.initial_recovered,
            d: self.initial_dead,
        }
    }

    #[must_use]
    pub fn seijcrd_initial(&self) -> SeijcrdState {
        SeijcrdState {
            s: self.susceptible(),
            e: self.initial_exposed,
            i: self.initial_infected,
            j: 0.0,
            c: 0.0,
            r: self.initial_recovered,
            d: self.initial_dead,
        }
    }
}

/// Reads a JSON parameter file and validates it.
///
/// # Errors
///
/// Returns an `EpiError` if the file can't be read or parsed, or fails validation.
pub fn load_parameters(path: &Path) -> Result<ParameterBundle, EpiError> {
    debug!("Loading parameters from {}", path.display());
    let data = std::fs::read_to_string(path)?;
    let bundle: ParameterBundle = serde_json::from_str(&data)?;
    bundle.validate()?;
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use crate::compartments::Compartments;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let bundle = ParameterBundle::default();
        bundle.validate().unwrap();
        assert_eq!(bundle.n_days, 180);
        assert_eq!(bundle.lengths_of_stay.icu, 9);
        assert_eq!(bundle.distancing.reductions(), vec![0.0, 0.15, 0.4, 0.2]);
    }

    #[test]
    fn every_initial_state_sums_to_population() {
        let bundle = ParameterBundleBuilder::default()
            .population(10_000.0)
            .initial_recovered(20.0)
            .initial_dead(5.0)
            .build()
            .unwrap();
        assert_almost_eq!(bundle.sir_initial().total(), 10_000.0, 1e-9);
        assert_almost_eq!(bundle.seir_initial().total(), 10_000.0, 1e-9);
        assert_almost_eq!(bundle.seird_initial().total(), 10_000.0, 1e-9);
        assert_almost_eq!(bundle.seijrd_initial().total(), 10_000.0, 1e-9);
        assert_almost_eq!(bundle.seijcrd_initial().total(), 10_000.0, 1e-9);
        assert_almost_eq!(bundle.sir_initial().i, 150.0, 1e-9);
    }

    #[test]
    fn invalid_fields_are_configuration_errors() {
        let cases = [
            ParameterBundleBuilder::default().population(0.0).build(),
            ParameterBundleBuilder::default().fatal(-0.1).build(),
            ParameterBundleBuilder::default().doubling_time(0.0).build(),
            ParameterBundleBuilder::default().n_days(10).build(),
            ParameterBundleBuilder::default()
                .initial_exposed(0.0)
                .initial_infected(0.0)
                .build(),
            ParameterBundleBuilder::default()
                .population(100.0)
                .initial_infected(200.0)
                .build(),
            ParameterBundleBuilder::default()
                .lengths_of_stay(LengthsOfStay {
                    hosp: 0,
                    icu: 9,
                    vent: 6,
                })
                .build(),
        ];
        for bundle in cases {
            let bundle = bundle.unwrap();
            assert!(
                matches!(bundle.validate(), Err(EpiError::ConfigurationError(_))),
                "{bundle:?} should be rejected"
            );
        }
    }

    #[test]
    fn derived_rates() {
        let bundle = ParameterBundle::default();
        assert_almost_eq!(bundle.sir_gamma(), 1.0 / 14.0, 1e-15);
        assert_almost_eq!(bundle.seir_gamma(), 1.0 / 3.0, 1e-15);
        assert_almost_eq!(bundle.alpha(), 1.0 / 5.8, 1e-15);
        let g = bundle.growth_rate().unwrap();
        assert_almost_eq!(
            bundle.sir_beta().unwrap() * bundle.population,
            g + 1.0 / 14.0,
            1e-12
        );
        assert_almost_eq!(bundle.seijrd().hosp_day_rate, 0.2, 1e-15);
    }

    #[test]
    fn contact_rate_is_not_applied_twice_to_phased_runs() {
        let bundle = ParameterBundleBuilder::default()
            .relative_contact_rate(0.3)
            .build()
            .unwrap();
        let base = bundle.seir_base_beta().unwrap();
        assert_almost_eq!(bundle.seir_beta().unwrap(), base * 0.7, 1e-18);
        let phased = bundle.phased_transmission().unwrap();
        assert_almost_eq!(phased.beta_on(0), base, 1e-18);
        assert_almost_eq!(phased.beta_on(30), base * 0.6, 1e-18);
        assert_almost_eq!(phased.beta_on(100), base * 0.8, 1e-18);
    }

    #[test]
    fn region_presets() {
        let erie = ParameterBundle::for_region(Region::ErieCounty).unwrap();
        erie.validate().unwrap();
        assert_almost_eq!(erie.population, 1_500_000.0, 1e-6);
        assert_eq!(erie.start_date, NaiveDate::from_ymd_opt(2020, 3, 16).unwrap());
        let boundaries: Vec<i64> = erie.distancing.phases().iter().map(|p| p.until_day).collect();
        assert_eq!(boundaries, vec![2, 9, 60]);
        assert_eq!(erie.distancing.reductions(), vec![0.0, 0.15, 0.4, 0.2]);

        let new_york = ParameterBundle::for_region(Region::NewYorkState).unwrap();
        assert_eq!(new_york.distancing, ParameterBundle::default().distancing);
        assert_almost_eq!(new_york.population, 19_450_000.0, 1e-6);

        let us = ParameterBundle::for_region(Region::UnitedStates).unwrap();
        assert_almost_eq!(us.population, 328_000_000.0, 1e-6);
        let boundaries: Vec<i64> = us.distancing.phases().iter().map(|p| p.until_day).collect();
        assert_eq!(boundaries, vec![58, 65, 116]);
    }

    #[test]
    fn region_names() {
        assert_eq!("erie-county".parse::<Region>().unwrap(), Region::ErieCounty);
        assert_eq!("US".parse::<Region>().unwrap(), Region::UnitedStates);
        assert_eq!("ny".parse::<Region>().unwrap(), Region::NewYorkState);
        assert!(matches!(
            "atlantis".parse::<Region>(),
            Err(EpiError::ConfigurationError(_))
        ));
    }

    #[test]
    fn loads_partial_json_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "population": 19450000.0,
                "n_days": 120,
                "start_date": "2020-03-16",
                "lengths_of_stay": {{ "hosp": 7, "icu": 10, "vent": 8 }}
            }}"#
        )
        .unwrap();
        let bundle = load_parameters(file.path()).unwrap();
        assert_almost_eq!(bundle.population, 19_450_000.0, 1e-6);
        assert_eq!(bundle.n_days, 120);
        assert_eq!(
            bundle.start_date,
            NaiveDate::from_ymd_opt(2020, 3, 16).unwrap()
        );
        assert_eq!(bundle.lengths_of_stay.hosp, 7);
        assert_almost_eq!(bundle.doubling_time, 5.0, 1e-12);
    }

    #[test]
    fn load_rejects_invalid_files() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hosp_contact_factor": -1.0 }}"#).unwrap();
        assert!(matches!(
            load_parameters(file.path()),
            Err(EpiError::ConfigurationError(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_parameters(file.path()),
            Err(EpiError::JsonError(_))
        ));

        assert!(matches!(
            load_parameters(Path::new("does/not/exist.json")),
            Err(EpiError::IoError(_))
        ));
    }

    #[test]
    fn negative_boundary_in_json_is_a_configuration_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "distancing": {{
                "phases": [{{ "until_day": -5, "reduction": 0.1 }}],
                "after": 0.0
            }} }}"#
        )
        .unwrap();
        assert!(matches!(
            load_parameters(file.path()),
            Err(EpiError::ConfigurationError(_))
        ));
    }

    #[test]
    fn unordered_schedule_in_json_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "distancing": {{
                "phases": [
                    {{ "until_day": 30, "reduction": 0.1 }},
                    {{ "until_day": 20, "reduction": 0.2 }}
                ],
                "after": 0.0
            }} }}"#
        )
        .unwrap();
        assert!(matches!(
            load_parameters(file.path()),
            Err(EpiError::ConfigurationError(_))
        ));
    }
}
