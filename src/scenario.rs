//! The projection pipeline: step function → simulator → disposition mapper → admissions →
//! census, instantiated once per scenario.
//!
//! [`project`] is the only place the stages are chained. [`StandardProjections::run`] builds
//! the usual comparison set from one [`ParameterBundle`] and derives the summary statistics
//! that compare them.
use crate::admissions::{build_admissions, AdmissionsTable};
use crate::census::{build_census, CensusTable};
use crate::compartments::{
    Compartments, SeijcrdState, SeijrdState, SeirState, SeirdState, SirState,
};
use crate::disposition::{get_dispositions, Dispositions};
use crate::error::EpiError;
use crate::models::StepFunction;
use crate::parameters::ParameterBundle;
use crate::schedule::Transmission;
use crate::simulator::{simulate, Trajectory};
use crate::summary::{
    compare_peaks, effective_reproduction_numbers, outcome_totals, r_naught,
    reproduction_number, OutcomeTotals, PeakComparison,
};
use crate::table::Table;
use log::debug;
use serde::Serialize;

/// One model variant with its initial state and transmission over a fixed horizon.
#[derive(Debug, Clone)]
pub struct Scenario<F: StepFunction> {
    pub name: String,
    pub step: F,
    pub initial: F::State,
    pub transmission: Transmission,
    pub n_days: usize,
}

impl<F: StepFunction> Scenario<F> {
    /// A scenario over the bundle's horizon.
    pub fn new(
        name: impl Into<String>,
        step: F,
        initial: F::State,
        transmission: Transmission,
        parameters: &ParameterBundle,
    ) -> Self {
        Scenario {
            name: name.into(),
            step,
            initial,
            transmission,
            n_days: parameters.n_days,
        }
    }
}

/// Everything one scenario produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<C: Compartments> {
    pub name: String,
    pub trajectory: Trajectory<C>,
    /// Cumulative hospital, ICU and ventilator demand per day.
    pub dispositions: Dispositions,
    pub admissions: AdmissionsTable,
    pub census: CensusTable,
}

/// The named-column views of a projection, ready for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionTables {
    pub name: String,
    pub trajectory: Table,
    pub admissions: Table,
    pub census: Table,
}

impl<C: Compartments> Projection<C> {
    #[must_use]
    pub fn tables(&self) -> ProjectionTables {
        ProjectionTables {
            name: self.name.clone(),
            trajectory: self.trajectory.to_table(),
            admissions: self.admissions.to_table(),
            census: self.census.to_table(),
        }
    }
}

/// Runs the full pipeline for one scenario, taking resource rates, the regional share, lengths
/// of stay and PPE rates from `parameters`.
///
/// # Errors
///
/// Propagates the first error of any stage.
pub fn project<F: StepFunction>(
    scenario: &Scenario<F>,
    parameters: &ParameterBundle,
) -> Result<Projection<F::State>, EpiError> {
    debug!("Projecting scenario {}", scenario.name);
    let trajectory = simulate(
        &scenario.step,
        scenario.initial,
        &scenario.transmission,
        scenario.n_days,
    )?;
    let dispositions = get_dispositions(
        &trajectory.cumulative_cases(),
        &parameters.resource_rates,
        parameters.regional_hosp_share,
    )?;
    let admissions = build_admissions(&dispositions)?;
    let census = build_census(&admissions, &parameters.lengths_of_stay, &parameters.ppe)?;
    Ok(Projection {
        name: scenario.name.clone(),
        trajectory,
        dispositions,
        admissions,
        census,
    })
}

/// Statistics comparing the standard scenarios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpiSummary {
    pub growth_rate: f64,
    /// `(g + gamma) / gamma` for the SIR recovery rate.
    pub r_naught: f64,
    /// SIR reproduction number after the relative contact reduction.
    pub r_t: f64,
    /// SEIR reproduction number under each distancing phase, ending with the post-schedule one.
    /// These ignore `relative_contact_rate`, as the phased runs do.
    pub phase_reproduction_numbers: Vec<f64>,
    /// Daily hospital admissions without distancing (baseline) and with it.
    pub admissions_peak: PeakComparison,
    /// Hospital census without distancing (baseline) and with it.
    pub census_peak: PeakComparison,
    /// From the phase-adjusted SEIRD run.
    pub totals: OutcomeTotals,
}

/// The standard comparison set, all driven from one parameter bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardProjections {
    pub sir: Projection<SirState>,
    pub seir: Projection<SeirState>,
    pub seir_phased: Projection<SeirState>,
    pub seird_phased: Projection<SeirdState>,
    pub seird_unmitigated: Projection<SeirdState>,
    pub seijrd_phased: Projection<SeijrdState>,
    pub seijcrd_phased: Projection<SeijcrdState>,
    pub summary: EpiSummary,
}

impl StandardProjections {
    /// Validates `parameters` and runs every standard scenario.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the bundle is invalid, or the first error of
    /// any scenario.
    pub fn run(parameters: &ParameterBundle) -> Result<Self, EpiError> {
        parameters.validate()?;
        let sir_beta = parameters.sir_beta()?;
        let seir_beta = parameters.seir_beta()?;
        let phased = parameters.phased_transmission()?;

        let sir = project(
            &Scenario::new(
                "sir",
                parameters.sir(),
                parameters.sir_initial(),
                Transmission::Constant(sir_beta),
                parameters,
            ),
            parameters,
        )?;
        let seir = project(
            &Scenario::new(
                "seir",
                parameters.seir(),
                parameters.seir_initial(),
                Transmission::Constant(seir_beta),
                parameters,
            ),
            parameters,
        )?;
        let seir_phased = project(
            &Scenario::new(
                "seir_phased",
                parameters.seir(),
                parameters.seir_initial(),
                phased.clone(),
                parameters,
            ),
            parameters,
        )?;
        let seird_phased = project(
            &Scenario::new(
                "seird_phased",
                parameters.seird(),
                parameters.seird_initial(),
                phased.clone(),
                parameters,
            ),
            parameters,
        )?;
        let seird_unmitigated = project(
            &Scenario::new(
                "seird_unmitigated",
                parameters.seird(),
                parameters.seird_initial(),
                Transmission::Constant(seir_beta),
                parameters,
            ),
            parameters,
        )?;
        let seijrd_phased = project(
            &Scenario::new(
                "seijrd_phased",
                parameters.seijrd(),
                parameters.seijrd_initial(),
                phased.clone(),
                parameters,
            ),
            parameters,
        )?;
        let seijcrd_phased = project(
            &Scenario::new(
                "seijcrd_phased",
                parameters.seijcrd(),
                parameters.seijcrd_initial(),
                phased,
                parameters,
            ),
            parameters,
        )?;

        let summary = summarize(parameters, &seird_unmitigated, &seird_phased)?;
        Ok(StandardProjections {
            sir,
            seir,
            seir_phased,
            seird_phased,
            seird_unmitigated,
            seijrd_phased,
            seijcrd_phased,
            summary,
        })
    }

    /// Table views of every scenario, in run order.
    #[must_use]
    pub fn tables(&self) -> Vec<ProjectionTables> {
        vec![
            self.sir.tables(),
            self.seir.tables(),
            self.seir_phased.tables(),
            self.seird_phased.tables(),
            self.seird_unmitigated.tables(),
            self.seijrd_phased.tables(),
            self.seijcrd_phased.tables(),
        ]
    }
}

fn summarize(
    parameters: &ParameterBundle,
    baseline: &Projection<SeirdState>,
    intervention: &Projection<SeirdState>,
) -> Result<EpiSummary, EpiError> {
    let growth_rate = parameters.growth_rate()?;
    let seir_r0 = reproduction_number(
        parameters.seir_base_beta()?,
        parameters.seir_gamma(),
        parameters.population,
    );

    let hosp_admits = |projection: &Projection<SeirdState>| -> Vec<f64> {
        projection.admissions.rows().iter().map(|r| r.hosp).collect()
    };
    let hosp_census = |projection: &Projection<SeirdState>| -> Vec<f64> {
        projection.census.rows().iter().map(|r| r.hosp).collect()
    };
    let admissions_peak = compare_peaks(&hosp_admits(baseline), &hosp_admits(intervention))?;
    let census_peak = compare_peaks(&hosp_census(baseline), &hosp_census(intervention))?;

    let states = intervention.trajectory.states();
    let dead: Vec<f64> = states.iter().map(|state| state.d).collect();
    let recovered: Vec<f64> = states.iter().map(|state| state.r).collect();

    let reductions = parameters.distancing.reductions();

    Ok(EpiSummary {
        growth_rate,
        r_naught: r_naught(growth_rate, parameters.sir_gamma()),
        r_t: reproduction_number(
            parameters.sir_beta()?,
            parameters.sir_gamma(),
            parameters.population,
        ),
        phase_reproduction_numbers: effective_reproduction_numbers(seir_r0, &reductions),
        admissions_peak,
        census_peak,
        totals: outcome_totals(&dead, &recovered),
    })
}
