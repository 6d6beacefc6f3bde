//! Derived epidemiological quantities: transmission rates from an observed doubling time,
//! reproduction numbers, peak comparisons between scenarios and outcome totals.
use crate::error::EpiError;
use serde::Serialize;

/// The daily growth rate implied by a case doubling time: `2^(1 / doubling_time) - 1`.
///
/// # Errors
///
/// Returns `EpiError::ConfigurationError` if `doubling_time` is not positive.
pub fn intrinsic_growth_rate(doubling_time: f64) -> Result<f64, EpiError> {
    if !doubling_time.is_finite() || doubling_time <= 0.0 {
        return Err(EpiError::config(format!(
            "doubling time must be a positive number of days, got {doubling_time}"
        )));
    }
    Ok(2f64.powf(1.0 / doubling_time) - 1.0)
}

/// SIR transmission rate reproducing `growth_rate` in a fully susceptible population:
/// `(g + gamma) / N * (1 - relative_contact_rate)`.
#[must_use]
pub fn sir_beta(growth_rate: f64, gamma: f64, population: f64, relative_contact_rate: f64) -> f64 {
    (growth_rate + gamma) / population * (1.0 - relative_contact_rate)
}

/// SEIR transmission rate reproducing `growth_rate`:
/// `(alpha + g) * (g + gamma) / (alpha * N) * (1 - relative_contact_rate)`.
#[must_use]
pub fn seir_beta(
    growth_rate: f64,
    alpha: f64,
    gamma: f64,
    population: f64,
    relative_contact_rate: f64,
) -> f64 {
    (alpha + growth_rate) * (growth_rate + gamma) / (alpha * population)
        * (1.0 - relative_contact_rate)
}

/// Basic reproduction number implied by a growth rate: `(g + gamma) / gamma`.
#[must_use]
pub fn r_naught(growth_rate: f64, gamma: f64) -> f64 {
    (growth_rate + gamma) / gamma
}

/// Reproduction number of a transmission rate in a fully susceptible population:
/// `beta / gamma * N`.
#[must_use]
pub fn reproduction_number(beta: f64, gamma: f64, population: f64) -> f64 {
    beta / gamma * population
}

/// Effective reproduction number for each distancing reduction, `r0 * (1 - reduction)`.
#[must_use]
pub fn effective_reproduction_numbers(r0: f64, reductions: &[f64]) -> Vec<f64> {
    reductions.iter().map(|d| r0 * (1.0 - d)).collect()
}

/// The day and value of the largest entry of `series`.
#[must_use]
pub fn peak(series: &[f64]) -> Option<(usize, f64)> {
    series
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
}

/// Peak of the same quantity under two scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakComparison {
    pub baseline_day: usize,
    pub baseline_peak: f64,
    pub intervention_day: usize,
    pub intervention_peak: f64,
    /// `baseline_peak - intervention_peak`; positive when the intervention lowers the peak.
    pub difference: f64,
}

/// Compares the peaks of a baseline (e.g. no distancing) and an intervention scenario.
///
/// # Errors
///
/// Returns `EpiError::ConfigurationError` if either series is empty.
pub fn compare_peaks(baseline: &[f64], intervention: &[f64]) -> Result<PeakComparison, EpiError> {
    let (baseline_day, baseline_peak) =
        peak(baseline).ok_or_else(|| EpiError::config("baseline series is empty"))?;
    let (intervention_day, intervention_peak) =
        peak(intervention).ok_or_else(|| EpiError::config("intervention series is empty"))?;
    Ok(PeakComparison {
        baseline_day,
        baseline_peak,
        intervention_day,
        intervention_peak,
        difference: baseline_peak - intervention_peak,
    })
}

/// Projected fatalities and infections from the dead and recovered series of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeTotals {
    /// The largest number dead on any day.
    pub fatalities: f64,
    /// Fatalities plus the largest number recovered on any day.
    pub infections: f64,
}

#[must_use]
pub fn outcome_totals(dead: &[f64], recovered: &[f64]) -> OutcomeTotals {
    let max = |series: &[f64]| peak(series).map_or(0.0, |(_, value)| value);
    let fatalities = max(dead);
    OutcomeTotals {
        fatalities,
        infections: fatalities + max(recovered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    #[test]
    fn growth_rate_doubles_cases() {
        let g = intrinsic_growth_rate(5.0).unwrap();
        assert_almost_eq!((1.0 + g).powi(5), 2.0, 1e-12);
        assert!(intrinsic_growth_rate(0.0).is_err());
        assert!(intrinsic_growth_rate(-3.0).is_err());
    }

    #[test]
    fn sir_beta_reproduces_r_naught() {
        let g = intrinsic_growth_rate(5.0).unwrap();
        let gamma = 1.0 / 14.0;
        let population = 1_500_000.0;
        let beta = sir_beta(g, gamma, population, 0.0);
        assert_almost_eq!(
            reproduction_number(beta, gamma, population),
            r_naught(g, gamma),
            1e-9
        );
        let distanced = sir_beta(g, gamma, population, 0.3);
        assert_almost_eq!(distanced, beta * 0.7, 1e-18);
    }

    #[test]
    fn seir_beta_matches_hand_computation() {
        let beta = seir_beta(0.1, 0.2, 0.5, 1000.0, 0.0);
        assert_almost_eq!(beta, 0.3 * 0.6 / 200.0, 1e-15);
    }

    #[test]
    fn effective_reproduction_per_phase() {
        let values = effective_reproduction_numbers(3.0, &[0.0, 0.15, 0.4, 0.2]);
        assert_almost_eq!(values[0], 3.0, 1e-12);
        assert_almost_eq!(values[1], 2.55, 1e-12);
        assert_almost_eq!(values[2], 1.8, 1e-12);
        assert_almost_eq!(values[3], 2.4, 1e-12);
    }

    #[test]
    fn peaks_and_comparison() {
        assert_eq!(peak(&[]), None);
        assert_eq!(peak(&[1.0, 5.0, 3.0]), Some((1, 5.0)));
        let comparison = compare_peaks(&[1.0, 9.0, 4.0], &[1.0, 3.0, 6.0]).unwrap();
        assert_eq!(comparison.baseline_day, 1);
        assert_eq!(comparison.intervention_day, 2);
        assert_almost_eq!(comparison.difference, 3.0, 1e-12);
        assert!(compare_peaks(&[], &[1.0]).is_err());
    }

    #[test]
    fn totals_use_series_maxima() {
        let totals = outcome_totals(&[0.0, 2.0, 5.0], &[0.0, 40.0, 95.0]);
        assert_almost_eq!(totals.fatalities, 5.0, 1e-12);
        assert_almost_eq!(totals.infections, 100.0, 1e-12);
    }
}
