//! Maps a compartment series onto the hospital resources it will need.
use crate::error::EpiError;
use serde::{Deserialize, Serialize};

/// Fractions of a population that need each resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRates {
    pub hosp: f64,
    pub icu: f64,
    pub vent: f64,
}

impl ResourceRates {
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if any rate is negative or not finite.
    pub fn validate(&self) -> Result<(), EpiError> {
        for (name, rate) in [("hosp", self.hosp), ("icu", self.icu), ("vent", self.vent)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(EpiError::config(format!(
                    "{name} rate must be a non-negative number, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Hospitalized, ICU and ventilated series derived from one compartment series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispositions {
    pub hosp: Vec<f64>,
    pub icu: Vec<f64>,
    pub vent: Vec<f64>,
}

impl Dispositions {
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosp.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosp.is_empty()
    }

    /// Element-wise sum of two disposition sets, e.g. those taken from the infected and the
    /// recovered series.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::ConfigurationError` if the series lengths differ.
    pub fn combine(&self, other: &Dispositions) -> Result<Dispositions, EpiError> {
        if self.len() != other.len() {
            return Err(EpiError::config(format!(
                "cannot combine dispositions of length {} and {}",
                self.len(),
                other.len()
            )));
        }
        let add = |a: &[f64], b: &[f64]| -> Vec<f64> {
            a.iter().zip(b).map(|(x, y)| x + y).collect()
        };
        Ok(Dispositions {
            hosp: add(&self.hosp, &other.hosp),
            icu: add(&self.icu, &other.icu),
            vent: add(&self.vent, &other.vent),
        })
    }
}

/// Scales `series` by each resource rate and the regional share of hospital beds:
/// `resource[t] = series[t] * rate * share`.
///
/// # Errors
///
/// Returns `EpiError::ConfigurationError` for a negative rate or a share outside [0, 1].
pub fn get_dispositions(
    series: &[f64],
    rates: &ResourceRates,
    regional_share: f64,
) -> Result<Dispositions, EpiError> {
    rates.validate()?;
    if !(0.0..=1.0).contains(&regional_share) {
        return Err(EpiError::config(format!(
            "regional hospital share must be in [0, 1], got {regional_share}"
        )));
    }
    let scale = |rate: f64| -> Vec<f64> {
        series.iter().map(|v| v * rate * regional_share).collect()
    };
    Ok(Dispositions {
        hosp: scale(rates.hosp),
        icu: scale(rates.icu),
        vent: scale(rates.vent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    const RATES: ResourceRates = ResourceRates {
        hosp: 0.025,
        icu: 0.0125,
        vent: 0.01,
    };

    #[test]
    fn scales_by_rate_and_share() {
        let dispositions = get_dispositions(&[0.0, 1000.0, 4000.0], &RATES, 0.5).unwrap();
        assert_eq!(dispositions.len(), 3);
        assert_almost_eq!(dispositions.hosp[1], 12.5, 1e-12);
        assert_almost_eq!(dispositions.icu[2], 25.0, 1e-12);
        assert_almost_eq!(dispositions.vent[2], 20.0, 1e-12);
        assert_almost_eq!(dispositions.hosp[0], 0.0, 1e-12);
    }

    #[test]
    fn combining_adds_element_wise() {
        let infected = get_dispositions(&[100.0, 200.0], &RATES, 1.0).unwrap();
        let recovered = get_dispositions(&[0.0, 50.0], &RATES, 1.0).unwrap();
        let total = infected.combine(&recovered).unwrap();
        assert_almost_eq!(total.hosp[1], 250.0 * 0.025, 1e-12);

        let short = get_dispositions(&[1.0], &RATES, 1.0).unwrap();
        assert!(infected.combine(&short).is_err());
    }

    #[test]
    fn rejects_bad_share_and_rates() {
        assert!(get_dispositions(&[1.0], &RATES, 1.5).is_err());
        let negative = ResourceRates {
            hosp: -0.1,
            ..RATES
        };
        assert!(get_dispositions(&[1.0], &negative, 1.0).is_err());
    }
}
