use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpiError` and maps to other errors to
/// convert to an `EpiError`
///
/// Every computation in the core is deterministic, so an error returned for a
/// given set of inputs will be returned again for the same inputs. Nothing in
/// the core retries or swallows these.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    /// The parameter bundle (or a piece of it) cannot describe a valid run:
    /// non-positive population, negative rates, zero lengths of stay, a
    /// malformed distancing schedule, a horizon too short for a census.
    ConfigurationError(String),
    /// A table handed to a table utility is malformed, e.g. it has no integer
    /// `day` column.
    ValidationError(String),
    /// The conservation rescale of a step divided by a zero (or non-finite)
    /// total. Fatal for the run.
    NumericDegeneracy(String),
    IoError(io::Error),
    JsonError(serde_json::Error),
}

impl EpiError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        EpiError::ConfigurationError(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EpiError::ValidationError(message.into())
    }
}

impl From<io::Error> for EpiError {
    fn from(error: io::Error) -> Self {
        EpiError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiError {
    fn from(error: serde_json::Error) -> Self {
        EpiError::JsonError(error)
    }
}

impl std::error::Error for EpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpiError::IoError(error) => Some(error),
            EpiError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiError::ConfigurationError(message) => {
                write!(f, "configuration error: {message}")
            }
            EpiError::ValidationError(message) => write!(f, "validation error: {message}"),
            EpiError::NumericDegeneracy(message) => write!(f, "numeric degeneracy: {message}"),
            EpiError::IoError(error) => write!(f, "io error: {error}"),
            EpiError::JsonError(error) => write!(f, "json error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        let error = EpiError::config("population must be positive");
        assert_eq!(
            error.to_string(),
            "configuration error: population must be positive"
        );
        let error = EpiError::validation("no day column");
        assert_eq!(error.to_string(), "validation error: no day column");
    }

    #[test]
    fn io_errors_convert_and_keep_source() {
        let error: EpiError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(error, EpiError::IoError(_)));
        assert!(std::error::Error::source(&error).is_some());
    }
}
