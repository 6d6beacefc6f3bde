//! The `log` module controls epicensus' diagnostic logging. Log messages describe what the
//! projection pipeline is doing (which scenario is running, the transmission rate used on each
//! day); they are not the projection output, which is returned as tables.
//!
//! The five logging macros `error!`, `warn!`, `info!`, `debug!` and `trace!` are re-exported
//! here and from the crate root:
//!
//! ```rust
//! use epicensus::info;
//!
//! pub fn announce() {
//!     info!("Starting projections.");
//! }
//! ```
//!
//! Logging is _disabled_ by default. Front ends switch it on with [`apply_log_spec`], which
//! takes a string such as `"info"` or `"debug,epicensus::simulator=trace"`. Library users can
//! set the same things from code:
//!
//! ```rust
//! use epicensus::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! pub fn setup_logging() {
//!     set_log_level(LevelFilter::Info);
//!     // Per-day transmission rates for the simulator only.
//!     set_module_filter("epicensus::simulator", LevelFilter::Trace);
//! }
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

use crate::error::EpiError;
pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
#[cfg(feature = "logging")]
use log4rs::Handle;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter for the log messages of one module path (e.g. `"epicensus::census"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    module: String,
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Tracks the module filter levels and holds the handle to the global logger.
///
/// Loggers are installed globally, so only one instance of this struct exists. The public API
/// are free functions which fetch the singleton and call the matching method.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// The level filter for modules without an explicit filter. `LevelFilter::Off` disables
    /// logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    /// Handle to the `log4rs` logger.
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filter(&mut self, module: &str, level: LevelFilter) {
        if self.insert_module_filter(module, level) {
            self.set_config();
        }
    }

    /// Applies every level in `spec` and rebuilds the logger once.
    pub(in crate::log) fn apply(&mut self, spec: &LogSpec) {
        let mut mutated = false;
        if let Some(level) = spec.global {
            mutated |= self.global_log_level != level;
            self.global_log_level = level;
        }
        for (module, level) in &spec.modules {
            mutated |= self.insert_module_filter(module, *level);
        }
        if mutated {
            self.set_config();
        }
    }

    #[cfg(test)]
    pub(in crate::log) fn remove_module_filter(&mut self, module: &str) {
        if self.module_configurations.remove(module).is_some() {
            self.set_config();
        }
    }
}

// The public API

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    get_log_configuration().set_module_filter(module_path, level_filter);
}

/// A parsed log specification: an optional global level and per-module levels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogSpec {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

impl FromStr for LogSpec {
    type Err = EpiError;

    /// Parses comma-separated entries, each either a level (`info`) or `module=level`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parse_level = |level: &str| {
            LevelFilter::from_str(level.trim()).map_err(|_| {
                EpiError::config(format!("unknown log level '{}'", level.trim()))
            })
        };
        let mut parsed = LogSpec::default();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((module, level)) => {
                    let module = module.trim();
                    if module.is_empty() {
                        return Err(EpiError::config(format!(
                            "log filter '{entry}' has no module path"
                        )));
                    }
                    parsed.modules.push((module.to_string(), parse_level(level)?));
                }
                None => parsed.global = Some(parse_level(entry)?),
            }
        }
        Ok(parsed)
    }
}

/// Parses `spec` (see [`LogSpec`]) and applies it to the global logger. Without a global level
/// in `spec`, the global level is left unchanged.
///
/// # Errors
///
/// Returns `EpiError::ConfigurationError` if `spec` names an unknown level.
pub fn apply_log_spec(spec: &str) -> Result<(), EpiError> {
    let parsed: LogSpec = spec.parse()?;
    get_log_configuration().apply(&parsed);
    Ok(())
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
