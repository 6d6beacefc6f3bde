//! Deterministic compartmental epidemic projections for hospital capacity planning.
//!
//! Epicensus steps a compartmental model (SIR, SEIR, SEIR with fatalities, or SEIR with
//! hospital and critical-care compartments) forward one day at a time, optionally lowering the
//! transmission rate in phases to represent social distancing, and turns the resulting
//! trajectory into the numbers a hospital needs:
//! * how many people will ever have needed a ward bed, an ICU bed or a ventilator,
//! * new admissions per day,
//! * the daily census of occupied beds, given lengths of stay,
//! * daily demand for personal protective equipment.
//!
//! Every stage is a pure function of its inputs. A [`ParameterBundle`] carries all inputs;
//! [`project`] chains the stages for one [`Scenario`], and [`StandardProjections::run`]
//! produces the usual comparison set (with and without distancing) along with summary
//! statistics.
//!
//! ```
//! use epicensus::{ParameterBundleBuilder, StandardProjections};
//!
//! let parameters = ParameterBundleBuilder::default()
//!     .population(250_000.0)
//!     .n_days(90)
//!     .build()
//!     .unwrap();
//! let projections = StandardProjections::run(&parameters).unwrap();
//! assert_eq!(projections.seird_phased.census.len(), 80);
//! ```
pub mod admissions;
pub mod census;
pub mod compartments;
pub mod dates;
pub mod disposition;
pub mod error;
pub mod log;
pub mod models;
pub mod numeric;
pub mod parameters;
pub mod scenario;
pub mod schedule;
pub mod simulator;
pub mod summary;
pub mod table;

mod macros;

pub use admissions::{build_admissions, AdmissionsRow, AdmissionsTable};
pub use census::{build_census, CensusRow, CensusTable, LengthsOfStay, PpeRates};
pub use compartments::{
    Compartments, SeijcrdState, SeijrdState, SeirState, SeirdState, SirState,
};
pub use dates::{add_date_column, DateOptions};
pub use disposition::{get_dispositions, Dispositions, ResourceRates};
pub use error::EpiError;
pub use log::{debug, error, info, trace, warn};
pub use models::{Seijcrd, Seijrd, Seir, Seird, Sir, StepFunction};
pub use parameters::{load_parameters, ParameterBundle, ParameterBundleBuilder, Region};
pub use scenario::{project, EpiSummary, Projection, ProjectionTables, Scenario, StandardProjections};
pub use schedule::{DistancingPhase, DistancingSchedule, Transmission};
pub use simulator::{simulate, Trajectory};
pub use table::{Column, Table};
