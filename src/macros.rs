//! Declarative macros exported at the crate root.
mod assert_almost_eq;
mod define_compartments;
