//! Schema definitions for Outrigger
//!
//! This crate contains the shared data structures describing a single
//! supervisor run: the pre-exec and main commands and the optional health
//! check that gates the main command's launch. All types implement JSON
//! Schema generation for external consumption.

pub mod run;

pub use run::{HealthCheckKind, HealthCheckSpec, PreExecSpec, ProcessSpec, RunSpec, SpecError};
