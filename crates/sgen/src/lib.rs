//! # SGen
//!
//! Command-line front end of [`sgen_core`]: reads `sgen.yml`, compiles the
//! configured stylesheets and writes the generated Swift files, skipping
//! the ones whose content did not change.
//!
//! - [`config`]: configuration parsing and path validation.
//! - [`run`]: the load, resolve and generate pipeline.
//! - [`writer`]: idempotent file output.

pub mod config;
pub mod run;
pub mod writer;

pub use config::{Config, ConfigError};
pub use run::{compile, run, Generated};
pub use writer::Outcome;
