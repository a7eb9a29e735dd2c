//! P3 Analysis
//!
//! Performance, portability and productivity analysis of benchmark data:
//! - Loading measurement tables from CSV, TSV and JSON
//! - Column projection onto problem / application / platform
//! - Application efficiency from a figure of merit
//! - Performance portability (harmonic mean of efficiencies)
//! - Code divergence from per-platform coverage traces
//! - Text, JSON, CSV and Markdown reports
//!
//! The computations live in the pure `p3_core` crate, re-exported here.

pub mod cli;
pub mod config;
pub mod data;
pub mod report;
pub mod telemetry;

pub use p3_core;
pub use p3_core::metrics::{application_efficiency, divergence, pp, FomOrdering};
pub use p3_core::{P3Error, Projection, Table, Value};

pub use config::{AnalysisConfig, ConfigLoader};
pub use data::load_table;
pub use report::{OutputFormat, Report};
