//! P3 Core
//!
//! Pure computations for performance, portability and productivity (P3)
//! analysis: a loosely typed measurement table, input validation, column
//! projection, application efficiency, code divergence and the performance
//! portability metric.
//!
//! Nothing in this crate performs I/O or logs. Every operation is a
//! deterministic table-to-table transform that leaves its input untouched.

pub mod error;
pub mod metrics;
pub mod projection;
pub mod table;
pub mod validation;

pub use error::{P3Error, Result};
pub use metrics::{application_efficiency, divergence, pp, pp_scores, FomOrdering, PortabilityScore};
pub use projection::{project, Projection};
pub use table::{Column, Table, Value};
