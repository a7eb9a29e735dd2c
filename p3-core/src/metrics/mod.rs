//! Metrics computed over projected performance tables.

pub mod divergence;
pub mod efficiency;
pub mod pp;

pub use divergence::{divergence, CoverageEntry, COVERAGE, COVERAGE_KEY, DIVERGENCE};
pub use efficiency::{application_efficiency, FomOrdering, DEFAULT_FOM_COLUMN};
pub use pp::{harmonic_mean, pp, pp_scores, PortabilityScore, APP_PP, ARCH_PP};
