//! Error taxonomy for table validation and metric computation.
//!
//! Every variant is an input failure: nothing here is retryable, and no
//! partial table is ever returned alongside an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum P3Error {
    /// A required key column is absent.
    #[error("table does not contain a column named '{column}'; the following columns are required: {required:?}")]
    MissingColumn {
        column: String,
        required: Vec<String>,
    },

    /// Neither of the efficiency columns is present.
    #[error("table must contain a column named 'arch eff' or 'app eff'")]
    MissingEfficiencyColumn,

    /// A column that must be numeric holds a non-numeric, non-null value.
    #[error("column '{column}' must contain only numeric values")]
    NonNumericValue { column: String },

    /// An efficiency column holds a value outside [0, 1].
    #[error("{column} must be in range [0, 1]")]
    OutOfRange { column: String },

    /// A coverage trace is not a list of `{file, id, used_lines}` entries.
    #[error("coverage data failed schema validation: {reason}")]
    InvalidCoverage { reason: String },

    #[error("column '{column}' appears more than once")]
    DuplicateColumn { column: String },

    #[error("column '{column}' has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, P3Error>;
