use thiserror::Error;

/// Validation and contract errors exposed by `krxboard-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("stock code cannot be empty")]
    EmptyCode,
    #[error("stock code length {len} exceeds max {max}")]
    CodeTooLong { len: usize, max: usize },
    #[error("stock code contains invalid character '{ch}' at index {index}")]
    CodeInvalidChar { ch: char, index: usize },
    #[error("stock code '{code}' appears more than once in the working set")]
    DuplicateCode { code: String },

    #[error("stock name cannot be empty")]
    EmptyName,
    #[error("invalid grade '{value}', expected one of S, A, B")]
    InvalidGrade { value: String },
    #[error("invalid grade filter '{value}', expected one of all, S, A, B")]
    InvalidGradeFilter { value: String },
    #[error("invalid market '{value}', expected one of KOSPI, KOSDAQ")]
    InvalidMarket { value: String },
    #[error("invalid source '{value}', expected one of sample, featured, warehouse")]
    InvalidSource { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("rank '{field}' must be at least 1")]
    InvalidRank { field: &'static str },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("trade date must be a calendar date in YYYYMMDD form: '{value}'")]
    InvalidTradeDate { value: String },

    #[error("invalid investor '{value}', expected one of institution (7050), foreign (9000)")]
    InvalidInvestor { value: String },
    #[error("series lengths differ: {left} closes vs {right} volumes")]
    SeriesLengthMismatch { left: usize, right: usize },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_pass_through_core_error() {
        let error = CoreError::from(ValidationError::InvalidGrade {
            value: String::from("C"),
        });
        assert_eq!(error.to_string(), "invalid grade 'C', expected one of S, A, B");
    }

    #[test]
    fn series_mismatch_names_both_lengths() {
        let error = ValidationError::SeriesLengthMismatch { left: 3, right: 2 };
        assert_eq!(error.to_string(), "series lengths differ: 3 closes vs 2 volumes");
    }

    #[test]
    fn serde_failures_become_serialization_errors() {
        let serde_error = serde_json::from_str::<u8>("not json").expect_err("must fail");
        assert!(matches!(CoreError::from(serde_error), CoreError::Serialization(_)));
    }
}
