use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] krxboard_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("provider reported {error_count} error(s)")]
    ProviderFailure { error_count: usize },

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Warehouse(#[from] krxboard_warehouse::WarehouseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Command(_) => 2,
            Self::ProviderFailure { .. } => 3,
            Self::Serialization(_) => 4,
            Self::StrictModeViolation { .. } => 5,
            Self::Warehouse(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(CliError::Command(String::from("x")).exit_code(), 2);
        assert_eq!(CliError::ProviderFailure { error_count: 1 }.exit_code(), 3);
        assert_eq!(
            CliError::StrictModeViolation {
                warning_count: 1,
                error_count: 0
            }
            .exit_code(),
            5
        );
        assert_eq!(
            CliError::Io(std::io::Error::other("disk")).exit_code(),
            10
        );
    }
}
