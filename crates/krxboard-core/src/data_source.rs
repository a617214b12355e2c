use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Market, ProviderId, RowSet};

/// Health state reported by `sources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime provider health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    pub const fn healthy() -> Self {
        Self {
            state: HealthState::Healthy,
            detail: None,
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self {
            state: HealthState::Unhealthy,
            detail: Some(detail.into()),
        }
    }
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    InvalidRequest,
    InvalidData,
    Internal,
}

/// Structured provider error, surfaced as an envelope error by the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidData,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::InvalidData => "source.invalid_data",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Parameters for loading a working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub limit: usize,
    pub market: Option<Market>,
}

impl LoadRequest {
    pub fn new(limit: usize, market: Option<Market>) -> Result<Self, SourceError> {
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "load request limit must be greater than zero",
            ));
        }
        Ok(Self { limit, market })
    }

    /// Whether `market` passes this request's market restriction.
    pub fn admits(&self, market: Market) -> bool {
        self.market.map_or(true, |wanted| wanted == market)
    }
}

/// Supplies the full working set for a list view.
///
/// Implementations decide where rows come from; the list-view pipeline only
/// ever sees the returned [`RowSet`].
pub trait StockRowProvider: Send + Sync {
    fn id(&self) -> ProviderId;
    fn load(&self, req: &LoadRequest) -> Result<RowSet, SourceError>;
    fn health(&self) -> HealthStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_limit() {
        let err = LoadRequest::new(0, None).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
        assert_eq!(err.code(), "source.invalid_request");
        assert!(!err.retryable());
    }

    #[test]
    fn market_restriction_admits_matching_rows_only() {
        let any = LoadRequest::new(10, None).expect("valid");
        let kosdaq = LoadRequest::new(10, Some(Market::Kosdaq)).expect("valid");

        assert!(any.admits(Market::Kospi));
        assert!(kosdaq.admits(Market::Kosdaq));
        assert!(!kosdaq.admits(Market::Kospi));
    }

    #[test]
    fn display_includes_code() {
        let err = SourceError::unavailable("warehouse is locked");
        assert_eq!(err.to_string(), "warehouse is locked (source.unavailable)");
        assert!(err.retryable());
    }
}
