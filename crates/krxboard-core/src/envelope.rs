use serde::Serialize;

use crate::{ProviderId, SourceError, UtcDateTime, ValidationError};

/// Current version of the machine-readable output contract.
pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Wrapper around every machine-readable `krxboard` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        errors.iter().try_for_each(EnvelopeError::validate)?;
        Ok(Self { meta, data, errors })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    /// Providers consulted to build `data`, in order.
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        source_chain: Vec<ProviderId>,
        latency_ms: u64,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: SCHEMA_VERSION.to_owned(),
            generated_at: UtcDateTime::now(),
            source_chain,
            latency_ms,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }
        if !is_semver_tag(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }
        if self.source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }
        Ok(())
    }
}

/// Error entry for partial or failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProviderId>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable: false,
            source: None,
        };
        error.validate()?;
        Ok(error)
    }

    /// Converts a provider failure into its envelope form.
    pub fn from_source(error: &SourceError, source: ProviderId) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            retryable: error.retryable(),
            source: Some(source),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }
        Ok(())
    }
}

// vMAJOR.MINOR.PATCH, digits only.
fn is_semver_tag(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };
    let parts = version.split('.').collect::<Vec<_>>();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}
