use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Identifiers for the row providers, used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Sample,
    Featured,
    Warehouse,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Sample, Self::Featured, Self::Warehouse];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sample => "sample",
            Self::Featured => "featured",
            Self::Warehouse => "warehouse",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sample" => Ok(Self::Sample),
            "featured" => Ok(Self::Featured),
            "warehouse" => Ok(Self::Warehouse),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
