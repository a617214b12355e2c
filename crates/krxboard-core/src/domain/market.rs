use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Korea Exchange market segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Kospi,
    Kosdaq,
}

impl Market {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kospi => "KOSPI",
            Self::Kosdaq => "KOSDAQ",
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "KOSPI" => Ok(Self::Kospi),
            "KOSDAQ" => Ok(Self::Kosdaq),
            other => Err(ValidationError::InvalidMarket {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_uppercase() {
        let json = serde_json::to_string(&Market::Kosdaq).expect("serialize");
        assert_eq!(json, "\"KOSDAQ\"");
    }

    #[test]
    fn parses_mixed_case() {
        assert_eq!(Market::from_str("Kospi").expect("parse"), Market::Kospi);
    }
}
