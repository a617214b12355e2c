use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_CODE_LEN: usize = 12;

/// Exchange-issued stock code such as `005930`.
///
/// Codes are matched case-sensitively and are never normalized beyond
/// trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockCode(String);

impl StockCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        let len = trimmed.chars().count();
        if len > MAX_CODE_LEN {
            return Err(ValidationError::CodeTooLong {
                len,
                max: MAX_CODE_LEN,
            });
        }

        if let Some((index, ch)) = trimmed
            .chars()
            .enumerate()
            .find(|(_, ch)| !ch.is_ascii_alphanumeric())
        {
            return Err(ValidationError::CodeInvalidChar { ch, index });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StockCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for StockCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for StockCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StockCode> for String {
    fn from(value: StockCode) -> Self {
        value.0
    }
}
