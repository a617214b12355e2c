use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Instant in UTC, rendered as RFC3339 with a `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parses an RFC3339 string; any offset other than `Z`/`+00:00` is rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let not_utc = || ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        };

        let parsed = OffsetDateTime::parse(input, &Rfc3339).map_err(|_| not_utc())?;
        if parsed.offset() != UtcOffset::UTC {
            return Err(not_utc());
        }
        Ok(Self(parsed))
    }

    fn to_rfc3339(self) -> Result<String, time::error::Format> {
        self.0.format(&Rfc3339)
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let formatted = self.to_rfc3339().map_err(|_| std::fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self.to_rfc3339().map_err(S::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
