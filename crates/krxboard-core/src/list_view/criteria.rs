use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::{Grade, ValidationError};

/// Rows per page in the list view.
pub const PAGE_SIZE: usize = 15;

/// Grade restriction applied after the text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradeFilter {
    #[default]
    All,
    Only(Grade),
}

impl GradeFilter {
    pub fn admits(self, grade: Grade) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == grade,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(grade) => grade.as_str(),
        }
    }
}

impl Display for GradeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeFilter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        Grade::from_str(value)
            .map(Self::Only)
            .map_err(|_| ValidationError::InvalidGradeFilter {
                value: value.trim().to_owned(),
            })
    }
}

impl Serialize for GradeFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Price,
    Change,
    Grade,
    InstRank,
    ForeRank,
    Volume,
}

impl SortKey {
    pub const ALL: [Self; 6] = [
        Self::Price,
        Self::Change,
        Self::Grade,
        Self::InstRank,
        Self::ForeRank,
        Self::Volume,
    ];

    /// Lenient lookup: `inst_rank`, `instRank` and `INST_RANK` all resolve to
    /// [`SortKey::InstRank`]. Unknown names resolve to `None`, which leaves
    /// row order untouched.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value
            .trim()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "price" => Some(Self::Price),
            "change" => Some(Self::Change),
            "grade" => Some(Self::Grade),
            "instrank" => Some(Self::InstRank),
            "forerank" => Some(Self::ForeRank),
            "volume" => Some(Self::Volume),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Change => "change",
            Self::Grade => "grade",
            Self::InstRank => "inst_rank",
            Self::ForeRank => "fore_rank",
            Self::Volume => "volume",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Column and direction; `key: None` means "keep input order".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    pub const fn unsorted() -> Self {
        Self {
            key: None,
            direction: SortDirection::Asc,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::InstRank, SortDirection::Asc)
    }
}

/// Everything the user controls about the list except the page number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ListCriteria {
    pub query: String,
    pub grade_filter: GradeFilter,
    pub sort: SortSpec,
}
