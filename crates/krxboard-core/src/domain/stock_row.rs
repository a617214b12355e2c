use std::collections::HashSet;

use serde::Serialize;

use crate::{Grade, Market, StockCode, ValidationError};

/// One ranked stock as shown in the list view.
///
/// Rows are immutable after construction; filtering and sorting operate on
/// borrowed views and never touch the row itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRow {
    code: StockCode,
    name: String,
    price: f64,
    change: f64,
    grade: Grade,
    inst_rank: u32,
    fore_rank: u32,
    volume: u64,
    market: Market,
}

impl StockRow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: StockCode,
        name: impl Into<String>,
        price: f64,
        change: f64,
        grade: Grade,
        inst_rank: u32,
        fore_rank: u32,
        volume: u64,
        market: Market,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if !price.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        if price < 0.0 {
            return Err(ValidationError::NegativeValue { field: "price" });
        }
        if !change.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "change" });
        }
        if inst_rank == 0 {
            return Err(ValidationError::InvalidRank { field: "inst_rank" });
        }
        if fore_rank == 0 {
            return Err(ValidationError::InvalidRank { field: "fore_rank" });
        }

        Ok(Self {
            code,
            name,
            price,
            change,
            grade,
            inst_rank,
            fore_rank,
            volume,
            market,
        })
    }

    /// Returns the row with both investor ranks replaced.
    pub fn with_ranks(self, inst_rank: u32, fore_rank: u32) -> Result<Self, ValidationError> {
        if inst_rank == 0 {
            return Err(ValidationError::InvalidRank { field: "inst_rank" });
        }
        if fore_rank == 0 {
            return Err(ValidationError::InvalidRank { field: "fore_rank" });
        }

        Ok(Self {
            inst_rank,
            fore_rank,
            ..self
        })
    }

    pub fn code(&self) -> &StockCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn price(&self) -> f64 {
        self.price
    }

    pub const fn change(&self) -> f64 {
        self.change
    }

    pub const fn grade(&self) -> Grade {
        self.grade
    }

    pub const fn inst_rank(&self) -> u32 {
        self.inst_rank
    }

    pub const fn fore_rank(&self) -> u32 {
        self.fore_rank
    }

    pub const fn volume(&self) -> u64 {
        self.volume
    }

    pub const fn market(&self) -> Market {
        self.market
    }
}

/// Ordered working set of rows with unique codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowSet {
    rows: Vec<StockRow>,
}

impl RowSet {
    pub fn new(rows: Vec<StockRow>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.code.as_str()) {
                return Err(ValidationError::DuplicateCode {
                    code: row.code.to_string(),
                });
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<StockRow> {
        self.rows
    }
}
