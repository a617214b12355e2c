//! DuckDB-backed store for stock rows and per-investor net-buy rankings.
//!
//! The warehouse is the persistent side of the provider seam: rows are
//! ingested in a single transaction and read back ordered by institutional
//! rank so a freshly loaded set matches the default list ordering.

pub mod duckdb;
pub mod migrations;
mod net_buy;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{params, Connection};
use serde::Serialize;
use thiserror::Error;

pub use crate::duckdb::{AccessMode, DuckDbConnectionManager, PooledConnection};
pub use crate::net_buy::NetBuyRecord;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("record rejected: {0}")]
    Rejected(String),

    #[error("stored record is corrupt: {0}")]
    CorruptRecord(String),
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub max_pool_size: usize,
}

impl WarehouseConfig {
    /// Layout rooted at `home`: the database lives in `<home>/cache/warehouse.duckdb`.
    pub fn at_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let db_path = home.join("cache").join("warehouse.duckdb");
        Self {
            home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::at_home(resolve_home())
    }
}

/// Flat storage form of a stock row. Enum-valued columns are kept as text;
/// callers own the conversion back into typed rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRecord {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub grade: String,
    pub inst_rank: u32,
    pub fore_rank: u32,
    pub volume: u64,
    pub market: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub request_id: String,
    pub rows_written: usize,
    pub total_rows: u64,
}

#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size)?;
        let warehouse = Self { manager };
        warehouse.initialize()?;
        tracing::debug!(db_path = %config.db_path.display(), "warehouse opened");
        Ok(warehouse)
    }

    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Upserts `rows` by code and appends one `ingest_log` entry, all in one
    /// transaction.
    pub fn ingest_stock_rows(
        &self,
        source: &str,
        request_id: &str,
        rows: &[StockRecord],
    ) -> Result<IngestReport, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;

        if !rows.is_empty() {
            connection.execute_batch("BEGIN TRANSACTION")?;
            let result = write_rows(&connection, source, request_id, rows);
            finalize_transaction(&connection, result)?;
        }

        let total_rows = count_rows(&connection)?;
        tracing::info!(source, request_id, rows = rows.len(), total_rows, "ingested stock rows");

        Ok(IngestReport {
            source: source.to_owned(),
            request_id: request_id.to_owned(),
            rows_written: rows.len(),
            total_rows,
        })
    }

    /// Reads stored rows ordered by `inst_rank`, then `code`.
    pub fn load_stock_rows(
        &self,
        market: Option<&str>,
        limit: usize,
    ) -> Result<Vec<StockRecord>, WarehouseError> {
        if limit == 0 {
            return Err(WarehouseError::Rejected(String::from(
                "limit must be greater than zero",
            )));
        }

        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let base = "SELECT code, name, price, change_pct, grade, inst_rank, fore_rank, volume, market FROM stock_rows";
        let order = format!("ORDER BY inst_rank, code LIMIT {limit}");

        let raw = match market {
            Some(market) => {
                let sql = format!("{base} WHERE market = ? {order}");
                let mut statement = connection.prepare(sql.as_str())?;
                let rows = statement.query_map(params![market], read_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("{base} {order}");
                let mut statement = connection.prepare(sql.as_str())?;
                let rows = statement.query_map([], read_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        let records = raw
            .into_iter()
            .map(into_record)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = records.len(), ?market, "loaded stock rows");
        Ok(records)
    }

    pub fn stock_row_count(&self) -> Result<u64, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        count_rows(&connection)
    }
}

fn write_rows(
    connection: &Connection,
    source: &str,
    request_id: &str,
    rows: &[StockRecord],
) -> Result<(), WarehouseError> {
    let mut upsert = connection.prepare(
        r#"
INSERT OR REPLACE INTO stock_rows (
    code, name, price, change_pct, grade, inst_rank, fore_rank, volume, market, source, updated_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
"#,
    )?;

    for row in rows {
        let volume = i64::try_from(row.volume).map_err(|_| {
            WarehouseError::Rejected(format!("volume for '{}' exceeds BIGINT range", row.code))
        })?;
        upsert.execute(params![
            row.code,
            row.name,
            row.price,
            row.change,
            row.grade,
            i64::from(row.inst_rank),
            i64::from(row.fore_rank),
            volume,
            row.market,
            source,
        ])?;
    }

    let row_count = i64::try_from(rows.len())
        .map_err(|_| WarehouseError::Rejected(String::from("too many rows in one ingest")))?;
    connection.execute(
        "INSERT INTO ingest_log (request_id, source, row_count, status, timestamp) VALUES (?, ?, ?, 'ok', CURRENT_TIMESTAMP)",
        params![request_id, source, row_count],
    )?;

    Ok(())
}

type RawRecord = (String, String, f64, f64, String, i64, i64, i64, String);

fn read_record(row: &::duckdb::Row<'_>) -> Result<RawRecord, ::duckdb::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn into_record(raw: RawRecord) -> Result<StockRecord, WarehouseError> {
    let (code, name, price, change, grade, inst_rank, fore_rank, volume, market) = raw;
    let out_of_range = |column: &str| {
        WarehouseError::CorruptRecord(format!("stored {column} for '{code}' is out of range"))
    };

    Ok(StockRecord {
        inst_rank: u32::try_from(inst_rank).map_err(|_| out_of_range("inst_rank"))?,
        fore_rank: u32::try_from(fore_rank).map_err(|_| out_of_range("fore_rank"))?,
        volume: u64::try_from(volume).map_err(|_| out_of_range("volume"))?,
        code,
        name,
        price,
        change,
        grade,
        market,
    })
}

fn count_rows(connection: &Connection) -> Result<u64, WarehouseError> {
    let count: i64 = connection.query_row("SELECT COUNT(*) FROM stock_rows", [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or_default())
}

fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os("KRXBOARD_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".krxboard");
    }

    PathBuf::from(".krxboard")
}
