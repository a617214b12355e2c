use std::str::FromStr;

use krxboard_warehouse::{NetBuyRecord, StockRecord, Warehouse, WarehouseError};

use crate::data_source::{HealthState, HealthStatus, LoadRequest, SourceError, StockRowProvider};
use crate::ranking::{InvestorType, NetBuy, RankedNetBuy, TradeDate};
use crate::{Grade, Market, ProviderId, RowSet, StockCode, StockRow, ValidationError};

/// Rows persisted in the local DuckDB warehouse.
#[derive(Clone)]
pub struct WarehouseProvider {
    warehouse: Warehouse,
}

impl WarehouseProvider {
    pub fn new(warehouse: Warehouse) -> Self {
        Self { warehouse }
    }
}

impl StockRowProvider for WarehouseProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Warehouse
    }

    fn load(&self, req: &LoadRequest) -> Result<RowSet, SourceError> {
        let market = req.market.map(Market::as_str);
        let records = self
            .warehouse
            .load_stock_rows(market, req.limit)
            .map_err(warehouse_to_source_error)?;

        let rows = records
            .into_iter()
            .map(|record| {
                let code = record.code.clone();
                record_to_row(record).map_err(|error| {
                    SourceError::invalid_data(format!("stored row '{code}' is invalid: {error}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        RowSet::new(rows).map_err(|error| SourceError::invalid_data(error.to_string()))
    }

    fn health(&self) -> HealthStatus {
        match self.warehouse.stock_row_count() {
            Ok(0) => HealthStatus {
                state: HealthState::Degraded,
                detail: Some(String::from("warehouse holds no stock rows; run `krxboard import`")),
            },
            Ok(_) => HealthStatus::healthy(),
            Err(error) => HealthStatus::unhealthy(error.to_string()),
        }
    }
}

/// Flattens a row into its storage form.
pub fn row_to_record(row: &StockRow) -> StockRecord {
    StockRecord {
        code: row.code().to_string(),
        name: row.name().to_owned(),
        price: row.price(),
        change: row.change(),
        grade: row.grade().as_str().to_owned(),
        inst_rank: row.inst_rank(),
        fore_rank: row.fore_rank(),
        volume: row.volume(),
        market: row.market().as_str().to_owned(),
    }
}

fn record_to_row(record: StockRecord) -> Result<StockRow, ValidationError> {
    StockRow::new(
        StockCode::parse(&record.code)?,
        record.name,
        record.price,
        record.change,
        Grade::from_str(&record.grade)?,
        record.inst_rank,
        record.fore_rank,
        record.volume,
        Market::from_str(&record.market)?,
    )
}

/// Flattens a ranked net buy into its storage form, keyed by exchange codes.
pub fn ranked_to_record(ranked: &RankedNetBuy) -> NetBuyRecord {
    let net_buy = &ranked.net_buy;
    NetBuyRecord {
        base_date: net_buy.base_date.to_string(),
        investor: net_buy.investor.code().to_owned(),
        code: net_buy.code.to_string(),
        name: net_buy.name.clone(),
        net_qty: net_buy.net_qty,
        net_amt: net_buy.net_amt,
        rank_qty: ranked.rank_qty,
        rank_amt: ranked.rank_amt,
    }
}

pub fn record_to_ranked(record: NetBuyRecord) -> Result<RankedNetBuy, ValidationError> {
    Ok(RankedNetBuy {
        net_buy: NetBuy {
            base_date: TradeDate::parse(&record.base_date)?,
            investor: InvestorType::from_str(&record.investor)?,
            code: StockCode::parse(&record.code)?,
            name: record.name,
            net_qty: record.net_qty,
            net_amt: record.net_amt,
        },
        rank_qty: record.rank_qty,
        rank_amt: record.rank_amt,
    })
}

pub(crate) fn warehouse_to_source_error(error: WarehouseError) -> SourceError {
    match error {
        WarehouseError::Rejected(message) => SourceError::invalid_request(message),
        WarehouseError::CorruptRecord(message) => SourceError::invalid_data(message),
        other => SourceError::unavailable(other.to_string()),
    }
}
