use ::duckdb::{params, Connection};
use serde::Serialize;

use crate::{finalize_transaction, AccessMode, Warehouse, WarehouseError};

/// One stock's net buying by one investor type on one trade date, with its
/// dense ranks by quantity and by amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetBuyRecord {
    pub base_date: String,
    pub investor: String,
    pub code: String,
    pub name: String,
    pub net_qty: i64,
    pub net_amt: i64,
    pub rank_qty: u32,
    pub rank_amt: u32,
}

impl Warehouse {
    /// Replaces every record for `(base_date, investor)` with `records` in one
    /// transaction. Records for any other date or investor are rejected.
    pub fn replace_net_buys(
        &self,
        base_date: &str,
        investor: &str,
        request_id: &str,
        records: &[NetBuyRecord],
    ) -> Result<usize, WarehouseError> {
        if let Some(stray) = records
            .iter()
            .find(|record| record.base_date != base_date || record.investor != investor)
        {
            return Err(WarehouseError::Rejected(format!(
                "net buy for '{}' belongs to {}/{}, not {base_date}/{investor}",
                stray.code, stray.base_date, stray.investor
            )));
        }

        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = write_net_buys(&connection, base_date, investor, request_id, records);
        finalize_transaction(&connection, result)?;

        tracing::info!(
            base_date,
            investor,
            request_id,
            rows = records.len(),
            "replaced net buy rankings"
        );
        Ok(records.len())
    }

    /// Reads one ranking ordered by quantity rank, then code.
    pub fn load_net_buys(
        &self,
        base_date: &str,
        investor: &str,
    ) -> Result<Vec<NetBuyRecord>, WarehouseError> {
        let connection = self.manager.acquire(AccessMode::ReadOnly)?;
        let mut statement = connection.prepare(
            r#"
SELECT base_dt, inv_div, stock_cd, stock_nm, net_buy_qty, net_buy_amt, rank_qty, rank_amt
FROM inv_net_buy_day
WHERE base_dt = ? AND inv_div = ?
ORDER BY rank_qty, stock_cd
"#,
        )?;
        let raw = statement
            .query_map(params![base_date, investor], read_net_buy)?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter().map(into_net_buy).collect()
    }
}

fn write_net_buys(
    connection: &Connection,
    base_date: &str,
    investor: &str,
    request_id: &str,
    records: &[NetBuyRecord],
) -> Result<(), WarehouseError> {
    connection.execute(
        "DELETE FROM inv_net_buy_day WHERE base_dt = ? AND inv_div = ?",
        params![base_date, investor],
    )?;

    let mut insert = connection.prepare(
        r#"
INSERT INTO inv_net_buy_day (
    base_dt, inv_div, stock_cd, stock_nm, net_buy_qty, net_buy_amt, rank_qty, rank_amt
) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
    )?;
    for record in records {
        insert.execute(params![
            record.base_date,
            record.investor,
            record.code,
            record.name,
            record.net_qty,
            record.net_amt,
            i64::from(record.rank_qty),
            i64::from(record.rank_amt),
        ])?;
    }

    let row_count = i64::try_from(records.len())
        .map_err(|_| WarehouseError::Rejected(String::from("too many rows in one ingest")))?;
    connection.execute(
        "INSERT INTO ingest_log (request_id, source, row_count, status, timestamp) VALUES (?, ?, ?, 'ok', CURRENT_TIMESTAMP)",
        params![request_id, format!("net_buy:{investor}"), row_count],
    )?;

    Ok(())
}

type RawNetBuy = (String, String, String, String, i64, i64, i64, i64);

fn read_net_buy(row: &::duckdb::Row<'_>) -> Result<RawNetBuy, ::duckdb::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_net_buy(raw: RawNetBuy) -> Result<NetBuyRecord, WarehouseError> {
    let (base_date, investor, code, name, net_qty, net_amt, rank_qty, rank_amt) = raw;
    let bad_rank = |column: &str| {
        WarehouseError::CorruptRecord(format!("stored {column} for '{code}' is out of range"))
    };

    Ok(NetBuyRecord {
        rank_qty: u32::try_from(rank_qty).map_err(|_| bad_rank("rank_qty"))?,
        rank_amt: u32::try_from(rank_amt).map_err(|_| bad_rank("rank_amt"))?,
        base_date,
        investor,
        code,
        name,
        net_qty,
        net_amt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WarehouseConfig;
    use tempfile::tempdir;

    fn net_buy(date: &str, investor: &str, code: &str, rank_qty: u32) -> NetBuyRecord {
        NetBuyRecord {
            base_date: date.to_owned(),
            investor: investor.to_owned(),
            code: code.to_owned(),
            name: format!("종목{code}"),
            net_qty: 1_000 / i64::from(rank_qty),
            net_amt: 72_800_000 / i64::from(rank_qty),
            rank_qty,
            rank_amt: rank_qty,
        }
    }

    #[test]
    fn replace_swaps_only_the_matching_partition() {
        let temp = tempdir().expect("tempdir");
        let warehouse = Warehouse::open(WarehouseConfig::at_home(temp.path())).expect("open");

        warehouse
            .replace_net_buys(
                "20250404",
                "7050",
                "request-0001",
                &[net_buy("20250404", "7050", "000660", 2), net_buy("20250404", "7050", "005930", 1)],
            )
            .expect("institution");
        warehouse
            .replace_net_buys("20250404", "9000", "request-0002", &[net_buy("20250404", "9000", "005930", 1)])
            .expect("foreign");
        warehouse
            .replace_net_buys("20250404", "7050", "request-0003", &[net_buy("20250404", "7050", "373220", 1)])
            .expect("institution again");

        let institution = warehouse.load_net_buys("20250404", "7050").expect("load");
        assert_eq!(institution, vec![net_buy("20250404", "7050", "373220", 1)]);
        assert_eq!(warehouse.load_net_buys("20250404", "9000").expect("load").len(), 1);
    }

    #[test]
    fn load_orders_by_quantity_rank() {
        let temp = tempdir().expect("tempdir");
        let warehouse = Warehouse::open(WarehouseConfig::at_home(temp.path())).expect("open");
        let records = [
            net_buy("20250404", "7050", "000003", 2),
            net_buy("20250404", "7050", "000002", 1),
            net_buy("20250404", "7050", "000001", 2),
        ];

        warehouse
            .replace_net_buys("20250404", "7050", "request-0001", &records)
            .expect("replace");

        let codes = warehouse
            .load_net_buys("20250404", "7050")
            .expect("load")
            .into_iter()
            .map(|record| record.code)
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["000002", "000001", "000003"]);
    }

    #[test]
    fn records_from_another_partition_are_rejected() {
        let temp = tempdir().expect("tempdir");
        let warehouse = Warehouse::open(WarehouseConfig::at_home(temp.path())).expect("open");

        let error = warehouse
            .replace_net_buys("20250404", "7050", "request-0001", &[net_buy("20250404", "9000", "005930", 1)])
            .expect_err("must fail");

        assert!(matches!(error, WarehouseError::Rejected(_)));
        assert!(warehouse.load_net_buys("20250404", "7050").expect("load").is_empty());
    }
}
