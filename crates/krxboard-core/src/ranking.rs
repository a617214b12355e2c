//! Daily net-buy rankings per investor type.
//!
//! Each trade date and investor type forms its own partition. Inside a
//! partition stocks are dense-ranked by net buy quantity and, separately, by
//! net buy amount, largest first: equal values share a rank and the next
//! distinct value takes the following rank with no gap.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month};

use crate::{RowSet, StockCode, StockRow, ValidationError};

/// KRX investor classification used for the rank columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestorType {
    /// Institutions total, exchange code `7050`.
    Institution,
    /// Foreign investors, exchange code `9000`.
    Foreign,
}

impl InvestorType {
    pub const ALL: [Self; 2] = [Self::Institution, Self::Foreign];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Institution => "institution",
            Self::Foreign => "foreign",
        }
    }

    /// Exchange division code stored alongside each ranking.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Institution => "7050",
            Self::Foreign => "9000",
        }
    }
}

impl Display for InvestorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestorType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "institution" | "7050" => Ok(Self::Institution),
            "foreign" | "9000" => Ok(Self::Foreign),
            other => Err(ValidationError::InvalidInvestor {
                value: other.to_owned(),
            }),
        }
    }
}

/// Exchange trade date, written `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradeDate(Date);

impl TradeDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTradeDate {
            value: input.to_owned(),
        };

        let trimmed = input.trim();
        if trimmed.len() != 8 || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = trimmed[0..4].parse::<i32>().map_err(|_| invalid())?;
        let month = trimmed[4..6]
            .parse::<u8>()
            .ok()
            .and_then(|month| Month::try_from(month).ok())
            .ok_or_else(invalid)?;
        let day = trimmed[6..8].parse::<u8>().map_err(|_| invalid())?;

        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub const fn date(self) -> Date {
        self.0
    }
}

impl Display for TradeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl From<Date> for TradeDate {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl FromStr for TradeDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for TradeDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TradeDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Net buying of one stock by one investor type on one trade date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetBuy {
    pub base_date: TradeDate,
    pub investor: InvestorType,
    pub code: StockCode,
    pub name: String,
    pub net_qty: i64,
    pub net_amt: i64,
}

/// A [`NetBuy`] with its dense ranks inside its date and investor partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedNetBuy {
    #[serde(flatten)]
    pub net_buy: NetBuy,
    pub rank_qty: u32,
    pub rank_amt: u32,
}

/// Dense-ranks every record inside its `(base_date, investor)` partition.
///
/// The output keeps the input order.
pub fn rank_net_buys(net_buys: Vec<NetBuy>) -> Vec<RankedNetBuy> {
    let mut partitions: HashMap<(TradeDate, InvestorType), (Vec<i64>, Vec<i64>)> = HashMap::new();
    for net_buy in &net_buys {
        let (quantities, amounts) = partitions
            .entry((net_buy.base_date, net_buy.investor))
            .or_default();
        quantities.push(net_buy.net_qty);
        amounts.push(net_buy.net_amt);
    }
    for (quantities, amounts) in partitions.values_mut() {
        distinct_descending(quantities);
        distinct_descending(amounts);
    }

    net_buys
        .into_iter()
        .map(|net_buy| {
            let (rank_qty, rank_amt) = partitions
                .get(&(net_buy.base_date, net_buy.investor))
                .map(|(quantities, amounts)| {
                    (
                        dense_rank(quantities, net_buy.net_qty),
                        dense_rank(amounts, net_buy.net_amt),
                    )
                })
                .unwrap_or((1, 1));
            RankedNetBuy {
                net_buy,
                rank_qty,
                rank_amt,
            }
        })
        .collect()
}

/// Overwrites `inst_rank` and `fore_rank` with the quantity ranks for
/// `base_date`. Rows without a ranking for an investor keep their current
/// value for that column.
pub fn apply_investor_ranks(
    rows: RowSet,
    ranked: &[RankedNetBuy],
    base_date: TradeDate,
) -> Result<RowSet, ValidationError> {
    let ranks = ranked
        .iter()
        .filter(|entry| entry.net_buy.base_date == base_date)
        .map(|entry| {
            (
                (entry.net_buy.code.as_str(), entry.net_buy.investor),
                entry.rank_qty,
            )
        })
        .collect::<HashMap<_, _>>();

    let rows = rows
        .into_rows()
        .into_iter()
        .map(|row| {
            let code = row.code().as_str();
            let inst_rank = ranks
                .get(&(code, InvestorType::Institution))
                .copied()
                .unwrap_or(row.inst_rank());
            let fore_rank = ranks
                .get(&(code, InvestorType::Foreign))
                .copied()
                .unwrap_or(row.fore_rank());
            row.with_ranks(inst_rank, fore_rank)
        })
        .collect::<Result<Vec<StockRow>, _>>()?;

    RowSet::new(rows)
}

fn distinct_descending(values: &mut Vec<i64>) {
    values.sort_unstable_by(|left, right| right.cmp(left));
    values.dedup();
}

fn dense_rank(distinct_desc: &[i64], value: i64) -> u32 {
    let above = distinct_desc.partition_point(|candidate| *candidate > value);
    u32::try_from(above + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grade, Market};

    fn date(value: &str) -> TradeDate {
        TradeDate::parse(value).expect("valid date")
    }

    fn net_buy(investor: InvestorType, code: &str, net_qty: i64, net_amt: i64) -> NetBuy {
        NetBuy {
            base_date: date("20250404"),
            investor,
            code: StockCode::parse(code).expect("code"),
            name: format!("종목{code}"),
            net_qty,
            net_amt,
        }
    }

    fn row(code: &str, inst_rank: u32, fore_rank: u32) -> StockRow {
        StockRow::new(
            StockCode::parse(code).expect("code"),
            format!("종목{code}"),
            10_000.0,
            0.5,
            Grade::A,
            inst_rank,
            fore_rank,
            1_000,
            Market::Kospi,
        )
        .expect("row")
    }

    fn ranks(ranked: &[RankedNetBuy]) -> Vec<(&str, u32, u32)> {
        ranked
            .iter()
            .map(|entry| (entry.net_buy.code.as_str(), entry.rank_qty, entry.rank_amt))
            .collect()
    }

    #[test]
    fn ties_share_a_rank_without_gaps() {
        let ranked = rank_net_buys(vec![
            net_buy(InvestorType::Institution, "000001", 500, 10),
            net_buy(InvestorType::Institution, "000002", 900, 30),
            net_buy(InvestorType::Institution, "000003", 500, 30),
            net_buy(InvestorType::Institution, "000004", -200, 20),
        ]);

        assert_eq!(
            ranks(&ranked),
            vec![
                ("000001", 2, 3),
                ("000002", 1, 1),
                ("000003", 2, 1),
                ("000004", 3, 2),
            ]
        );
    }

    #[test]
    fn investor_types_rank_independently() {
        let ranked = rank_net_buys(vec![
            net_buy(InvestorType::Institution, "005930", 100, 100),
            net_buy(InvestorType::Foreign, "005930", 900, 900),
            net_buy(InvestorType::Institution, "000660", 300, 300),
            net_buy(InvestorType::Foreign, "000660", 50, 50),
        ]);

        assert_eq!(
            ranks(&ranked),
            vec![
                ("005930", 2, 2),
                ("005930", 1, 1),
                ("000660", 1, 1),
                ("000660", 2, 2),
            ]
        );
    }

    #[test]
    fn trade_dates_rank_independently() {
        let mut later = net_buy(InvestorType::Foreign, "000660", 1, 1);
        later.base_date = date("20250407");

        let ranked = rank_net_buys(vec![net_buy(InvestorType::Foreign, "005930", 5, 5), later]);

        assert_eq!(ranks(&ranked), vec![("005930", 1, 1), ("000660", 1, 1)]);
    }

    #[test]
    fn applies_quantity_ranks_to_matching_rows() {
        let rows = RowSet::new(vec![row("005930", 9, 9), row("000660", 8, 8)]).expect("rows");
        let ranked = rank_net_buys(vec![
            net_buy(InvestorType::Institution, "005930", 10, 1),
            net_buy(InvestorType::Institution, "000660", 20, 2),
            net_buy(InvestorType::Foreign, "005930", 30, 3),
        ]);

        let updated = apply_investor_ranks(rows, &ranked, date("20250404")).expect("apply");

        let view = updated
            .rows()
            .iter()
            .map(|row| (row.code().as_str(), row.inst_rank(), row.fore_rank()))
            .collect::<Vec<_>>();
        assert_eq!(view, vec![("005930", 2, 1), ("000660", 1, 8)]);
    }

    #[test]
    fn rankings_from_other_dates_are_ignored() {
        let rows = RowSet::new(vec![row("005930", 4, 5)]).expect("rows");
        let ranked = rank_net_buys(vec![net_buy(InvestorType::Institution, "005930", 10, 1)]);

        let updated = apply_investor_ranks(rows, &ranked, date("20250405")).expect("apply");

        assert_eq!(updated.rows()[0].inst_rank(), 4);
        assert_eq!(updated.rows()[0].fore_rank(), 5);
    }

    #[test]
    fn investor_parses_names_and_exchange_codes() {
        assert_eq!(InvestorType::from_str("7050").expect("code"), InvestorType::Institution);
        assert_eq!(InvestorType::from_str("Foreign").expect("name"), InvestorType::Foreign);
        assert!(matches!(
            InvestorType::from_str("retail"),
            Err(ValidationError::InvalidInvestor { .. })
        ));
    }

    #[test]
    fn trade_date_round_trips_compact_form() {
        assert_eq!(date("20250404").to_string(), "20250404");
        assert!(TradeDate::parse("20250230").is_err());
        assert!(TradeDate::parse("2025-04-04").is_err());
    }
}
