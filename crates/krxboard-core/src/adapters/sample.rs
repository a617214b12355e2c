use time::Weekday;

use crate::data_source::{HealthStatus, LoadRequest, SourceError, StockRowProvider};
use crate::indicators::PricePoint;
use crate::ranking::{InvestorType, NetBuy, TradeDate};
use crate::{Grade, Market, ProviderId, RowSet, StockCode, StockRow, ValidationError};

pub const DEFAULT_SAMPLE_SEED: u64 = 42;
pub const DEFAULT_SAMPLE_COUNT: usize = 50;
/// Largest set with unique codes; the code pattern wraps after this many rows.
pub const MAX_SAMPLE_COUNT: usize = 1000;

/// Placeholder rows drawn from a seeded generator.
///
/// The same seed always yields the same set, so a list view built on top of it
/// is reproducible across runs. `inst_rank` follows generation order.
#[derive(Debug, Clone)]
pub struct SampleProvider {
    seed: u64,
    count: usize,
}

impl Default for SampleProvider {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SAMPLE_SEED,
            count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

impl SampleProvider {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    fn generate(&self) -> Result<Vec<StockRow>, ValidationError> {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        (0..self.count)
            .map(|index| sample_row(&mut rng, index))
            .collect()
    }
}

impl StockRowProvider for SampleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Sample
    }

    fn load(&self, req: &LoadRequest) -> Result<RowSet, SourceError> {
        if self.count > MAX_SAMPLE_COUNT {
            return Err(SourceError::invalid_request(format!(
                "sample count {} exceeds max {MAX_SAMPLE_COUNT}",
                self.count
            )));
        }

        let rows = self
            .generate()
            .map_err(|error| SourceError::internal(format!("sample generator: {error}")))?
            .into_iter()
            .filter(|row| req.admits(row.market()))
            .take(req.limit)
            .collect::<Vec<_>>();

        tracing::debug!(seed = self.seed, rows = rows.len(), "generated sample rows");
        RowSet::new(rows).map_err(|error| SourceError::internal(error.to_string()))
    }

    fn health(&self) -> HealthStatus {
        HealthStatus::healthy()
    }
}

fn sample_row(rng: &mut fastrand::Rng, index: usize) -> Result<StockRow, ValidationError> {
    let grade = Grade::ALL[rng.usize(..Grade::ALL.len())];
    let change = ((rng.f64() * 6.0 - 3.0) * 100.0).round() / 100.0;
    let price = f64::from(50_000 + rng.u32(..150_000));
    let market = if rng.bool() {
        Market::Kospi
    } else {
        Market::Kosdaq
    };
    let inst_rank = u32::try_from(index + 1).unwrap_or(u32::MAX);

    StockRow::new(
        sample_code(index)?,
        format!("샘플종목{}", index + 1),
        price,
        change,
        grade,
        inst_rank,
        rng.u32(1..=50),
        100_000 + rng.u64(..1_000_000),
        market,
    )
}

/// `00` followed by the decimal digits of `index + 1000` minus the leading
/// digit: index 0 is `00000`, index 49 is `00049`.
fn sample_code(index: usize) -> Result<StockCode, ValidationError> {
    let digits = (index + 1000).to_string();
    StockCode::parse(&format!("00{}", &digits[1..]))
}

/// Seeded net buying by both investor types for every row on `base_date`.
pub fn sample_net_buys(rows: &RowSet, base_date: TradeDate, seed: u64) -> Vec<NetBuy> {
    let day = u64::from(base_date.date().to_julian_day().unsigned_abs());
    let mut rng = fastrand::Rng::with_seed(seed ^ day);
    InvestorType::ALL
        .iter()
        .flat_map(|investor| rows.rows().iter().map(move |row| (*investor, row)))
        .map(|(investor, row)| {
            let net_qty = rng.i64(-500..=500) * 100;
            NetBuy {
                base_date,
                investor,
                code: row.code().clone(),
                name: row.name().to_owned(),
                net_qty,
                net_amt: net_qty.saturating_mul(row.price().round() as i64),
            }
        })
        .collect()
}

/// Seeded closing prices and volumes for the `days` weekdays ending on `end`.
pub fn sample_price_history(end: TradeDate, days: usize, seed: u64) -> Vec<PricePoint> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut dates = Vec::with_capacity(days);
    let mut cursor = Some(end.date());
    while dates.len() < days {
        let Some(date) = cursor else { break };
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            dates.push(TradeDate::from(date));
        }
        cursor = date.previous_day();
    }
    dates.reverse();

    let mut close = f64::from(50_000 + rng.u32(..150_000));
    dates
        .into_iter()
        .map(|base_date| {
            close = (close * (1.0 + (rng.f64() * 6.0 - 3.0) / 100.0)).round().max(1.0);
            PricePoint {
                base_date,
                close,
                volume: 100_000 + rng.u64(..1_000_000),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sample_pattern() {
        assert_eq!(sample_code(0).expect("code").as_str(), "00000");
        assert_eq!(sample_code(49).expect("code").as_str(), "00049");
        assert_eq!(sample_code(9000).expect("code").as_str(), "000000");
    }

    #[test]
    fn generates_fifty_rows_ranked_in_order() {
        let provider = SampleProvider::default();
        let set = provider
            .load(&LoadRequest::new(100, None).expect("request"))
            .expect("load");

        assert_eq!(set.len(), 50);
        for (index, row) in set.rows().iter().enumerate() {
            assert_eq!(row.inst_rank() as usize, index + 1);
            assert_eq!(row.name(), format!("샘플종목{}", index + 1));
            assert!((50_000.0..200_000.0).contains(&row.price()));
            assert!((-3.0..=3.0).contains(&row.change()));
            assert!((1..=50).contains(&row.fore_rank()));
            assert!((100_000..1_100_000).contains(&row.volume()));
        }
    }

    #[test]
    fn largest_sample_keeps_codes_unique() {
        let set = SampleProvider::default()
            .with_count(MAX_SAMPLE_COUNT)
            .load(&LoadRequest::new(MAX_SAMPLE_COUNT, None).expect("request"))
            .expect("load");
        assert_eq!(set.len(), MAX_SAMPLE_COUNT);
        assert_eq!(set.rows()[999].code().as_str(), "00999");
    }

    #[test]
    fn count_above_max_is_an_invalid_request() {
        let err = SampleProvider::default()
            .with_count(MAX_SAMPLE_COUNT + 1)
            .load(&LoadRequest::new(10, None).expect("request"))
            .expect_err("must fail");
        assert_eq!(err.kind(), crate::SourceErrorKind::InvalidRequest);
        assert!(err.message().contains("exceeds max 1000"));
    }

    #[test]
    fn net_buys_cover_both_investors_for_every_row() {
        let rows = SampleProvider::default()
            .with_count(5)
            .load(&LoadRequest::new(5, None).expect("request"))
            .expect("load");
        let date = TradeDate::parse("20250404").expect("date");

        let net_buys = sample_net_buys(&rows, date, DEFAULT_SAMPLE_SEED);

        assert_eq!(net_buys.len(), 10);
        assert!(net_buys[..5].iter().all(|entry| entry.investor == InvestorType::Institution));
        assert!(net_buys[5..].iter().all(|entry| entry.investor == InvestorType::Foreign));
        assert_eq!(net_buys, sample_net_buys(&rows, date, DEFAULT_SAMPLE_SEED));
    }

    #[test]
    fn price_history_skips_weekends_and_ends_on_date() {
        // 2025-04-07 is a Monday.
        let end = TradeDate::parse("20250407").expect("date");
        let history = sample_price_history(end, 3, 7);

        let dates = history
            .iter()
            .map(|point| point.base_date.to_string())
            .collect::<Vec<_>>();
        assert_eq!(dates, vec!["20250403", "20250404", "20250407"]);
        assert!(history.iter().all(|point| point.close >= 1.0));
    }

    #[test]
    fn same_seed_yields_same_rows() {
        let request = LoadRequest::new(50, None).expect("request");
        let first = SampleProvider::with_seed(7).load(&request).expect("load");
        let second = SampleProvider::with_seed(7).load(&request).expect("load");
        assert_eq!(first, second);
    }

    #[test]
    fn respects_limit_and_market() {
        let request = LoadRequest::new(5, Some(Market::Kosdaq)).expect("request");
        let set = SampleProvider::default().load(&request).expect("load");

        assert!(set.len() <= 5);
        assert!(set.rows().iter().all(|row| row.market() == Market::Kosdaq));
    }
}
