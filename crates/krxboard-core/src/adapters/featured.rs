use crate::data_source::{HealthStatus, LoadRequest, SourceError, StockRowProvider};
use crate::{Grade, Market, ProviderId, RowSet, StockCode, StockRow, ValidationError};

/// The fixed "top stocks" table from the dashboard landing page.
#[derive(Debug, Clone, Default)]
pub struct FeaturedProvider;

impl StockRowProvider for FeaturedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Featured
    }

    fn load(&self, req: &LoadRequest) -> Result<RowSet, SourceError> {
        let rows = featured_rows()
            .map_err(|error| SourceError::internal(format!("featured rows: {error}")))?
            .into_iter()
            .filter(|row| req.admits(row.market()))
            .take(req.limit)
            .collect();

        RowSet::new(rows).map_err(|error| SourceError::internal(error.to_string()))
    }

    fn health(&self) -> HealthStatus {
        HealthStatus::healthy()
    }
}

fn featured_rows() -> Result<Vec<StockRow>, ValidationError> {
    let table: [(&str, &str, f64, f64, Grade, u32, u32, u64); 5] = [
        ("005930", "삼성전자", 72_800.0, 2.1, Grade::S, 1, 3, 14_235_118),
        ("373220", "LG에너지솔루션", 438_500.0, 1.5, Grade::A, 2, 5, 312_407),
        ("000660", "SK하이닉스", 154_500.0, 0.8, Grade::S, 3, 1, 3_120_554),
        ("207940", "삼성바이오로직스", 785_000.0, -0.5, Grade::B, 8, 12, 68_912),
        ("005380", "현대차", 246_500.0, 1.2, Grade::A, 5, 4, 702_331),
    ];

    table
        .into_iter()
        .map(|(code, name, price, change, grade, inst_rank, fore_rank, volume)| {
            StockRow::new(
                StockCode::parse(code)?,
                name,
                price,
                change,
                grade,
                inst_rank,
                fore_rank,
                volume,
                Market::Kospi,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_five_kospi_rows_in_table_order() {
        let set = FeaturedProvider
            .load(&LoadRequest::new(10, None).expect("request"))
            .expect("load");

        let codes = set
            .rows()
            .iter()
            .map(|row| row.code().as_str())
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["005930", "373220", "000660", "207940", "005380"]);
    }

    #[test]
    fn kosdaq_request_is_empty() {
        let set = FeaturedProvider
            .load(&LoadRequest::new(10, Some(Market::Kosdaq)).expect("request"))
            .expect("load");
        assert!(set.is_empty());
    }
}
