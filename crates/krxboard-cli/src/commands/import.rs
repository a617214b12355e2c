use serde::Serialize;

use krxboard_core::adapters::sample::{sample_net_buys, MAX_SAMPLE_COUNT};
use krxboard_core::adapters::warehouse::{ranked_to_record, row_to_record};
use krxboard_core::{
    apply_investor_ranks, rank_net_buys, FeaturedProvider, IngestReport, InvestorType,
    LoadRequest, ProviderId, RankedNetBuy, RowSet, SampleProvider, StockRowProvider, TradeDate,
    Warehouse,
};

use crate::cli::{ImportArgs, ImportSource};
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ImportResponseData {
    #[serde(flatten)]
    report: IngestReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    net_buys: Option<NetBuySummary>,
}

#[derive(Debug, Serialize)]
struct NetBuySummary {
    base_date: TradeDate,
    rows_written: usize,
}

pub fn run(
    args: &ImportArgs,
    seed: u64,
    request_id: &str,
    warehouse: &Warehouse,
) -> Result<CommandResult, CliError> {
    if args.count == 0 || args.count > MAX_SAMPLE_COUNT {
        return Err(CliError::Command(format!(
            "--count must be between 1 and {MAX_SAMPLE_COUNT}, got {}",
            args.count
        )));
    }
    let base_date = args.date.as_deref().map(TradeDate::parse).transpose()?;

    let provider: Box<dyn StockRowProvider> = match args.from {
        ImportSource::Sample => Box::new(SampleProvider::with_seed(seed).with_count(args.count)),
        ImportSource::Featured => Box::new(FeaturedProvider),
    };
    let source = provider.id();

    let request =
        LoadRequest::new(args.count, None).map_err(|error| CliError::Command(error.to_string()))?;
    let mut rows = provider
        .load(&request)
        .map_err(|error| CliError::Command(format!("{source} provider failed: {error}")))?;

    let mut net_buys = None;
    if let Some(base_date) = base_date {
        let ranked = rank_net_buys(sample_net_buys(&rows, base_date, seed));
        rows = apply_investor_ranks(rows, &ranked, base_date)?;
        let rows_written = store_net_buys(warehouse, base_date, request_id, &ranked)?;
        net_buys = Some(NetBuySummary {
            base_date,
            rows_written,
        });
    }

    let report = ingest(warehouse, source, request_id, &rows)?;

    let data = serde_json::to_value(ImportResponseData { report, net_buys })?;
    Ok(CommandResult::ok(data, vec![source, ProviderId::Warehouse]))
}

fn ingest(
    warehouse: &Warehouse,
    source: ProviderId,
    request_id: &str,
    rows: &RowSet,
) -> Result<IngestReport, CliError> {
    let records = rows.rows().iter().map(row_to_record).collect::<Vec<_>>();
    Ok(warehouse.ingest_stock_rows(source.as_str(), request_id, &records)?)
}

fn store_net_buys(
    warehouse: &Warehouse,
    base_date: TradeDate,
    request_id: &str,
    ranked: &[RankedNetBuy],
) -> Result<usize, CliError> {
    let base_date = base_date.to_string();
    let mut written = 0;
    for investor in InvestorType::ALL {
        let records = ranked
            .iter()
            .filter(|entry| entry.net_buy.investor == investor)
            .map(ranked_to_record)
            .collect::<Vec<_>>();
        written += warehouse.replace_net_buys(&base_date, investor.code(), request_id, &records)?;
    }
    Ok(written)
}
