use std::str::FromStr;

use serde::Serialize;

use krxboard_core::adapters::warehouse::record_to_ranked;
use krxboard_core::{InvestorType, ProviderId, RankedNetBuy, TradeDate, Warehouse};

use crate::cli::NetBuysArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct NetBuysResponseData {
    base_date: TradeDate,
    investor: InvestorType,
    rankings: Vec<RankedNetBuy>,
}

pub fn run(args: &NetBuysArgs, warehouse: &Warehouse) -> Result<CommandResult, CliError> {
    let base_date = TradeDate::parse(&args.date)?;
    let investor = InvestorType::from_str(&args.investor)?;

    let rankings = warehouse
        .load_net_buys(&base_date.to_string(), investor.code())?
        .into_iter()
        .map(record_to_ranked)
        .collect::<Result<Vec<_>, _>>()?;

    let mut warnings = Vec::new();
    if rankings.is_empty() {
        warnings.push(format!(
            "no {investor} net buys stored for {base_date}; run `krxboard import --date {base_date}`"
        ));
    }

    let data = serde_json::to_value(NetBuysResponseData {
        base_date,
        investor,
        rankings,
    })?;
    Ok(CommandResult::ok(data, vec![ProviderId::Warehouse]).with_warnings(warnings))
}
