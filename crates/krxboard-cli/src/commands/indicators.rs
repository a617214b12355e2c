use serde::Serialize;

use krxboard_core::adapters::sample::sample_price_history;
use krxboard_core::{indicator_points, IndicatorPoint, ProviderId, TradeDate, RSI_PERIOD};

use crate::cli::IndicatorsArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct IndicatorsResponseData {
    rsi_period: usize,
    points: Vec<IndicatorPoint>,
}

/// Days without a defined RSI (the warm-up window and flat windows) are
/// left out of the response.
pub fn run(args: &IndicatorsArgs, seed: u64) -> Result<CommandResult, CliError> {
    let end = TradeDate::parse(&args.date)?;
    if args.days <= RSI_PERIOD {
        return Err(CliError::Command(format!(
            "--days must exceed the RSI period of {RSI_PERIOD}, got {}",
            args.days
        )));
    }

    let history = sample_price_history(end, args.days, seed);
    let points = indicator_points(&history, RSI_PERIOD);
    tracing::debug!(days = history.len(), points = points.len(), "computed indicators");

    let data = serde_json::to_value(IndicatorsResponseData {
        rsi_period: RSI_PERIOD,
        points,
    })?;
    Ok(CommandResult::ok(data, vec![ProviderId::Sample]))
}
