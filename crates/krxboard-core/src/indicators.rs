//! Daily technical indicators over one stock's closing prices.

use serde::Serialize;

use crate::ranking::TradeDate;
use crate::ValidationError;

/// Window used for the relative strength index.
pub const RSI_PERIOD: usize = 14;

/// One trading day of a single stock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub base_date: TradeDate,
    pub close: f64,
    pub volume: u64,
}

/// Indicator values for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub base_date: TradeDate,
    pub close: f64,
    pub rsi: f64,
    pub obv: i64,
}

/// Relative strength index using simple moving averages of gains and losses.
///
/// Entry `i` is `None` until `period` price changes are available, and also
/// when the window holds neither a gain nor a loss. A window with gains and
/// no losses yields 100.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];
    if period == 0 {
        return values;
    }

    let deltas = closes
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect::<Vec<_>>();

    for (end, window) in deltas.windows(period).enumerate() {
        let gain = window.iter().map(|delta| delta.max(0.0)).sum::<f64>() / period as f64;
        let loss = window.iter().map(|delta| (-delta).max(0.0)).sum::<f64>() / period as f64;

        values[end + period] = if loss == 0.0 {
            (gain > 0.0).then_some(100.0)
        } else {
            Some(100.0 - 100.0 / (1.0 + gain / loss))
        };
    }

    values
}

/// On-balance volume starting from zero on the first day.
pub fn obv(closes: &[f64], volumes: &[u64]) -> Result<Vec<i64>, ValidationError> {
    if closes.len() != volumes.len() {
        return Err(ValidationError::SeriesLengthMismatch {
            left: closes.len(),
            right: volumes.len(),
        });
    }

    let mut running = 0_i64;
    let mut values = Vec::with_capacity(closes.len());
    for (index, close) in closes.iter().enumerate() {
        if index > 0 {
            let volume = i64::try_from(volumes[index]).unwrap_or(i64::MAX);
            let previous = closes[index - 1];
            if *close > previous {
                running = running.saturating_add(volume);
            } else if *close < previous {
                running = running.saturating_sub(volume);
            }
        }
        values.push(running);
    }

    Ok(values)
}

/// Computes RSI and OBV over a price history in date order, keeping only the
/// days with a defined RSI.
pub fn indicator_points(history: &[PricePoint], period: usize) -> Vec<IndicatorPoint> {
    let mut ordered = history.to_vec();
    ordered.sort_by_key(|point| point.base_date);

    let closes = ordered.iter().map(|point| point.close).collect::<Vec<_>>();
    let volumes = ordered.iter().map(|point| point.volume).collect::<Vec<_>>();
    let rsi_values = rsi(&closes, period);
    let obv_values = match obv(&closes, &volumes) {
        Ok(values) => values,
        Err(_) => return Vec::new(),
    };

    ordered
        .iter()
        .zip(rsi_values)
        .zip(obv_values)
        .filter_map(|((point, rsi), obv)| {
            rsi.map(|rsi| IndicatorPoint {
                base_date: point.base_date,
                close: point.close,
                rsi,
                obv,
            })
        })
        .collect()
}
