//! Domain types for the stock list.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockRow`] | One ranked stock |
//! | [`RowSet`] | Working set with unique codes |
//! | [`StockCode`] | Validated exchange code |
//! | [`Grade`] | S / A / B quality bucket |
//! | [`Market`] | KOSPI / KOSDAQ |
//! | [`UtcDateTime`] | UTC timestamp used in envelopes |

mod code;
mod grade;
mod market;
mod stock_row;
mod timestamp;

pub use code::StockCode;
pub use grade::Grade;
pub use market::Market;
pub use stock_row::{RowSet, StockRow};
pub use timestamp::UtcDateTime;
