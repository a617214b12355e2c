//! Core contracts for krxboard.
//!
//! This crate contains:
//! - Validated stock rows and the working-set container
//! - The list view pipeline (search, grade filter, sort, pagination)
//! - Row providers and their identifiers
//! - Response envelope and structured errors
//! - Investor net-buy rankings and daily price indicators

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod indicators;
pub mod list_view;
pub mod ranking;
pub mod source;

pub use adapters::{FeaturedProvider, SampleProvider, WarehouseProvider};
pub use data_source::{
    HealthState, HealthStatus, LoadRequest, SourceError, SourceErrorKind, StockRowProvider,
};
pub use domain::{Grade, Market, RowSet, StockCode, StockRow, UtcDateTime};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, ValidationError};
pub use indicators::{indicator_points, IndicatorPoint, PricePoint, RSI_PERIOD};
pub use krxboard_warehouse::{
    IngestReport, NetBuyRecord, StockRecord, Warehouse, WarehouseConfig, WarehouseError,
};
pub use list_view::{
    GradeFilter, ListCriteria, ListPage, ListSnapshot, ListView, PageItem, SortDirection,
    SortKey, SortSpec, PAGE_SIZE,
};
pub use ranking::{
    apply_investor_ranks, rank_net_buys, InvestorType, NetBuy, RankedNetBuy, TradeDate,
};
pub use source::ProviderId;
