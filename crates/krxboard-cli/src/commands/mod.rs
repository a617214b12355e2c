mod import;
mod indicators;
mod list;
mod net_buys;
mod sources;

use std::time::Instant;

use krxboard_core::{
    Envelope, EnvelopeError, EnvelopeMeta, FeaturedProvider, ProviderId, SampleProvider,
    StockRowProvider, Warehouse, WarehouseProvider,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            source_chain,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }
}

pub fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();

    tracing::debug!(%request_id, command = ?cli.command, "running command");

    let CommandResult {
        data,
        warnings,
        errors,
        source_chain,
    } = match &cli.command {
        Command::List(args) => {
            let provider = build_provider(cli.source.provider_id(), cli.seed)?;
            list::run(args, provider.as_ref())?
        }
        Command::Import(args) => {
            let warehouse = Warehouse::open_default()?;
            import::run(args, cli.seed, &request_id, &warehouse)?
        }
        Command::NetBuys(args) => {
            let warehouse = Warehouse::open_default()?;
            net_buys::run(args, &warehouse)?
        }
        Command::Indicators(args) => indicators::run(args, cli.seed)?,
        Command::Sources => sources::run(cli.seed)?,
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(request_id, source_chain, latency_ms)?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Instantiates the provider behind `id`. The warehouse provider opens the
/// default warehouse location.
pub fn build_provider(id: ProviderId, seed: u64) -> Result<Box<dyn StockRowProvider>, CliError> {
    let provider: Box<dyn StockRowProvider> = match id {
        ProviderId::Sample => Box::new(SampleProvider::with_seed(seed)),
        ProviderId::Featured => Box::new(FeaturedProvider),
        ProviderId::Warehouse => Box::new(WarehouseProvider::new(Warehouse::open_default()?)),
    };
    Ok(provider)
}
