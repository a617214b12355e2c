//! Command-line interface for krxboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | Search, filter, sort and page through stock rows |
//! | `import` | Copy rows from a generator provider into the warehouse |
//! | `net-buys` | Show a stored investor net-buy ranking |
//! | `indicators` | RSI-14 and OBV over a sample price history |
//! | `sources` | List row providers and their health |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Fail on warnings or errors |
//! | `--source` | `sample` | Row provider |
//! | `--seed` | `42` | Seed for the sample provider |
//!
//! # Examples
//!
//! ```bash
//! krxboard list --query 삼성 --grade S --format table
//! krxboard list --sort change --desc --page 2
//! krxboard import && krxboard --source warehouse list --market kosdaq
//! krxboard import --date 20250404 && krxboard net-buys --date 20250404 --investor foreign
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use krxboard_core::ProviderId;

/// Stock list browser for KOSPI/KOSDAQ rows.
#[derive(Debug, Parser)]
#[command(name = "krxboard", author, version, about = "Stock list browser")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Provider the working set is loaded from.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Sample)]
    pub source: SourceSelector,

    /// Seed for generated sample rows.
    #[arg(long, global = true, default_value_t = 42)]
    pub seed: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON events.
    Ndjson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Seeded placeholder rows.
    Sample,
    /// The five dashboard headline rows.
    Featured,
    /// Rows previously imported into the local warehouse.
    Warehouse,
}

impl SourceSelector {
    pub const fn provider_id(self) -> ProviderId {
        match self {
            Self::Sample => ProviderId::Sample,
            Self::Featured => ProviderId::Featured,
            Self::Warehouse => ProviderId::Warehouse,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one page of the stock list.
    ///
    ///   krxboard list
    ///   krxboard list --query 005930
    ///   krxboard list --grade S --sort volume --desc
    List(ListArgs),

    /// Store generated rows in the local DuckDB warehouse.
    ///
    ///   krxboard import --count 200
    ///   krxboard import --from featured --date 20250404
    Import(ImportArgs),

    /// Show the stored net-buy ranking for one trade date and investor type.
    NetBuys(NetBuysArgs),

    /// Compute RSI-14 and OBV over a seeded daily price history.
    Indicators(IndicatorsArgs),

    /// List row providers and their health.
    Sources,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Substring matched against the code (exact case) or name (any case).
    #[arg(long, default_value = "")]
    pub query: String,

    /// Grade filter: all, S, A or B.
    #[arg(long, default_value = "all")]
    pub grade: String,

    /// Sort column: price, change, grade, inst_rank, fore_rank or volume.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending.
    #[arg(long, default_value_t = false)]
    pub desc: bool,

    /// 1-based page number; clamped to the available pages.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Restrict the working set to one market (kospi or kosdaq).
    #[arg(long)]
    pub market: Option<String>,

    /// Maximum rows loaded from the provider.
    #[arg(long, default_value_t = 1_000)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Generator provider to copy rows from.
    #[arg(long, value_enum, default_value_t = ImportSource::Sample)]
    pub from: ImportSource,

    /// Number of sample rows to generate (1 to 1000).
    #[arg(long, default_value_t = 50)]
    pub count: usize,

    /// Trade date (YYYYMMDD). Generates investor net buying for that day,
    /// ranks it and stores the rankings alongside the rows.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct NetBuysArgs {
    /// Trade date (YYYYMMDD).
    #[arg(long)]
    pub date: String,

    /// Investor type: institution (7050) or foreign (9000).
    #[arg(long, default_value = "institution")]
    pub investor: String,
}

#[derive(Debug, Args)]
pub struct IndicatorsArgs {
    /// Last trade date (YYYYMMDD) of the history.
    #[arg(long)]
    pub date: String,

    /// Number of weekdays in the history, including warm-up days.
    #[arg(long, default_value_t = 30)]
    pub days: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportSource {
    Sample,
    Featured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_defaults() {
        let cli = Cli::try_parse_from(["krxboard", "list"]).expect("parse");
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.source, SourceSelector::Sample);
        assert_eq!(cli.seed, 42);
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.page, 1);
        assert_eq!(args.grade, "all");
        assert!(args.sort.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "krxboard", "list", "--sort", "change", "--desc", "--source", "featured",
            "--format", "table",
        ])
        .expect("parse");
        assert_eq!(cli.source, SourceSelector::Featured);
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn net_buys_defaults_to_institution() {
        let cli = Cli::try_parse_from(["krxboard", "net-buys", "--date", "20250404"])
            .expect("parse");
        let Command::NetBuys(args) = cli.command else {
            panic!("expected net-buys command");
        };
        assert_eq!(args.date, "20250404");
        assert_eq!(args.investor, "institution");
    }

    #[test]
    fn import_date_is_optional() {
        let cli = Cli::try_parse_from(["krxboard", "import", "--count", "10"]).expect("parse");
        let Command::Import(args) = cli.command else {
            panic!("expected import command");
        };
        assert_eq!(args.count, 10);
        assert!(args.date.is_none());
    }

    #[test]
    fn rejects_unknown_source() {
        assert!(Cli::try_parse_from(["krxboard", "--source", "yahoo", "list"]).is_err());
    }
}
