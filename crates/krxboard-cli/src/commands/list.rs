use std::str::FromStr;

use krxboard_core::{
    EnvelopeError, GradeFilter, ListCriteria, ListView, LoadRequest, Market, RowSet,
    SortDirection, SortKey, SortSpec, StockRowProvider,
};

use crate::cli::ListArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &ListArgs, provider: &dyn StockRowProvider) -> Result<CommandResult, CliError> {
    let grade_filter = GradeFilter::from_str(&args.grade)?;
    let market = args.market.as_deref().map(Market::from_str).transpose()?;
    let request =
        LoadRequest::new(args.limit, market).map_err(|error| CliError::Command(error.to_string()))?;

    let mut warnings = Vec::new();
    let sort = match resolve_sort(args.sort.as_deref(), args.desc) {
        Ok(sort) => sort,
        Err(unknown) => {
            warnings.push(format!(
                "unknown sort key '{unknown}'; rows keep provider order"
            ));
            SortSpec::unsorted()
        }
    };

    let source = provider.id();
    let (rows, load_error) = match provider.load(&request) {
        Ok(rows) => (rows, None),
        Err(error) => {
            tracing::warn!(%source, %error, "provider failed to load rows");
            (RowSet::default(), Some(EnvelopeError::from_source(&error, source)))
        }
    };

    let criteria = ListCriteria {
        query: args.query.clone(),
        grade_filter,
        sort,
    };
    let mut view = ListView::with_criteria(rows, criteria);
    view.go_to_page(args.page);
    if view.page() != args.page {
        warnings.push(format!(
            "page {} is out of range; showing page {}",
            args.page,
            view.page()
        ));
    }

    let data = serde_json::to_value(view.snapshot())?;
    let mut result = CommandResult::ok(data, vec![source]).with_warnings(warnings);
    if let Some(error) = load_error {
        result = result.with_error(error);
    }
    Ok(result)
}

/// Resolves `--sort`/`--desc`. Without `--sort` the list is ranked by
/// `inst_rank`; an unrecognised key is handed back to the caller.
fn resolve_sort(key: Option<&str>, desc: bool) -> Result<SortSpec, String> {
    let direction = if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };

    match key {
        None => Ok(SortSpec::new(SortKey::InstRank, direction)),
        Some(raw) => SortKey::parse(raw)
            .map(|key| SortSpec::new(key, direction))
            .ok_or_else(|| raw.to_owned()),
    }
}
