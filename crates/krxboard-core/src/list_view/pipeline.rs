//! Filter → sort → paginate over a borrowed working set.
//!
//! Every function here is pure: the input rows are never reordered or
//! modified, and the same inputs always produce the same output.

use std::cmp::Ordering;

use serde::Serialize;

use super::criteria::{ListCriteria, SortDirection, SortKey, SortSpec, PAGE_SIZE};
use crate::StockRow;

/// One page of the derived view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage {
    pub rows: Vec<StockRow>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

impl ListPage {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keeps rows matching both the text query and the grade filter, in input
/// order.
///
/// The query matches the code case-sensitively and the name
/// case-insensitively. An empty query matches everything.
pub fn filter_rows<'a>(rows: &'a [StockRow], criteria: &ListCriteria) -> Vec<&'a StockRow> {
    let query = criteria.query.as_str();
    let query_lower = query.to_lowercase();

    rows.iter()
        .filter(|row| matches_query(row, query, &query_lower))
        .filter(|row| criteria.grade_filter.admits(row.grade()))
        .collect()
}

fn matches_query(row: &StockRow, query: &str, query_lower: &str) -> bool {
    query.is_empty()
        || row.code().as_str().contains(query)
        || row.name().to_lowercase().contains(query_lower)
}

/// Stable sort on the selected column. Rows with equal keys keep their
/// relative order in both directions.
pub fn sort_rows(rows: &mut [&StockRow], sort: SortSpec) {
    let Some(key) = sort.key else {
        return;
    };

    rows.sort_by(|a, b| {
        let ordering = compare_by(key, a, b);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(key: SortKey, a: &StockRow, b: &StockRow) -> Ordering {
    match key {
        SortKey::Price => compare_f64(a.price(), b.price()),
        SortKey::Change => compare_f64(a.change(), b.change()),
        // Raw letter order: A < B < S.
        SortKey::Grade => a.grade().as_str().cmp(b.grade().as_str()),
        SortKey::InstRank => a.inst_rank().cmp(&b.inst_rank()),
        SortKey::ForeRank => a.fore_rank().cmp(&b.fore_rank()),
        SortKey::Volume => a.volume().cmp(&b.volume()),
    }
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Number of pages needed for `count` rows.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Slices one page out of the filtered, sorted rows. Page 0 is read as page 1;
/// pages past the end are empty.
pub fn paginate(rows: &[&StockRow], page: usize, page_size: usize) -> ListPage {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_count = rows.len();

    let start = (page - 1).saturating_mul(page_size).min(total_count);
    let end = start.saturating_add(page_size).min(total_count);

    ListPage {
        rows: rows[start..end].iter().map(|row| (*row).clone()).collect(),
        page,
        page_size,
        total_pages: total_pages(total_count, page_size),
        total_count,
    }
}

/// Full derivation from scratch: filter, sort, then slice `page` at
/// [`PAGE_SIZE`] rows per page.
pub fn derive_page(rows: &[StockRow], criteria: &ListCriteria, page: usize) -> ListPage {
    let mut filtered = filter_rows(rows, criteria);
    sort_rows(&mut filtered, criteria.sort);
    paginate(&filtered, page, PAGE_SIZE)
}
