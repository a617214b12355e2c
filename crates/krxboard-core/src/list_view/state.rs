//! Stateful wrapper around the list pipeline.
//!
//! `ListView` holds the working set, the user's criteria and the current page.
//! Every criteria change resets the page to 1; every snapshot is derived from
//! scratch, so no cached view can go stale.

use serde::Serialize;
use tracing::debug;

use super::criteria::{GradeFilter, ListCriteria, SortDirection, SortKey, SortSpec, PAGE_SIZE};
use super::pagination::{page_window, PageItem};
use super::pipeline::{derive_page, filter_rows, total_pages, ListPage};
use crate::RowSet;

/// Everything needed to render the list screen once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot {
    pub page: ListPage,
    pub window: Vec<PageItem>,
    pub criteria: ListCriteria,
    /// Pager controls appear only when results overflow a single page.
    pub show_pager: bool,
    /// No row matched the criteria.
    pub empty: bool,
}

#[derive(Debug, Clone)]
pub struct ListView {
    rows: RowSet,
    criteria: ListCriteria,
    page: usize,
}

impl ListView {
    pub fn new(rows: RowSet) -> Self {
        Self::with_criteria(rows, ListCriteria::default())
    }

    pub fn with_criteria(rows: RowSet, criteria: ListCriteria) -> Self {
        Self {
            rows,
            criteria,
            page: 1,
        }
    }

    pub fn rows(&self) -> &RowSet {
        &self.rows
    }

    pub fn criteria(&self) -> &ListCriteria {
        &self.criteria
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.page = 1;
    }

    pub fn set_grade_filter(&mut self, filter: GradeFilter) {
        self.criteria.grade_filter = filter;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.criteria.sort = sort;
        self.page = 1;
    }

    /// Header-click behaviour: the active ascending column flips to
    /// descending, anything else starts ascending.
    pub fn request_sort(&mut self, key: SortKey) {
        let current = self.criteria.sort;
        let direction = if current.key == Some(key) && current.direction == SortDirection::Asc {
            current.direction.toggled()
        } else {
            SortDirection::Asc
        };
        self.set_sort(SortSpec::new(key, direction));
    }

    pub fn replace_rows(&mut self, rows: RowSet) {
        self.rows = rows;
        self.page = 1;
    }

    pub fn total_pages(&self) -> usize {
        let matched = filter_rows(self.rows.rows(), &self.criteria).len();
        total_pages(matched, PAGE_SIZE)
    }

    /// Moves to `page`, clamped into `[1, max(total_pages, 1)]`.
    pub fn go_to_page(&mut self, page: usize) {
        let last = self.total_pages().max(1);
        self.page = page.clamp(1, last);
    }

    pub fn first_page(&mut self) {
        self.page = 1;
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page.saturating_add(1));
    }

    pub fn last_page(&mut self) {
        self.go_to_page(self.total_pages());
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let page = derive_page(self.rows.rows(), &self.criteria, self.page);
        let window = page_window(page.page, page.total_pages);

        debug!(
            query = %self.criteria.query,
            grade = %self.criteria.grade_filter,
            page = page.page,
            total_pages = page.total_pages,
            total_count = page.total_count,
            "derived list snapshot"
        );

        ListSnapshot {
            show_pager: page.total_count > PAGE_SIZE,
            empty: page.total_count == 0,
            criteria: self.criteria.clone(),
            window,
            page,
        }
    }
}
