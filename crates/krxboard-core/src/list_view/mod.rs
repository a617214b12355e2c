//! Search, grade filter, sort and pagination for the stock list screen.

mod criteria;
mod pagination;
mod pipeline;
mod state;

pub use criteria::{GradeFilter, ListCriteria, SortDirection, SortKey, SortSpec, PAGE_SIZE};
pub use pagination::{page_window, PageItem};
pub use pipeline::{derive_page, filter_rows, paginate, sort_rows, total_pages, ListPage};
pub use state::{ListSnapshot, ListView};
