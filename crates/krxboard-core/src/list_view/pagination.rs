use serde::Serialize;

/// One control in the pager strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageItem {
    Page { number: usize, active: bool },
    /// Stands in for the skipped pages around `position`.
    Ellipsis { position: usize },
}

/// Page links to show for `current` out of `total_pages`.
///
/// Always includes the first and last page and the neighbours of `current`.
/// A single ellipsis marks the gap at `current - 2` (when `current > 3`) and
/// at `current + 2` (when `current + 2 < total_pages`).
pub fn page_window(current: usize, total_pages: usize) -> Vec<PageItem> {
    let mut items = Vec::new();

    for number in 1..=total_pages {
        let near_current = number + 1 >= current && number <= current + 1;
        if number == 1 || number == total_pages || near_current {
            items.push(PageItem::Page {
                number,
                active: number == current,
            });
            continue;
        }

        let gap_before = current > 3 && number + 2 == current;
        let gap_after = number == current + 2 && current + 2 < total_pages;
        if gap_before || gap_after {
            items.push(PageItem::Ellipsis { position: number });
        }
    }

    items
}
