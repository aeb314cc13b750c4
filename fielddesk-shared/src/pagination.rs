/// Fixed-size pagination windows
///
/// Every paginated listing in FieldDesk uses the same page size and the
/// same clamping rules: page numbers are 1-based, an empty result set
/// still has one (empty) page, and out-of-range requests are clamped
/// into range instead of erroring. Handlers compute the window after
/// counting matching rows, then apply `LIMIT`/`OFFSET` from it.

/// Rows per page for every paginated listing
pub const PAGE_SIZE: i64 = 10;

/// A resolved pagination window
///
/// Produced by [`window`]; `page` is the clamped page actually served,
/// which may differ from the page the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The 1-based page being served (after clamping)
    pub page: i64,

    /// Total number of pages (at least 1, even for zero rows)
    pub total_pages: i64,

    /// Rows to skip (`OFFSET`)
    pub offset: i64,

    /// Rows to fetch (`LIMIT`)
    pub limit: i64,
}

/// Resolves a requested page number against a total row count
///
/// The page count is `ceil(total / PAGE_SIZE)` with a floor of one page,
/// and the requested page is clamped into `1..=total_pages`. Zero and
/// negative requests land on page 1; requests past the end land on the
/// last page.
pub fn window(requested: i64, total: i64) -> PageWindow {
    let total_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
    let page = requested.clamp(1, total_pages);

    PageWindow {
        page,
        total_pages,
        offset: (page - 1) * PAGE_SIZE,
        limit: PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_set_has_one_page() {
        let w = window(1, 0);
        assert_eq!(w.page, 1);
        assert_eq!(w.total_pages, 1);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let w = window(2, 20);
        assert_eq!(w.total_pages, 2);
        assert_eq!(w.page, 2);
        assert_eq!(w.offset, 10);
    }

    #[test]
    fn test_partial_last_page() {
        // 23 rows split into pages of 10/10/3
        let w = window(3, 23);
        assert_eq!(w.total_pages, 3);
        assert_eq!(w.page, 3);
        assert_eq!(w.offset, 20);
        assert_eq!(w.limit, PAGE_SIZE);
    }

    #[test]
    fn test_clamps_past_the_end() {
        let w = window(99, 23);
        assert_eq!(w.page, 3);
        assert_eq!(w.offset, 20);
    }

    #[test]
    fn test_clamps_zero_and_negative_to_first_page() {
        assert_eq!(window(0, 45).page, 1);
        assert_eq!(window(-5, 45).page, 1);
        assert_eq!(window(0, 45).offset, 0);
    }

    #[test]
    fn test_single_row() {
        let w = window(1, 1);
        assert_eq!(w.total_pages, 1);
        assert_eq!(w.offset, 0);
    }
}
