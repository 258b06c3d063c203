//! Page arithmetic over a possibly-unknown total row count.

/// Number of pages, or `None` while the backend has not reported a total.
pub fn page_count(total: Option<u64>, page_size: u32) -> Option<u64> {
    let page_size = u64::from(page_size.max(1));
    total.map(|total| total.div_ceil(page_size))
}

/// One-based inclusive row range shown on `page`. `(0, 0)` when nothing is known to exist.
pub fn visible_range(page: u32, page_size: u32, total: Option<u64>) -> (u64, u64) {
    match total {
        None | Some(0) => (0, 0),
        Some(total) => {
            let page = u64::from(page.max(1));
            let page_size = u64::from(page_size.max(1));
            let start = (page - 1) * page_size + 1;
            let end = (page * page_size).min(total);
            (start, end)
        }
    }
}

/// With an unknown total paging stays optimistic.
pub fn has_next_page(page: u32, page_size: u32, total: Option<u64>) -> bool {
    match page_count(total, page_size) {
        Some(count) => u64::from(page) < count,
        None => true,
    }
}

pub fn has_prev_page(page: u32) -> bool {
    page > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(Some(60), 25), Some(3));
        assert_eq!(page_count(Some(50), 25), Some(2));
        assert_eq!(page_count(Some(0), 25), Some(0));
        assert_eq!(page_count(None, 25), None);
    }

    #[test]
    fn visible_range_clamps_last_page() {
        assert_eq!(visible_range(3, 25, Some(60)), (51, 60));
        assert_eq!(visible_range(1, 25, Some(60)), (1, 25));
    }

    #[test]
    fn visible_range_is_empty_without_rows() {
        assert_eq!(visible_range(1, 25, None), (0, 0));
        assert_eq!(visible_range(2, 25, Some(0)), (0, 0));
    }

    #[test]
    fn unknown_total_keeps_next_enabled() {
        assert!(has_next_page(40, 25, None));
        assert!(!has_prev_page(1));
        assert!(has_prev_page(2));
    }

    #[test]
    fn known_total_disables_next_on_last_page() {
        assert!(has_next_page(2, 25, Some(60)));
        assert!(!has_next_page(3, 25, Some(60)));
        assert!(!has_next_page(1, 25, Some(0)));
    }
}
