use serde::Serialize;

/// A request for one page of a listing. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    /// A size of zero is treated as one item per page.
    pub fn new(number: u64, size: u64) -> Self {
        Self {
            number,
            size: size.max(1),
        }
    }

    /// Number of pages needed for `total` items. An empty listing still has
    /// one (empty) page.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.size).max(1)
    }

    /// Clamp the requested number into `1..=page_count(total)`.
    pub fn clamp(self, total: u64) -> Self {
        Self {
            number: self.number.clamp(1, self.page_count(total)),
            size: self.size,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number.saturating_sub(1)).saturating_mul(self.size)
    }
}

/// One page of an ordered listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            number: request.number,
            size: request.size,
            total_items,
            total_pages: request.page_count(total_items),
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_clamps_to_last_page() {
        let request = PageRequest::new(3, 10).clamp(11);
        assert_eq!(request.number, 2);
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn test_zero_clamps_to_first_page() {
        let request = PageRequest::new(0, 10).clamp(11);
        assert_eq!(request.number, 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let request = PageRequest::new(5, 10).clamp(0);
        assert_eq!(request.number, 1);
        assert_eq!(request.page_count(0), 1);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        assert_eq!(PageRequest::new(1, 10).page_count(20), 2);
    }

    #[test]
    fn test_page_navigation_flags() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
