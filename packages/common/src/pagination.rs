/// A 1-based page of a result set of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PageWindow {
    /// Missing or zero pages are treated as page 1; `per_page` is at least 1.
    pub fn new(page: Option<u64>, per_page: u64, total: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.max(1),
            total,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }

    /// True when the requested page starts after the last item.
    pub fn is_past_end(&self) -> bool {
        self.offset() >= self.total
    }
}
