//! Page arithmetic for the product list.
//!
//! Pages are 1-based. A list of `total` items with page size `size` has
//! `ceil(total / size)` pages (zero when empty), and page `p` shows items
//! `(p-1)*size+1 ..= min(p*size, total)`.

/// Selectable page sizes.
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 20];

/// Page size used until the user picks another.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Human-readable range label, e.g. `"11-20 de 25 resultados"`.
pub fn display_range(total: usize, page_size: usize, page: usize) -> String {
    if total == 0 {
        return "0 resultados".into();
    }
    let page_size = page_size.max(1);
    let page = page.max(1);
    let start = (page - 1) * page_size + 1;
    let end = (page * page_size).min(total);
    format!("{start}-{end} de {total} resultados")
}

/// Pagination cursor over a list of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_count(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    pub fn display_range(&self) -> String {
        display_range(self.total, self.page_size, self.page)
    }

    /// New result set: record its length and go back to page 1.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.page = 1;
    }

    /// Change the page size and go back to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Advance to the next entry in [`PAGE_SIZE_OPTIONS`], wrapping around.
    pub fn cycle_page_size(&mut self) {
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .position(|&s| s == self.page_size)
            .map_or(DEFAULT_PAGE_SIZE, |i| {
                PAGE_SIZE_OPTIONS[(i + 1) % PAGE_SIZE_OPTIONS.len()]
            });
        self.set_page_size(next);
    }

    /// Jump to `page`, clamped to the valid range. Returns whether the page moved.
    pub fn go_to(&mut self, page: usize) -> bool {
        let last = self.page_count().max(1);
        let target = page.clamp(1, last);
        let moved = target != self.page;
        self.page = target;
        moved
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to(self.page.saturating_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// The items visible on the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = ((self.page - 1) * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}
