// ── Filtering and paging over product snapshots ──
//
// Applied client-side to a snapshot, never re-querying the service.

use std::sync::Arc;

use crate::model::Product;

/// Filter predicate for product collections.
pub enum ProductFilter {
    All,
    /// Case-insensitive substring match on name, description or id.
    /// A blank term matches everything.
    Search(String),
    Custom(Box<dyn Fn(&Product) -> bool + Send + Sync>),
}

impl ProductFilter {
    /// Build a search filter, collapsing blank input to `All`.
    pub fn search(term: impl AsRef<str>) -> Self {
        let term = term.as_ref().trim();
        if term.is_empty() {
            Self::All
        } else {
            Self::Search(term.to_lowercase())
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Search(term) => {
                let term = term.to_lowercase();
                [&product.name, &product.description, &product.id]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            Self::Custom(f) => f(product),
        }
    }

    /// Filter a snapshot, preserving order.
    pub fn apply(&self, products: &[Arc<Product>]) -> Vec<Arc<Product>> {
        products
            .iter()
            .filter(|p| self.matches(p))
            .map(Arc::clone)
            .collect()
    }
}

/// Page cursor over a filtered list. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    per_page: usize,
    page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            per_page: Self::DEFAULT_PER_PAGE,
            page: 1,
        }
    }
}

impl Pagination {
    pub const DEFAULT_PER_PAGE: usize = 5;
    pub const PAGE_SIZES: [usize; 3] = [5, 10, 20];

    /// `per_page` of zero is treated as one.
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            page: 1,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Changing the page size resets to the first page.
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }

    /// At least one page, even for an empty list.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// Jump to `page`, clamped to `1..=total_pages`.
    pub fn go_to(&mut self, page: usize, total: usize) {
        self.page = page.clamp(1, self.total_pages(total));
    }

    /// Advance one page; returns `false` on the last page.
    pub fn next(&mut self, total: usize) -> bool {
        if self.page < self.total_pages(total) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; returns `false` on the first page.
    pub fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// The items visible on the current page. An out-of-range page yields
    /// an empty slice.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1).saturating_mul(self.per_page);
        let end = start.saturating_add(self.per_page).min(items.len());
        items.get(start..end).unwrap_or(&[])
    }
}
