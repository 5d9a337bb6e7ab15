// ── Product list view state ──
//
// Loading state, search term, filtered result and pagination for the
// list page. Pure state: fetching and debouncing live with the owner.

use std::sync::Arc;

use crate::model::Product;
use crate::pagination::Pagination;
use crate::search::filter_products;
use crate::stream::ProductSnapshot;

/// Where the list is in its load cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Load failed with a user-facing message. Retrying is allowed.
    Errored(String),
}

/// Everything the list page shows.
#[derive(Debug, Clone)]
pub struct ProductList {
    state: ListState,
    products: ProductSnapshot,
    search_term: String,
    filtered: Vec<Arc<Product>>,
    pagination: Pagination,
}

impl Default for ProductList {
    fn default() -> Self {
        Self::new(crate::pagination::DEFAULT_PAGE_SIZE)
    }
}

impl ProductList {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: ListState::Idle,
            products: Arc::new(Vec::new()),
            search_term: String::new(),
            filtered: Vec::new(),
            pagination: Pagination::new(page_size),
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ListState::Loading
    }

    pub fn begin_loading(&mut self) {
        self.state = ListState::Loading;
    }

    /// Record a failed load. The previous list stays visible.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = ListState::Errored(message.into());
    }

    /// A fresh list arrived. Re-applies the current search term.
    pub fn set_products(&mut self, products: ProductSnapshot) {
        self.products = products;
        self.state = ListState::Loaded;
        self.refilter();
    }

    /// Apply a settled search term and go back to page 1.
    pub fn apply_search(&mut self, term: &str) {
        term.clone_into(&mut self.search_term);
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter_products(&self.products, &self.search_term);
        self.pagination.set_total(self.filtered.len());
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// All products matching the search term.
    pub fn filtered(&self) -> &[Arc<Product>] {
        &self.filtered
    }

    /// Products on the current page.
    pub fn page_items(&self) -> &[Arc<Product>] {
        self.pagination.slice(&self.filtered)
    }

    pub fn total(&self) -> usize {
        self.filtered.len()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn display_range(&self) -> String {
        self.pagination.display_range()
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pagination.set_page_size(page_size);
    }

    pub fn cycle_page_size(&mut self) {
        self.pagination.cycle_page_size();
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev_page()
    }

    /// Jump to a 1-based page, clamped to the valid range.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.pagination.go_to(page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn snapshot(n: usize) -> ProductSnapshot {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let revision = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        Arc::new(
            (1..=n)
                .map(|i| {
                    Arc::new(Product {
                        id: format!("prd-{i}"),
                        name: if i % 2 == 0 { format!("Cuenta {i}") } else { format!("Tarjeta {i}") },
                        description: "Producto financiero".into(),
                        logo: "logo.png".into(),
                        date_release: date,
                        date_revision: revision,
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn load_cycle() {
        let mut list = ProductList::default();
        assert_eq!(list.state(), &ListState::Idle);
        list.begin_loading();
        assert!(list.is_loading());
        list.fail("No se pudo conectar con el servidor. Verifica tu conexión.");
        assert!(matches!(list.state(), ListState::Errored(_)));
        list.begin_loading();
        list.set_products(snapshot(7));
        assert_eq!(list.state(), &ListState::Loaded);
        assert_eq!(list.page_items().len(), 5);
        assert_eq!(list.display_range(), "1-5 de 7 resultados");
    }

    #[test]
    fn search_resets_page() {
        let mut list = ProductList::new(5);
        list.set_products(snapshot(20));
        assert!(list.next_page());
        assert_eq!(list.pagination().page(), 2);

        list.apply_search("cuenta");
        assert_eq!(list.pagination().page(), 1);
        assert_eq!(list.total(), 10);
        assert!(list.page_items().iter().all(|p| p.name.starts_with("Cuenta")));
    }

    #[test]
    fn refresh_keeps_search_term() {
        let mut list = ProductList::new(10);
        list.set_products(snapshot(4));
        list.apply_search("tarjeta");
        list.set_products(snapshot(6));
        assert_eq!(list.search_term(), "tarjeta");
        assert_eq!(list.total(), 3);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut list = ProductList::new(5);
        list.set_products(snapshot(12));
        list.next_page();
        list.cycle_page_size();
        assert_eq!(list.pagination().page_size(), 10);
        assert_eq!(list.pagination().page(), 1);
        list.set_page_size(20);
        assert_eq!(list.page_items().len(), 12);
    }

    #[test]
    fn empty_result() {
        let mut list = ProductList::new(5);
        list.set_products(snapshot(3));
        list.apply_search("hipoteca");
        assert!(list.page_items().is_empty());
        assert_eq!(list.display_range(), "0 resultados");
    }
}
