// ── Product search ──
//
// Pure client-side filtering over the cached list. The server is never
// asked to filter.

use std::sync::Arc;

use crate::model::Product;

/// Products whose id, name, or description contains `term`,
/// case-insensitively. A blank term returns the full list.
pub fn filter_products(products: &[Arc<Product>], term: &str) -> Vec<Arc<Product>> {
    if term.trim().is_empty() {
        return products.to_vec();
    }

    let needle = term.to_lowercase();
    products
        .iter()
        .filter(|p| p.matches_lowercase(&needle))
        .map(Arc::clone)
        .collect()
}
