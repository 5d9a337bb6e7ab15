// ── Product list cache ──
//
// A single owned slot holding the most recently fetched product list.
// Every fetch replaces it wholesale; subscribers see each replacement.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Product;
use crate::search::filter_products;
use crate::stream::{ProductSnapshot, ProductStream};

/// Last-write-wins cache of the product list.
///
/// Writes go through [`replace`](Self::replace) only. Readers take cheap
/// `Arc` snapshots or subscribe for push-based change notification.
pub struct ProductStore {
    snapshot: watch::Sender<ProductSnapshot>,
}

impl Default for ProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Replace the whole list, keeping the server's order.
    pub fn replace(&self, products: Vec<Product>) {
        let values: Vec<Arc<Product>> = products.into_iter().map(Arc::new).collect();
        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(Arc::new(values));
    }

    // ── Readers ──────────────────────────────────────────────────────

    /// Current list (cheap `Arc` clone).
    pub fn snapshot(&self) -> ProductSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Read-only subscription to list replacements.
    pub fn subscribe(&self) -> ProductStream {
        ProductStream::new(self.snapshot.subscribe())
    }

    /// Look up a product in the last fetched list.
    pub fn get(&self, id: &str) -> Option<Arc<Product>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .map(Arc::clone)
    }

    /// Filter the last fetched list by `term`.
    pub fn search(&self, term: &str) -> Vec<Arc<Product>> {
        filter_products(&self.snapshot(), term)
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            description: format!("{name} description"),
            logo: "logo.png".into(),
            date_release: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            date_revision: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    #[test]
    fn starts_empty() {
        let store = ProductStore::new();
        assert!(store.is_empty());
    }

    #[test]
    fn replace_is_full_and_ordered() {
        let store = ProductStore::new();
        store.replace(vec![product("b", "Beta"), product("a", "Alpha")]);
        store.replace(vec![product("c", "Gamma"), product("a", "Alpha")]);

        let ids: Vec<_> = store.snapshot().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, ["c", "a"]);
        assert!(store.get("b").is_none());
    }

    #[test]
    fn get_by_id() {
        let store = ProductStore::new();
        store.replace(vec![product("abc", "Cuenta")]);
        assert_eq!(store.get("abc").unwrap().name, "Cuenta");
        assert!(store.get("ABC").is_none());
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let store = ProductStore::new();
        let mut stream = store.subscribe();
        assert!(stream.current().is_empty());

        store.replace(vec![product("abc", "Cuenta")]);
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(stream.current().len(), 1);
        assert_eq!(stream.latest().len(), 1);
    }

    #[tokio::test]
    async fn into_stream_yields_current_then_updates() {
        use futures::StreamExt;

        let store = ProductStore::new();
        store.replace(vec![product("a", "Alpha")]);
        let mut stream = store.subscribe().into_stream();

        assert_eq!(stream.next().await.unwrap().len(), 1);
        store.replace(vec![product("a", "Alpha"), product("b", "Beta")]);
        assert_eq!(stream.next().await.unwrap().len(), 2);
    }
}
