//! Application context
//!
//! One per session: owns the API handle, the store and the notifier, and
//! hands out views that share them.

use crate::config::StoreConfig;
use crate::notice::Notifier;
use crate::store::CatalogStore;
use crate::views::{CategoryView, ProductView};
use catalog_client::CatalogApi;
use std::fmt;
use std::sync::Arc;

/// Shared handles for one session
#[derive(Clone)]
pub struct CatalogContext {
    api: Arc<dyn CatalogApi>,
    store: Arc<CatalogStore>,
    notifier: Notifier,
}

impl fmt::Debug for CatalogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogContext")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl CatalogContext {
    /// Build a context around an API implementation
    #[must_use]
    pub fn new(api: Arc<dyn CatalogApi>, config: StoreConfig) -> Self {
        let notifier = Notifier::new(config.notice_capacity);
        let store = Arc::new(CatalogStore::new(Arc::clone(&api), notifier.clone(), config));
        tracing::debug!(?config, "catalog context created");
        Self {
            api,
            store,
            notifier,
        }
    }

    /// API used for mutations
    #[inline]
    #[must_use]
    pub fn api(&self) -> &Arc<dyn CatalogApi> {
        &self.api
    }

    /// Shared store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Shared notifier
    #[inline]
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Category management view
    #[must_use]
    pub fn category_view(&self) -> CategoryView {
        CategoryView::new(self.clone())
    }

    /// Product management view
    #[must_use]
    pub fn product_view(&self) -> ProductView {
        ProductView::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_client::MockCatalogApi;

    #[tokio::test]
    async fn views_share_one_store() {
        let mut mock = MockCatalogApi::new();
        mock.expect_list_categories()
            .times(1)
            .returning(|| Ok(Vec::new()));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let categories = context.category_view();
        let products = context.product_view();

        categories.mount().await;

        assert!(Arc::ptr_eq(categories.context().store(), products.context().store()));
        assert_eq!(context.store().snapshot().revision, 2);
    }
}
