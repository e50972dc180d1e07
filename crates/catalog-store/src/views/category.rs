use super::{report, CategoryDraft, OPERATION_FAILED};
use crate::context::CatalogContext;
use crate::store::FetchOutcome;
use catalog_client::{ApiError, ApiResult, Category, CategoryId};

/// Category management screen
#[derive(Debug, Clone)]
pub struct CategoryView {
    context: CatalogContext,
}

impl CategoryView {
    pub(crate) fn new(context: CatalogContext) -> Self {
        Self { context }
    }

    /// Session context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &CatalogContext {
        &self.context
    }

    /// Load the categories shown by the screen
    pub async fn mount(&self) -> FetchOutcome {
        self.context.store().fetch_categories().await
    }

    /// Cached categories
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.context.store().categories()
    }

    /// Whether the store is refreshing
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.context.store().is_loading()
    }

    /// Empty form for a new category
    #[must_use]
    pub fn open_create(&self) -> CategoryDraft {
        CategoryDraft::default()
    }

    /// Form pre-filled with a cached category
    #[must_use]
    pub fn open_edit(&self, id: CategoryId) -> Option<CategoryDraft> {
        self.context
            .store()
            .category(id)
            .map(|category| CategoryDraft::from_category(&category))
    }

    /// Create (`id == None`) or update a category, then refresh
    ///
    /// # Errors
    /// `ApiError::Validation` when the draft is invalid; nothing is sent and
    /// no refresh happens. Any API failure otherwise, after the refresh.
    pub async fn submit(&self, id: Option<CategoryId>, draft: &CategoryDraft) -> ApiResult<Category> {
        let payload = draft.to_payload().map_err(ApiError::Validation)?;
        let api = self.context.api();

        let result = match id {
            None => report(
                self.context.notifier(),
                api.create_category(&payload).await,
                "Category created successfully",
                OPERATION_FAILED,
            ),
            Some(id) => report(
                self.context.notifier(),
                api.update_category(id, &payload).await,
                "Category updated successfully",
                OPERATION_FAILED,
            ),
        };

        match &result {
            Ok(category) => tracing::info!(id = %category.id, name = %category.name, "category saved"),
            Err(err) => tracing::warn!(error = %err, "category save failed"),
        }

        self.context.store().fetch_categories().await;
        result
    }

    /// Delete a category, then refresh
    ///
    /// Products referencing the category are the server's concern; its
    /// rejection is surfaced unchanged.
    ///
    /// # Errors
    /// The API failure, after the refresh.
    pub async fn delete(&self, id: CategoryId) -> ApiResult<()> {
        let result = report(
            self.context.notifier(),
            self.context.api().delete_category(id).await,
            "Category deleted successfully",
            "Failed to delete category",
        );
        if let Err(err) = &result {
            tracing::warn!(%id, error = %err, "category delete failed");
        }
        self.context.store().fetch_categories().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::notice::Notice;
    use catalog_client::{CategoryPayload, MockCatalogApi};
    use std::sync::Arc;

    fn tools(id: u64) -> Category {
        Category {
            id: CategoryId(id),
            name: "Tools".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn invalid_draft_sends_nothing() {
        let mut mock = MockCatalogApi::new();
        mock.expect_create_category().never();
        mock.expect_list_categories().never();

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let err = context
            .category_view()
            .submit(None, &CategoryDraft::new(""))
            .await
            .unwrap_err();

        assert_eq!(
            err.field_errors().and_then(|e| e.get("name")),
            Some("Category name is required")
        );
    }

    #[tokio::test]
    async fn create_notifies_and_refreshes() {
        let mut mock = MockCatalogApi::new();
        mock.expect_create_category()
            .withf(|payload| *payload == CategoryPayload::new("Tools"))
            .times(1)
            .returning(|_| Ok(tools(1)));
        mock.expect_list_categories()
            .times(1)
            .returning(|| Ok(vec![tools(1)]));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let mut notices = context.notifier().subscribe();
        let view = context.category_view();

        let created = view.submit(None, &CategoryDraft::new("Tools")).await.unwrap();

        assert_eq!(created.id, CategoryId(1));
        assert_eq!(view.categories(), vec![tools(1)]);
        assert_eq!(
            notices.recv().await.unwrap(),
            Notice::success("Category created successfully")
        );
    }

    #[tokio::test]
    async fn failed_delete_surfaces_server_message_and_still_refreshes() {
        let mut mock = MockCatalogApi::new();
        mock.expect_delete_category()
            .times(1)
            .returning(|_| Err(ApiError::server(409, "Cannot delete category with existing products")));
        mock.expect_list_categories()
            .times(1)
            .returning(|| Ok(vec![tools(1)]));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let mut notices = context.notifier().subscribe();

        let err = context
            .category_view()
            .delete(CategoryId(1))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert_eq!(
            notices.recv().await.unwrap(),
            Notice::error("Cannot delete category with existing products")
        );
        assert_eq!(context.store().categories().len(), 1);
    }

    #[tokio::test]
    async fn open_edit_uses_cached_category() {
        let mut mock = MockCatalogApi::new();
        mock.expect_list_categories()
            .returning(|| Ok(vec![tools(4)]));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let view = context.category_view();
        view.mount().await;

        assert_eq!(view.open_edit(CategoryId(4)), Some(CategoryDraft::new("Tools")));
        assert_eq!(view.open_edit(CategoryId(5)), None);
    }
}
