use super::{report, ProductDraft, CREATE_CATEGORY_FIRST, OPERATION_FAILED};
use crate::context::CatalogContext;
use crate::notice::Notice;
use crate::store::FetchOutcome;
use catalog_client::{
    ApiError, ApiResult, Category, FieldErrors, Product, ProductFilter, ProductId,
};

/// Label for a product whose category is unknown
pub const NO_CATEGORY: &str = "No Category";

/// Product management screen
#[derive(Debug, Clone)]
pub struct ProductView {
    context: CatalogContext,
    filter: ProductFilter,
}

impl ProductView {
    pub(crate) fn new(context: CatalogContext) -> Self {
        Self {
            context,
            filter: ProductFilter::all(),
        }
    }

    /// Session context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &CatalogContext {
        &self.context
    }

    /// Active list filter
    #[inline]
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        self.filter
    }

    /// Change the list filter; takes effect on the next refresh
    pub fn set_filter(&mut self, filter: ProductFilter) {
        self.filter = filter;
    }

    /// Load products, then the categories the form needs
    ///
    /// The two fetches run one after the other so the shared loading guard
    /// does not skip the second.
    pub async fn mount(&self) -> (FetchOutcome, FetchOutcome) {
        let store = self.context.store();
        let products = store.fetch_products(&self.filter).await;
        let categories = store.fetch_categories().await;
        (products, categories)
    }

    /// Refresh products with the active filter
    pub async fn refresh(&self) -> FetchOutcome {
        self.context.store().fetch_products(&self.filter).await
    }

    /// Cached products
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.context.store().products()
    }

    /// Cached categories, for the category selector
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.context.store().categories()
    }

    /// Whether the store is refreshing
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.context.store().is_loading()
    }

    /// Category label for a product row
    ///
    /// Prefers the embedded snapshot, then the cached category.
    #[must_use]
    pub fn category_label(&self, product: &Product) -> String {
        product
            .category_name()
            .map(str::to_string)
            .or_else(|| {
                self.context
                    .store()
                    .category(product.category_id)
                    .map(|c| c.name)
            })
            .unwrap_or_else(|| NO_CATEGORY.to_string())
    }

    /// Hint shown when the product list is empty
    #[must_use]
    pub fn empty_hint(&self) -> &'static str {
        if self.context.store().has_categories() {
            "Create your first product to get started"
        } else {
            "Please create a category first"
        }
    }

    /// Empty form for a new product
    ///
    /// Refreshes categories first so the selector matches the server.
    ///
    /// # Errors
    /// Blocked with a validation error and an error notice when no category
    /// exists after the refresh.
    pub async fn open_create(&self) -> ApiResult<ProductDraft> {
        self.refresh_categories().await;
        self.ensure_categories()?;
        Ok(ProductDraft::default())
    }

    /// Form pre-filled with a product
    ///
    /// Refreshes categories first. The product comes from the store, or
    /// from the API when it is not cached.
    ///
    /// # Errors
    /// The API failure when an uncached product cannot be fetched.
    pub async fn open_edit(&self, id: ProductId) -> ApiResult<ProductDraft> {
        self.refresh_categories().await;
        let cached = self
            .context
            .store()
            .products()
            .into_iter()
            .find(|p| p.id == id);
        let product = match cached {
            Some(product) => product,
            None => self.context.api().get_product(id).await?,
        };
        Ok(ProductDraft::from_product(&product))
    }

    /// Create (`id == None`) or update a product, then refresh products
    ///
    /// # Errors
    /// `ApiError::Validation` when no category exists or the draft is
    /// invalid, including a category missing from the store; nothing is
    /// sent. Any API failure otherwise, after the refresh.
    pub async fn submit(&self, id: Option<ProductId>, draft: &ProductDraft) -> ApiResult<Product> {
        if id.is_none() {
            self.ensure_categories()?;
        }
        let payload = draft
            .to_payload(&self.context.store().categories())
            .map_err(ApiError::Validation)?;
        let api = self.context.api();

        let result = match id {
            None => report(
                self.context.notifier(),
                api.create_product(&payload).await,
                "Product created successfully",
                OPERATION_FAILED,
            ),
            Some(id) => report(
                self.context.notifier(),
                api.update_product(id, &payload).await,
                "Product updated successfully",
                OPERATION_FAILED,
            ),
        };

        match &result {
            Ok(product) => tracing::info!(id = %product.id, name = %product.name, "product saved"),
            Err(err) => tracing::warn!(error = %err, "product save failed"),
        }

        self.refresh().await;
        result
    }

    /// Delete a product, then refresh products
    ///
    /// # Errors
    /// The API failure, after the refresh.
    pub async fn delete(&self, id: ProductId) -> ApiResult<()> {
        let result = report(
            self.context.notifier(),
            self.context.api().delete_product(id).await,
            "Product deleted successfully",
            "Failed to delete product",
        );
        if let Err(err) = &result {
            tracing::warn!(%id, error = %err, "product delete failed");
        }
        self.refresh().await;
        result
    }

    async fn refresh_categories(&self) {
        let outcome = self.context.store().fetch_categories().await;
        tracing::debug!(?outcome, "categories refreshed for product form");
    }

    fn ensure_categories(&self) -> ApiResult<()> {
        if self.context.store().has_categories() {
            return Ok(());
        }
        self.context
            .notifier()
            .notify(Notice::error(CREATE_CATEGORY_FIRST));
        Err(ApiError::Validation(FieldErrors::single(
            "categoryId",
            CREATE_CATEGORY_FIRST,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use catalog_client::{CategoryId, CategorySnapshot, MockCatalogApi, ProductPayload};
    use std::sync::Arc;

    fn category(id: u64) -> Category {
        Category {
            id: CategoryId(id),
            name: format!("Category {id}"),
            description: None,
        }
    }

    fn hammer(category_id: u64) -> Product {
        Product {
            id: ProductId(1),
            name: "Hammer".to_string(),
            price: 12.5,
            category_id: CategoryId(category_id),
            in_stock: true,
            category: None,
        }
    }

    #[tokio::test]
    async fn creation_is_blocked_without_categories() {
        let mut mock = MockCatalogApi::new();
        mock.expect_list_categories()
            .times(1)
            .returning(|| Ok(Vec::new()));
        mock.expect_create_product().never();

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let mut notices = context.notifier().subscribe();
        let view = context.product_view();

        let err = view.open_create().await.unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|e| e.get("categoryId")),
            Some(CREATE_CATEGORY_FIRST)
        );
        assert_eq!(notices.recv().await.unwrap(), Notice::error(CREATE_CATEGORY_FIRST));

        let draft = ProductDraft::new("Hammer", 12.5, CategoryId(1));
        assert!(view.submit(None, &draft).await.is_err());
        assert_eq!(view.empty_hint(), "Please create a category first");
    }

    #[tokio::test]
    async fn mount_loads_products_then_categories() {
        let mut mock = MockCatalogApi::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_list_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![hammer(1)]));
        mock.expect_list_categories()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![category(1)]));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let view = context.product_view();
        let (products, categories) = view.mount().await;

        assert_eq!(products, FetchOutcome::Refreshed { count: 1 });
        assert_eq!(categories, FetchOutcome::Refreshed { count: 1 });
        assert_eq!(view.category_label(&view.products()[0]), "Category 1");
        assert_eq!(view.empty_hint(), "Create your first product to get started");
    }

    #[tokio::test]
    async fn submit_creates_and_refreshes_with_active_filter() {
        let filter = ProductFilter::all().with_in_stock(true);

        let mut mock = MockCatalogApi::new();
        mock.expect_list_categories()
            .returning(|| Ok(vec![category(1)]));
        mock.expect_create_product()
            .withf(|p| *p == ProductPayload::new("Hammer", 12.5, CategoryId(1)))
            .times(1)
            .returning(|_| Ok(hammer(1)));
        mock.expect_list_products()
            .withf(move |f| *f == filter)
            .times(1)
            .returning(|_| Ok(vec![hammer(1)]));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        context.store().fetch_categories().await;

        let mut view = context.product_view();
        view.set_filter(filter);
        let draft = view.open_create().await.unwrap();
        assert_eq!(draft, ProductDraft::default());

        let created = view
            .submit(None, &ProductDraft::new("Hammer", 12.5, CategoryId(1)))
            .await
            .unwrap();

        assert_eq!(created.id, ProductId(1));
        assert_eq!(view.products().len(), 1);
    }

    #[tokio::test]
    async fn opening_the_form_refreshes_categories() {
        let mut mock = MockCatalogApi::new();
        mock.expect_list_categories()
            .times(1)
            .returning(|| Ok(vec![category(2)]));
        mock.expect_create_product()
            .withf(|p| p.category_id == CategoryId(2))
            .times(1)
            .returning(|_| Ok(hammer(2)));
        mock.expect_list_products()
            .returning(|_| Ok(vec![hammer(2)]));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let view = context.product_view();
        assert!(view.categories().is_empty());

        view.open_create().await.unwrap();
        assert_eq!(view.categories(), vec![category(2)]);

        let created = view
            .submit(None, &ProductDraft::new("Hammer", 12.5, CategoryId(2)))
            .await
            .unwrap();
        assert_eq!(created.category_id, CategoryId(2));
    }

    #[tokio::test]
    async fn editing_an_uncached_product_fetches_it() {
        let mut mock = MockCatalogApi::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_list_categories()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![category(1)]));
        mock.expect_get_product()
            .withf(|id| *id == ProductId(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(hammer(1)));

        let context = CatalogContext::new(Arc::new(mock), StoreConfig::default());
        let view = context.product_view();

        let draft = view.open_edit(ProductId(1)).await.unwrap();
        assert_eq!(draft, ProductDraft::from_product(&hammer(1)));
        assert_eq!(view.categories().len(), 1);
    }

    #[test]
    fn label_falls_back_to_placeholder() {
        let context = CatalogContext::new(Arc::new(MockCatalogApi::new()), StoreConfig::default());
        let view = context.product_view();

        let mut product = hammer(3);
        assert_eq!(view.category_label(&product), NO_CATEGORY);

        product.category = Some(CategorySnapshot {
            id: Some(CategoryId(3)),
            name: "Garden".to_string(),
        });
        assert_eq!(view.category_label(&product), "Garden");
    }
}
