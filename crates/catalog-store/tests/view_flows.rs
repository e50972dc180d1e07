//! Category and product screens against the in-memory API

use catalog_client::{CatalogApi, CategoryId, CategoryPayload, ProductFilter};
use catalog_store::views::{CREATE_CATEGORY_FIRST, UNKNOWN_CATEGORY};
use catalog_store::{CatalogContext, CategoryDraft, Notice, ProductDraft, Severity, StoreConfig};
use catalog_test_utils::{CatalogBackend, InMemoryCatalog, Operation, CATEGORY_IN_USE};
use proptest::prelude::*;
use std::sync::Arc;

fn context(api: &Arc<InMemoryCatalog>) -> CatalogContext {
    let api: Arc<dyn CatalogApi> = api.clone();
    CatalogContext::new(api, StoreConfig::default())
}

#[tokio::test]
async fn empty_catalog_blocks_product_creation() {
    let api = Arc::new(InMemoryCatalog::new());
    let context = context(&api);
    let mut notices = context.notifier().subscribe();
    let products = context.product_view();

    products.mount().await;
    assert!(products.open_create().await.is_err());
    let result = products
        .submit(None, &ProductDraft::new("Hammer", 3.0, CategoryId(1)))
        .await;

    assert!(result.is_err());
    assert_eq!(api.calls(Operation::CreateProduct), 0);
    assert_eq!(notices.recv().await.unwrap(), Notice::error(CREATE_CATEGORY_FIRST));
}

#[tokio::test]
async fn product_form_sees_categories_created_elsewhere() {
    let api = Arc::new(InMemoryCatalog::with_backend(CatalogBackend::with_categories(&["Tools"])));
    let context = context(&api);
    let products = context.product_view();
    products.mount().await;

    let garden = api
        .with_data(|backend| backend.create_category(&CategoryPayload::new("Garden")))
        .unwrap();
    assert_eq!(products.categories().len(), 1);

    let mut draft = products.open_create().await.unwrap();
    draft.name = "Rake".to_string();
    draft.price = Some(9.0);
    draft.category_id = Some(garden.id);
    let rake = products.submit(None, &draft).await.unwrap();

    assert_eq!(rake.category_id, garden.id);
    assert_eq!(products.categories().len(), 2);
}

#[tokio::test]
async fn product_with_unknown_category_is_rejected_locally() {
    let api = Arc::new(InMemoryCatalog::with_backend(CatalogBackend::with_categories(&["Tools"])));
    let context = context(&api);
    let products = context.product_view();
    products.mount().await;

    let err = products
        .submit(None, &ProductDraft::new("Hammer", 3.0, CategoryId(2)))
        .await
        .unwrap_err();

    assert_eq!(
        err.field_errors().and_then(|e| e.get("categoryId")),
        Some(UNKNOWN_CATEGORY)
    );
    assert_eq!(api.mutation_calls(), 0);
}

#[tokio::test]
async fn deleting_a_referenced_category_shows_server_message() {
    let api = Arc::new(InMemoryCatalog::with_backend(CatalogBackend::with_categories(&["Tools"])));
    let context = context(&api);
    let categories = context.category_view();
    let products = context.product_view();

    products.mount().await;
    products
        .submit(None, &ProductDraft::new("Hammer", 3.0, CategoryId(1)))
        .await
        .unwrap();

    let mut notices = context.notifier().subscribe();
    let err = categories.delete(CategoryId(1)).await.unwrap_err();

    assert_eq!(err.message(), CATEGORY_IN_USE);
    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(notice.message, CATEGORY_IN_USE);
    assert_eq!(categories.categories().len(), 1);
}

#[tokio::test]
async fn failed_mutation_still_refreshes() {
    let api = Arc::new(InMemoryCatalog::with_backend(CatalogBackend::with_categories(&["Tools"])));
    let context = context(&api);
    let categories = context.category_view();

    categories.mount().await;
    api.fail_next(
        Operation::UpdateCategory,
        catalog_client::ApiError::server(500, "database offline"),
    );

    let result = categories
        .submit(Some(CategoryId(1)), &CategoryDraft::new("Hardware"))
        .await;

    assert!(result.is_err());
    assert_eq!(api.calls(Operation::ListCategories), 2);
    assert_eq!(categories.categories()[0].name, "Tools");
}

#[tokio::test]
async fn edit_round_trip_updates_product() {
    let api = Arc::new(InMemoryCatalog::with_backend(CatalogBackend::with_categories(&[
        "Tools", "Garden",
    ])));
    let context = context(&api);
    let products = context.product_view();
    products.mount().await;

    let hammer = products
        .submit(None, &ProductDraft::new("Hammer", 3.0, CategoryId(1)))
        .await
        .unwrap();

    let mut draft = products.open_edit(hammer.id).await.unwrap();
    draft.category_id = Some(CategoryId(2));
    draft.in_stock = false;
    products.submit(Some(hammer.id), &draft).await.unwrap();

    let listed = products.products();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category_id, CategoryId(2));
    assert!(!listed[0].in_stock);
    assert_eq!(products.category_label(&listed[0]), "Garden");

    products.delete(hammer.id).await.unwrap();
    assert!(products.products().is_empty());
    assert_eq!(
        api.with_data(|backend| backend.list_products(&ProductFilter::all()).len()),
        0
    );
}

#[tokio::test]
async fn tools_round_trip_has_distinct_id() {
    let api = Arc::new(InMemoryCatalog::with_backend(CatalogBackend::with_categories(&[
        "Garden", "Food",
    ])));
    let context = context(&api);
    let categories = context.category_view();
    categories.mount().await;
    let prior: Vec<_> = categories.categories().into_iter().map(|c| c.id).collect();

    let tools = categories
        .submit(None, &CategoryDraft::new("Tools").with_description(""))
        .await
        .unwrap();

    let fetched: Vec<_> = categories
        .categories()
        .into_iter()
        .filter(|c| c.id == tools.id)
        .collect();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].name, "Tools");
    assert!(!prior.contains(&tools.id));
}

proptest! {
    #[test]
    fn created_category_appears_exactly_once(
        name in "[A-Za-z][A-Za-z0-9 ]{0,38}[A-Za-z0-9]",
        description in "[a-z ]{0,500}",
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (created, listed) = runtime.block_on(async {
            let api = Arc::new(InMemoryCatalog::with_backend(CatalogBackend::with_categories(&[
                "Existing",
            ])));
            let context = context(&api);
            let view = context.category_view();

            let draft = CategoryDraft::new(name.clone()).with_description(description.clone());
            let created = view.submit(None, &draft).await.unwrap();
            (created, view.categories())
        });

        let matches = listed.iter().filter(|c| c.id == created.id).count();
        prop_assert_eq!(matches, 1);
        prop_assert_eq!(created.name.as_str(), name.trim());
    }
}
