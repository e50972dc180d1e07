//! The catalog API seam
//!
//! The store and the views depend on [`CatalogApi`] rather than on the HTTP
//! client, so tests can substitute an in-memory double or a mock.

use crate::error::ApiResult;
use crate::types::{
    Category, CategoryId, CategoryPayload, Product, ProductFilter, ProductId, ProductPayload,
};
use async_trait::async_trait;

/// Operations offered by the remote catalog
///
/// Implementations validate create/update payloads before sending and
/// surface exactly one normalized error per failed call.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /categories`
    async fn list_categories(&self) -> ApiResult<Vec<Category>>;

    /// `GET /categories/{id}`
    async fn get_category(&self, id: CategoryId) -> ApiResult<Category>;

    /// `POST /categories`
    async fn create_category(&self, payload: &CategoryPayload) -> ApiResult<Category>;

    /// `PUT /categories/{id}`
    async fn update_category(
        &self,
        id: CategoryId,
        payload: &CategoryPayload,
    ) -> ApiResult<Category>;

    /// `DELETE /categories/{id}`
    async fn delete_category(&self, id: CategoryId) -> ApiResult<()>;

    /// `GET /products` with optional query constraints
    async fn list_products(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>>;

    /// `GET /products/{id}`
    async fn get_product(&self, id: ProductId) -> ApiResult<Product>;

    /// `POST /products`
    async fn create_product(&self, payload: &ProductPayload) -> ApiResult<Product>;

    /// `PUT /products/{id}`
    async fn update_product(&self, id: ProductId, payload: &ProductPayload)
        -> ApiResult<Product>;

    /// `DELETE /products/{id}`
    async fn delete_product(&self, id: ProductId) -> ApiResult<()>;
}
