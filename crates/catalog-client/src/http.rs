//! reqwest transport for the catalog API
//!
//! One [`ResourceClient`] per resource shares a single connection pool.
//! Mutating requests carry the API key; reads never do.

use crate::api::CatalogApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, ConfigError};
use crate::types::{
    Category, CategoryId, CategoryPayload, Envelope, ListFilter, Product, ProductFilter, ProductId,
    ProductPayload, Resource,
};
use crate::validation::Validate;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Header carrying the API key on mutating requests
pub const API_KEY_HEADER: &str = "x-api-key";

/// Whether a method changes server state and needs the API key
#[inline]
#[must_use]
pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

struct Transport {
    http: Client,
    base_url: String,
    api_key: String,
}

impl Transport {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T, F>(&self, method: Method, path: &str, build: F) -> ApiResult<Envelope<T>>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let mut request = self.http.request(method.clone(), self.url(path));
        if is_mutating(&method) {
            request = request.header(API_KEY_HEADER, self.api_key.as_str());
        }
        let request = build(request);

        tracing::debug!(%method, path, "sending catalog request");

        let response = request.send().await.map_err(|e| {
            let err = ApiError::from_transport(&e);
            tracing::warn!(%method, path, error = %e, "catalog request failed without response");
            err
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            let err = ApiError::from_transport(&e);
            tracing::warn!(%method, path, status = status.as_u16(), error = %e, "catalog response body lost");
            err
        })?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            tracing::warn!(%method, path, status = status.as_u16(), message = %err, "catalog request rejected");
            return Err(err);
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Envelope::default());
        }

        serde_json::from_slice(&body)
            .map_err(|e| ApiError::unknown(format!("failed to decode response from /{path}: {e}")))
    }
}

/// Typed client for one resource collection
pub struct ResourceClient<R> {
    transport: Arc<Transport>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &R::LABEL)
            .field("base_url", &self.transport.base_url)
            .finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    fn item_path(id: R::Id) -> String {
        format!("{}/{}", R::COLLECTION, id)
    }

    /// List the collection in server order
    ///
    /// # Errors
    /// Any normalized [`ApiError`] except `Validation`.
    pub async fn list(&self, filter: &R::Filter) -> ApiResult<Vec<R>> {
        let query = filter.query_pairs();
        let envelope: Envelope<Vec<R>> = self
            .transport
            .send(Method::GET, R::COLLECTION, |request| {
                if query.is_empty() {
                    request
                } else {
                    request.query(&query)
                }
            })
            .await?;

        let items = envelope.data.unwrap_or_default();
        tracing::debug!(resource = R::LABEL, count = items.len(), "listed resources");
        Ok(items)
    }

    /// Fetch one resource
    ///
    /// # Errors
    /// A `Server` error with status 404 when the resource is absent.
    pub async fn get(&self, id: R::Id) -> ApiResult<R> {
        let envelope = self
            .transport
            .send(Method::GET, &Self::item_path(id), |request| request)
            .await?;
        require_data::<R>(envelope)
    }

    /// Validate and create a resource
    ///
    /// # Errors
    /// `Validation` before any request when the payload is invalid.
    pub async fn create(&self, payload: &R::Payload) -> ApiResult<R> {
        payload.validate()?;
        let envelope = self
            .transport
            .send(Method::POST, R::COLLECTION, |request| request.json(payload))
            .await?;
        let created = require_data::<R>(envelope)?;
        tracing::info!(resource = R::LABEL, id = %created.id(), "created resource");
        Ok(created)
    }

    /// Validate and replace a resource
    ///
    /// # Errors
    /// `Validation` before any request when the payload is invalid.
    pub async fn update(&self, id: R::Id, payload: &R::Payload) -> ApiResult<R> {
        payload.validate()?;
        let envelope = self
            .transport
            .send(Method::PUT, &Self::item_path(id), |request| {
                request.json(payload)
            })
            .await?;
        let updated = require_data::<R>(envelope)?;
        tracing::info!(resource = R::LABEL, %id, "updated resource");
        Ok(updated)
    }

    /// Delete a resource
    ///
    /// # Errors
    /// The server's error, as-is, when it refuses the deletion.
    pub async fn delete(&self, id: R::Id) -> ApiResult<()> {
        self.transport
            .send::<serde_json::Value, _>(Method::DELETE, &Self::item_path(id), |request| request)
            .await?;
        tracing::info!(resource = R::LABEL, %id, "deleted resource");
        Ok(())
    }
}

fn require_data<R: Resource>(envelope: Envelope<R>) -> ApiResult<R> {
    envelope
        .data
        .ok_or_else(|| ApiError::unknown(format!("{} response did not include data", R::LABEL)))
}

/// HTTP implementation of [`CatalogApi`]
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    categories: ResourceClient<Category>,
    products: ResourceClient<Product>,
}

impl HttpCatalogClient {
    /// Build a client with its own connection pool
    ///
    /// # Errors
    /// `ConfigError` if the configuration is invalid or reqwest cannot build
    /// the client.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self::with_http(http, config))
    }

    /// Build a client around an existing reqwest client
    #[must_use]
    pub fn with_http(http: Client, config: &ClientConfig) -> Self {
        let transport = Arc::new(Transport {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        });
        Self {
            categories: ResourceClient {
                transport: Arc::clone(&transport),
                _resource: PhantomData,
            },
            products: ResourceClient {
                transport,
                _resource: PhantomData,
            },
        }
    }

    /// Category collection client
    #[inline]
    #[must_use]
    pub fn categories(&self) -> &ResourceClient<Category> {
        &self.categories
    }

    /// Product collection client
    #[inline]
    #[must_use]
    pub fn products(&self) -> &ResourceClient<Product> {
        &self.products
    }

    /// Base URL requests are sent to
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.categories.transport.base_url
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.categories.list(&()).await
    }

    async fn get_category(&self, id: CategoryId) -> ApiResult<Category> {
        self.categories.get(id).await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> ApiResult<Category> {
        self.categories.create(payload).await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        payload: &CategoryPayload,
    ) -> ApiResult<Category> {
        self.categories.update(id, payload).await
    }

    async fn delete_category(&self, id: CategoryId) -> ApiResult<()> {
        self.categories.delete(id).await
    }

    async fn list_products(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>> {
        self.products.list(filter).await
    }

    async fn get_product(&self, id: ProductId) -> ApiResult<Product> {
        self.products.get(id).await
    }

    async fn create_product(&self, payload: &ProductPayload) -> ApiResult<Product> {
        self.products.create(payload).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> ApiResult<Product> {
        self.products.update(id, payload).await
    }

    async fn delete_product(&self, id: ProductId) -> ApiResult<()> {
        self.products.delete(id).await
    }
}
