//! In-process `CatalogApi` double
//!
//! Counts calls per operation, fails queued calls on demand and can hold
//! list calls open so tests can observe a fetch in flight.

use crate::backend::CatalogBackend;
use async_trait::async_trait;
use catalog_client::{
    ApiError, ApiResult, CatalogApi, Category, CategoryId, CategoryPayload, Product,
    ProductFilter, ProductId, ProductPayload,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tokio::sync::watch;

/// `CatalogApi` operations, for counting and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListCategories,
    GetCategory,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    ListProducts,
    GetProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
}

impl Operation {
    fn is_list(self) -> bool {
        matches!(self, Self::ListCategories | Self::ListProducts)
    }
}

/// In-memory catalog API
#[derive(Debug)]
pub struct InMemoryCatalog {
    backend: Mutex<CatalogBackend>,
    calls: Mutex<HashMap<Operation, usize>>,
    faults: Mutex<HashMap<Operation, VecDeque<ApiError>>>,
    lists_paused: watch::Sender<bool>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::with_backend(CatalogBackend::new())
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: CatalogBackend) -> Self {
        let (lists_paused, _) = watch::channel(false);
        Self {
            backend: Mutex::new(backend),
            calls: Mutex::new(HashMap::new()),
            faults: Mutex::new(HashMap::new()),
            lists_paused,
        }
    }

    /// Number of times `op` was invoked
    pub fn calls(&self, op: Operation) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    /// Invocations of every mutating operation
    pub fn mutation_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(op, _)| {
                !op.is_list() && !matches!(op, Operation::GetCategory | Operation::GetProduct)
            })
            .map(|(_, n)| n)
            .sum()
    }

    /// Fail the next invocation of `op` with `error`
    pub fn fail_next(&self, op: Operation, error: ApiError) {
        self.faults.lock().entry(op).or_default().push_back(error);
    }

    /// Hold every list call open until [`resume_lists`](Self::resume_lists)
    pub fn pause_lists(&self) {
        self.lists_paused.send_replace(true);
    }

    pub fn resume_lists(&self) {
        self.lists_paused.send_replace(false);
    }

    /// Wait until `op` has been invoked at least `n` times
    pub async fn wait_for_calls(&self, op: Operation, n: usize) {
        while self.calls(op) < n {
            tokio::task::yield_now().await;
        }
    }

    /// Direct access to the stored data
    pub fn with_data<T>(&self, f: impl FnOnce(&mut CatalogBackend) -> T) -> T {
        f(&mut self.backend.lock())
    }

    async fn enter(&self, op: Operation) -> ApiResult<()> {
        *self.calls.lock().entry(op).or_default() += 1;

        if op.is_list() {
            let mut paused = self.lists_paused.subscribe();
            loop {
                let still_paused = *paused.borrow_and_update();
                if !still_paused || paused.changed().await.is_err() {
                    break;
                }
            }
        }

        let fault = self.faults.lock().get_mut(&op).and_then(VecDeque::pop_front);
        fault.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.enter(Operation::ListCategories).await?;
        Ok(self.backend.lock().list_categories())
    }

    async fn get_category(&self, id: CategoryId) -> ApiResult<Category> {
        self.enter(Operation::GetCategory).await?;
        self.backend.lock().get_category(id)
    }

    async fn create_category(&self, payload: &CategoryPayload) -> ApiResult<Category> {
        self.enter(Operation::CreateCategory).await?;
        self.backend.lock().create_category(payload)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        payload: &CategoryPayload,
    ) -> ApiResult<Category> {
        self.enter(Operation::UpdateCategory).await?;
        self.backend.lock().update_category(id, payload)
    }

    async fn delete_category(&self, id: CategoryId) -> ApiResult<()> {
        self.enter(Operation::DeleteCategory).await?;
        self.backend.lock().delete_category(id)
    }

    async fn list_products(&self, filter: &ProductFilter) -> ApiResult<Vec<Product>> {
        self.enter(Operation::ListProducts).await?;
        Ok(self.backend.lock().list_products(filter))
    }

    async fn get_product(&self, id: ProductId) -> ApiResult<Product> {
        self.enter(Operation::GetProduct).await?;
        self.backend.lock().get_product(id)
    }

    async fn create_product(&self, payload: &ProductPayload) -> ApiResult<Product> {
        self.enter(Operation::CreateProduct).await?;
        self.backend.lock().create_product(payload)
    }

    async fn update_product(&self, id: ProductId, payload: &ProductPayload) -> ApiResult<Product> {
        self.enter(Operation::UpdateProduct).await?;
        self.backend.lock().update_product(id, payload)
    }

    async fn delete_product(&self, id: ProductId) -> ApiResult<()> {
        self.enter(Operation::DeleteProduct).await?;
        self.backend.lock().delete_product(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls_and_injects_faults() {
        let api = InMemoryCatalog::new();
        api.fail_next(Operation::ListCategories, ApiError::network());

        assert_eq!(api.list_categories().await, Err(ApiError::network()));
        assert_eq!(api.list_categories().await, Ok(Vec::new()));
        assert_eq!(api.calls(Operation::ListCategories), 2);
        assert_eq!(api.mutation_calls(), 0);
    }

    #[tokio::test]
    async fn paused_lists_resume() {
        let api = std::sync::Arc::new(InMemoryCatalog::new());
        api.pause_lists();

        let task = tokio::spawn({
            let api = std::sync::Arc::clone(&api);
            async move { api.list_categories().await }
        });

        api.wait_for_calls(Operation::ListCategories, 1).await;
        assert!(!task.is_finished());

        api.resume_lists();
        assert_eq!(task.await.unwrap(), Ok(Vec::new()));
    }
}
