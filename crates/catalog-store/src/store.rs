//! Shared catalog store
//!
//! Holds the category and product collections for the session and refreshes
//! them on demand. The store never mutates the remote catalog; callers do
//! that through [`CatalogApi`] and then ask for a refresh.

use crate::config::{ErrorRetention, LoadingScope, StoreConfig};
use crate::notice::{Notice, Notifier};
use crate::state::{validate_transition, FetchPhase, ResourceKind, TransitionError};
use catalog_client::{
    ApiError, ApiResult, CatalogApi, Category, CategoryId, Product, ProductFilter,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// A fetch that failed, as recorded by the store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("failed to fetch {resource}: {source}")]
pub struct FetchError {
    /// Collection that failed to refresh
    pub resource: ResourceKind,
    /// Underlying API error
    pub source: ApiError,
}

/// Result of a fetch request
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The collection was replaced with `count` items
    Refreshed {
        /// Items now in the collection
        count: usize,
    },
    /// The server reported the collection as not found; it is now empty
    Empty,
    /// The fetch failed; the error was recorded
    Failed(ApiError),
    /// Another fetch was in flight; nothing was requested
    Skipped,
}

impl FetchOutcome {
    /// Whether the request was suppressed by the re-entrancy guard
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Whether the collection now reflects the server
    #[inline]
    #[must_use]
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed { .. } | Self::Empty)
    }
}

/// Consistent copy of the store state
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    /// Categories in server order
    pub categories: Vec<Category>,
    /// Products in server order
    pub products: Vec<Product>,
    /// Whether any fetch is in flight
    pub loading: bool,
    /// Last recorded fetch failure
    pub error: Option<FetchError>,
    /// State revision this snapshot was taken at
    pub revision: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    categories: Vec<Category>,
    products: Vec<Product>,
    category_phase: FetchPhase,
    product_phase: FetchPhase,
    last_error: Option<FetchError>,
    revision: u64,
}

impl StoreState {
    fn phase(&self, kind: ResourceKind) -> FetchPhase {
        match kind {
            ResourceKind::Categories => self.category_phase,
            ResourceKind::Products => self.product_phase,
        }
    }

    fn transition(&mut self, kind: ResourceKind, to: FetchPhase) -> Result<(), TransitionError> {
        validate_transition(kind, self.phase(kind), to)?;
        match kind {
            ResourceKind::Categories => self.category_phase = to,
            ResourceKind::Products => self.product_phase = to,
        }
        Ok(())
    }

    fn any_fetching(&self) -> bool {
        ResourceKind::ALL
            .iter()
            .any(|kind| self.phase(*kind).is_fetching())
    }

    fn clear_error(&mut self, kind: ResourceKind) {
        if self
            .last_error
            .as_ref()
            .is_some_and(|err| err.resource == kind)
        {
            self.last_error = None;
        }
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

fn categories_slot(state: &mut StoreState) -> &mut Vec<Category> {
    &mut state.categories
}

fn products_slot(state: &mut StoreState) -> &mut Vec<Product> {
    &mut state.products
}

/// Session-scoped cache of the remote catalog
pub struct CatalogStore {
    api: Arc<dyn CatalogApi>,
    config: StoreConfig,
    notifier: Notifier,
    state: Mutex<StoreState>,
    revision_tx: watch::Sender<u64>,
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    /// Create an empty store
    #[must_use]
    pub fn new(api: Arc<dyn CatalogApi>, notifier: Notifier, config: StoreConfig) -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            api,
            config,
            notifier,
            state: Mutex::new(StoreState::default()),
            revision_tx,
        }
    }

    /// Store configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Refresh the category collection
    ///
    /// Returns `FetchOutcome::Skipped` without touching the network when the
    /// re-entrancy guard rejects the request.
    pub async fn fetch_categories(&self) -> FetchOutcome {
        let Some(flight) = self.begin(ResourceKind::Categories) else {
            return FetchOutcome::Skipped;
        };
        let result = self.api.list_categories().await;
        flight.settle(result, categories_slot)
    }

    /// Refresh the product collection, forwarding `filter` as-is
    pub async fn fetch_products(&self, filter: &ProductFilter) -> FetchOutcome {
        let Some(flight) = self.begin(ResourceKind::Products) else {
            return FetchOutcome::Skipped;
        };
        let result = self.api.list_products(filter).await;
        flight.settle(result, products_slot)
    }

    /// Categories in server order
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.state.lock().categories.clone()
    }

    /// Products in server order
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.state.lock().products.clone()
    }

    /// Cached category by id
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<Category> {
        self.state
            .lock()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Whether at least one category is cached
    #[must_use]
    pub fn has_categories(&self) -> bool {
        !self.state.lock().categories.is_empty()
    }

    /// Whether any fetch is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.lock().any_fetching()
    }

    /// Phase of one resource kind
    #[must_use]
    pub fn phase(&self, kind: ResourceKind) -> FetchPhase {
        self.state.lock().phase(kind)
    }

    /// Last recorded fetch failure
    #[must_use]
    pub fn last_error(&self) -> Option<FetchError> {
        self.state.lock().last_error.clone()
    }

    /// Consistent copy of every field
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.lock();
        CatalogSnapshot {
            categories: state.categories.clone(),
            products: state.products.clone(),
            loading: state.any_fetching(),
            error: state.last_error.clone(),
            revision: state.revision,
        }
    }

    /// Watch the state revision; it changes on every transition
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    fn publish(&self, revision: u64) {
        self.revision_tx.send_replace(revision);
    }

    fn begin(&self, kind: ResourceKind) -> Option<InFlight<'_>> {
        let mut state = self.state.lock();

        if self.config.loading_scope == LoadingScope::Shared && state.any_fetching() {
            tracing::debug!(resource = %kind, "fetch skipped: store is already loading");
            return None;
        }

        let previous = state.phase(kind);
        if let Err(err) = state.transition(kind, FetchPhase::Fetching) {
            tracing::debug!(resource = %kind, error = %err, "fetch skipped: already in flight");
            return None;
        }

        let revision = state.bump();
        drop(state);
        self.publish(revision);
        tracing::debug!(resource = %kind, "fetch started");

        Some(InFlight {
            store: self,
            kind,
            previous,
            done: false,
        })
    }

    fn settle<T>(
        &self,
        kind: ResourceKind,
        result: ApiResult<Vec<T>>,
        slot: fn(&mut StoreState) -> &mut Vec<T>,
    ) -> FetchOutcome {
        let mut notice = None;
        let mut state = self.state.lock();

        let (outcome, phase) = match result {
            Ok(items) => {
                let count = items.len();
                *slot(&mut state) = items;
                state.clear_error(kind);
                (FetchOutcome::Refreshed { count }, FetchPhase::Settled(Ok(())))
            }
            Err(err) if err.is_not_found() => {
                slot(&mut state).clear();
                state.clear_error(kind);
                (FetchOutcome::Empty, FetchPhase::Settled(Ok(())))
            }
            Err(err) => {
                if self.config.error_retention == ErrorRetention::Clear {
                    slot(&mut state).clear();
                }
                state.last_error = Some(FetchError {
                    resource: kind,
                    source: err.clone(),
                });
                notice = Some(Notice::error(fetch_failure_message(kind, &err)));
                let phase = FetchPhase::Settled(Err(err.kind()));
                (FetchOutcome::Failed(err), phase)
            }
        };

        if let Err(err) = state.transition(kind, phase) {
            tracing::error!(error = %err, "fetch settled outside of an in-flight phase");
        }
        let revision = state.bump();
        drop(state);
        self.publish(revision);

        match &outcome {
            FetchOutcome::Refreshed { count } => {
                tracing::info!(resource = %kind, count, "fetch completed");
            }
            FetchOutcome::Empty => tracing::info!(resource = %kind, "fetch found nothing"),
            FetchOutcome::Failed(err) => {
                tracing::warn!(resource = %kind, error = %err, "fetch failed");
            }
            FetchOutcome::Skipped => {}
        }

        if let Some(notice) = notice {
            self.notifier.notify(notice);
        }
        outcome
    }

    fn abandon(&self, kind: ResourceKind, previous: FetchPhase) {
        let mut state = self.state.lock();
        if !state.phase(kind).is_fetching() {
            return;
        }
        if let Err(err) = state.transition(kind, previous) {
            tracing::error!(error = %err, "failed to roll back abandoned fetch");
            return;
        }
        let revision = state.bump();
        drop(state);
        self.publish(revision);
        tracing::warn!(resource = %kind, "fetch abandoned before completion");
    }
}

fn fetch_failure_message(kind: ResourceKind, err: &ApiError) -> String {
    let message = err.message();
    if message.trim().is_empty() {
        format!("Failed to fetch {kind}")
    } else {
        message
    }
}

/// Marks one fetch as in flight; rolls the phase back if dropped unsettled
struct InFlight<'a> {
    store: &'a CatalogStore,
    kind: ResourceKind,
    previous: FetchPhase,
    done: bool,
}

impl InFlight<'_> {
    fn settle<T>(
        mut self,
        result: ApiResult<Vec<T>>,
        slot: fn(&mut StoreState) -> &mut Vec<T>,
    ) -> FetchOutcome {
        self.done = true;
        self.store.settle(self.kind, result, slot)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.store.abandon(self.kind, self.previous);
        }
    }
}
