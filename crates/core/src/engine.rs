//! Sync engine
//!
//! Connects a [`FilterController`] to a [`SyncStore`]: every settled filter
//! becomes a refetch. Refetches run concurrently; the store keeps only the
//! newest result.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::filter::{FilterController, FilterUpdates};
use crate::gateway::TaskGateway;
use crate::store::SyncStore;

pub struct SyncEngine {
    store: SyncStore,
    filters: FilterController,
    dispatcher: JoinHandle<()>,
}

impl SyncEngine {
    /// Start dispatching filter changes and issue the initial load
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(gateway: Arc<dyn TaskGateway>, config: &ClientConfig) -> Self {
        let store = SyncStore::new(gateway);
        let (filters, updates) = FilterController::new(config.search_debounce);
        let dispatcher = tokio::spawn(dispatch(store.clone(), updates));

        filters.refresh();
        info!(
            "Sync engine started (search debounce {:?})",
            config.search_debounce
        );

        Self {
            store,
            filters,
            dispatcher,
        }
    }

    pub fn store(&self) -> &SyncStore {
        &self.store
    }

    pub fn filters(&self) -> &FilterController {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterController {
        &mut self.filters
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}

async fn dispatch(store: SyncStore, mut updates: FilterUpdates) {
    while let Some(criteria) = updates.recv().await {
        // Numbered here, in settle order, before the request is spawned
        let refetch = store.refetch(criteria);
        tokio::spawn(async move {
            let _ = refetch.await;
        });
    }
    debug!("Filter updates closed, dispatcher stopped");
}
