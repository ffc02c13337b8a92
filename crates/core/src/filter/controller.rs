//! Filter controller
//!
//! Owns the current filter criteria and publishes a snapshot every time
//! they settle. Search text is debounced; every other change is published
//! right away.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::criteria::FilterCriteria;
use crate::task::Priority;

/// Quiet period after the last keystroke before search text settles
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

struct FilterState {
    /// Last published criteria
    criteria: FilterCriteria,
    /// Raw search text, may be ahead of `criteria.search`
    search_input: String,
    /// Bumped whenever a pending search window is superseded
    generation: u64,
}

/// Stream of settled filter criteria
pub struct FilterUpdates {
    rx: mpsc::UnboundedReceiver<FilterCriteria>,
}

impl FilterUpdates {
    /// Wait for the next settled snapshot
    ///
    /// Returns `None` once the controller and any pending window are gone.
    pub async fn recv(&mut self) -> Option<FilterCriteria> {
        self.rx.recv().await
    }

    /// Take a snapshot that has already been published, if any
    pub fn try_recv(&mut self) -> Option<FilterCriteria> {
        self.rx.try_recv().ok()
    }
}

/// Debouncing owner of the filter criteria
///
/// Methods that may start a search window spawn onto the current Tokio
/// runtime and must be called from within one.
pub struct FilterController {
    shared: Arc<Mutex<FilterState>>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<FilterCriteria>,
}

impl FilterController {
    /// Create a controller with empty criteria
    pub fn new(debounce: Duration) -> (Self, FilterUpdates) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            shared: Arc::new(Mutex::new(FilterState {
                criteria: FilterCriteria::default(),
                search_input: String::new(),
                generation: 0,
            })),
            debounce,
            pending: None,
            tx,
        };
        (controller, FilterUpdates { rx })
    }

    /// Last settled criteria
    pub fn criteria(&self) -> FilterCriteria {
        self.shared.lock().criteria.clone()
    }

    /// Search text as typed, settled or not
    pub fn search_input(&self) -> String {
        self.shared.lock().search_input.clone()
    }

    pub fn has_pending_search(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn has_active_filters(&self) -> bool {
        self.shared.lock().criteria.is_active()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn set_completed(&mut self, completed: Option<bool>) {
        let mut state = self.shared.lock();
        state.criteria.completed = completed;
        publish(&self.tx, &state.criteria);
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) {
        let mut state = self.shared.lock();
        state.criteria.priority = priority;
        publish(&self.tx, &state.criteria);
    }

    /// Record new search text and restart the debounce window
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.cancel_pending();

        let generation = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.search_input = text.clone();
            state.generation
        };

        let shared = Arc::clone(&self.shared);
        let tx = self.tx.clone();
        let window = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;

            let mut state = shared.lock();
            if state.generation != generation {
                return;
            }
            state.criteria.search = text;
            publish(&tx, &state.criteria);
        }));
    }

    /// Reset every field and publish immediately
    pub fn clear(&mut self) {
        self.cancel_pending();

        let mut state = self.shared.lock();
        state.generation += 1;
        state.search_input.clear();
        state.criteria = FilterCriteria::default();
        publish(&self.tx, &state.criteria);
    }

    /// Publish the settled criteria again
    pub fn refresh(&self) {
        let state = self.shared.lock();
        publish(&self.tx, &state.criteria);
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for FilterController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn publish(tx: &mpsc::UnboundedSender<FilterCriteria>, criteria: &FilterCriteria) {
    debug!("Filter settled: {:?}", criteria);
    if tx.send(criteria.clone()).is_err() {
        debug!("No listener for filter updates");
    }
}
