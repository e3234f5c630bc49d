use super::{ProductionState, StudioEvent};
use tokio::sync::watch;

/// Observable holder of the production state. Writers dispatch events; readers
/// take snapshots or subscribe to changes.
pub struct StateStore {
    tx: watch::Sender<ProductionState>,
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProductionState::default());
        Self { tx }
    }

    /// Apply `event` and notify subscribers if it changed anything.
    pub fn dispatch(&self, event: StudioEvent) -> bool {
        self.tx.send_if_modified(|state| state.apply(event))
    }

    pub fn snapshot(&self) -> ProductionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProductionState> {
        self.tx.subscribe()
    }

    /// Resolve once the current run can no longer change.
    pub async fn settled(&self) -> ProductionState {
        let mut rx = self.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                if state.is_settled() {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
