//! Background writer that persists store snapshots

use super::StateStorage;
use crate::store::Snapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Persists every snapshot whose durable part changed
///
/// Subscribes to the store's snapshot channel, so it only ever sees the
/// latest state: bursts of mutations (a drag, a streaming reply) coalesce
/// into as few writes as the disk keeps up with. Failures are logged and the
/// loop keeps going.
pub struct PersistenceWriter {
    storage: Box<dyn StateStorage>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
    last_written: Option<Arc<Snapshot>>,
}

impl PersistenceWriter {
    /// The snapshot current at construction is taken as already persisted
    /// (it was just loaded, or is the default)
    pub fn new(
        storage: Box<dyn StateStorage>,
        mut snapshots: watch::Receiver<Arc<Snapshot>>,
    ) -> Self {
        let baseline = snapshots.borrow_and_update().clone();
        Self {
            storage,
            snapshots,
            last_written: Some(baseline),
        }
    }

    /// Run until the store (the sending side) is dropped
    pub async fn run(mut self) {
        tracing::info!("Persistence writer started: {}", self.storage.describe());

        while self.snapshots.changed().await.is_ok() {
            let snapshot = self.snapshots.borrow_and_update().clone();
            self.write_if_changed(snapshot);
        }

        // Store dropped: flush whatever arrived last
        let snapshot = self.snapshots.borrow().clone();
        self.write_if_changed(snapshot);
        tracing::info!("Persistence writer shutting down");
    }

    fn write_if_changed(&mut self, snapshot: Arc<Snapshot>) {
        let changed = self
            .last_written
            .as_ref()
            .map_or(true, |last| snapshot.persisted_differs(last));
        if !changed {
            return;
        }

        match self.storage.save(&snapshot.to_persisted()) {
            Ok(()) => {
                tracing::trace!("Persisted revision {}", snapshot.revision);
                self.last_written = Some(snapshot);
            }
            Err(e) => {
                // Best-effort: keep last_written so the next change retries
                tracing::warn!("Failed to persist state: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, Theme};
    use crate::persistence::{MemoryStorage, PersistedState};
    use crate::store::Store;

    #[tokio::test]
    async fn writes_durable_changes_and_flushes_on_drop() {
        let storage = MemoryStorage::new();
        let mut store = Store::new();
        let writer = PersistenceWriter::new(Box::new(storage.clone()), store.subscribe());
        let handle = tokio::spawn(writer.run());

        store.update_config(|config| config.theme = Theme::Dark);
        let id = store.active_session().id;
        store.append_message(id, Message::user("saved")).unwrap();
        let expected = store.persisted_state();
        drop(store);
        handle.await.unwrap();

        let saved: PersistedState = serde_json::from_str(&storage.raw().unwrap()).unwrap();
        assert_eq!(saved, expected);
        assert_eq!(saved.config.theme, Theme::Dark);
        assert!(storage.save_count() >= 1);
    }

    #[tokio::test]
    async fn ui_only_changes_are_not_written() {
        let storage = MemoryStorage::new();
        let mut store = Store::new();
        let writer = PersistenceWriter::new(Box::new(storage.clone()), store.subscribe());
        let handle = tokio::spawn(writer.run());

        store.set_sidebar_collapsed(true);
        store.set_settings_open(true);
        store.mark_hydrated();
        drop(store);
        handle.await.unwrap();

        assert_eq!(storage.save_count(), 0);
        assert!(storage.raw().is_none());
    }
}
