//! Immutable views of the store handed to renderers and subscribers

use crate::model::{Session, ShellConfig};
use crate::persistence::PersistedState;
use std::sync::Arc;

/// Point-in-time copy of everything a consumer may read
///
/// Sessions are shared with the store copy-on-write, so taking a snapshot
/// never clones message histories.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Increments once per committed mutation
    pub revision: u64,
    pub sessions: Arc<Vec<Session>>,
    pub active_index: usize,
    pub config: ShellConfig,
    pub sidebar_collapsed: bool,
    pub settings_open: bool,
    pub hydrated: bool,
}

impl Snapshot {
    pub fn active_session(&self) -> &Session {
        &self.sessions[self.active_index]
    }

    /// The persisted subset (config + session list)
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            config: self.config.clone(),
            sessions: self.sessions.as_ref().clone(),
            active_index: self.active_index,
        }
    }

    /// Whether the persisted subset differs from `other`'s
    ///
    /// UI transience changes (collapse, settings, hydration) never need a write.
    pub fn persisted_differs(&self, other: &Snapshot) -> bool {
        self.active_index != other.active_index
            || self.config != other.config
            || !(Arc::ptr_eq(&self.sessions, &other.sessions) || self.sessions == other.sessions)
    }
}
