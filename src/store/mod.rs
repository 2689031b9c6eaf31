//! The session/config store
//!
//! `Store` is the single owner of the persisted config, the session list and
//! the process-local UI flags. It exposes a closed set of mutation operations;
//! each one leaves the state satisfying every invariant before it returns and
//! publishes exactly one new [`Snapshot`] when something actually changed.
//!
//! Invariants held after every operation:
//! - `sessions` is never empty
//! - `active_index < sessions.len()`
//! - `config.sidebar_width` is within the clamp range
//!
//! Consumers never hold references into the live store. They read snapshots
//! (`snapshot()` / `subscribe()`) and send mutations back through `&mut Store`.

mod error;
mod snapshot;

pub use error::StoreError;
pub use snapshot::Snapshot;

use crate::model::{Message, Session, SessionId, ShellConfig};
use crate::persistence::PersistedState;
use std::sync::Arc;
use tokio::sync::watch;

/// Process-local view state, reset on every start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct UiState {
    sidebar_collapsed: bool,
    settings_open: bool,
    hydrated: bool,
}

/// Single source of truth for sessions, config and UI flags
pub struct Store {
    sessions: Arc<Vec<Session>>,
    active_index: usize,
    config: ShellConfig,
    ui: UiState,
    revision: u64,
    snapshots: watch::Sender<Arc<Snapshot>>,
}

impl Store {
    /// Store with the default config and a single empty session
    pub fn new() -> Self {
        Self::from_persisted(PersistedState::default())
    }

    /// Rebuild the store from a restored blob
    ///
    /// Restored data is not trusted: the width is re-clamped, an empty session
    /// list gets a fresh session and a stale active index is pulled back to the
    /// last session.
    pub fn from_persisted(state: PersistedState) -> Self {
        let PersistedState {
            config,
            mut sessions,
            active_index,
        } = state;

        if sessions.is_empty() {
            sessions.push(Session::new());
        }
        for session in sessions.iter_mut() {
            if session.settle_streaming() {
                tracing::debug!("Session {} had an interrupted reply", session.id);
            }
        }
        let active_index = if active_index < sessions.len() {
            active_index
        } else {
            tracing::warn!(
                "Restored active index {} out of range for {} session(s), using last",
                active_index,
                sessions.len()
            );
            sessions.len() - 1
        };

        let config = config.validated();
        let sessions = Arc::new(sessions);
        let initial = Arc::new(Snapshot {
            revision: 0,
            sessions: Arc::clone(&sessions),
            active_index,
            config: config.clone(),
            sidebar_collapsed: false,
            settings_open: false,
            hydrated: false,
        });
        let (snapshots, _) = watch::channel(initial);

        Self {
            sessions,
            active_index,
            config,
            ui: UiState::default(),
            revision: 0,
            snapshots,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_session(&self) -> &Session {
        &self.sessions[self.active_index]
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.ui.sidebar_collapsed
    }

    pub fn settings_open(&self) -> bool {
        self.ui.settings_open
    }

    pub fn hydrated(&self) -> bool {
        self.ui.hydrated
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Change notifications: the receiver always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.subscribe()
    }

    pub fn persisted_state(&self) -> PersistedState {
        self.snapshot().to_persisted()
    }

    fn position_of(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = Snapshot {
            revision: self.revision,
            sessions: Arc::clone(&self.sessions),
            active_index: self.active_index,
            config: self.config.clone(),
            sidebar_collapsed: self.ui.sidebar_collapsed,
            settings_open: self.ui.settings_open,
            hydrated: self.ui.hydrated,
        };
        // send_replace succeeds even when nobody is subscribed
        self.snapshots.send_replace(Arc::new(snapshot));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session list
    // ─────────────────────────────────────────────────────────────────────

    /// Append a new empty session and make it active
    pub fn create_session(&mut self) -> SessionId {
        let session = Session::new();
        let id = session.id;
        let sessions = Arc::make_mut(&mut self.sessions);
        sessions.push(session);
        self.active_index = sessions.len() - 1;
        tracing::debug!("Created session {} at index {}", id, self.active_index);
        self.publish();
        id
    }

    /// Remove a session; unknown ids are a no-op
    ///
    /// Removing the only session replaces it with a fresh one in the same step.
    pub fn remove_session(&mut self, id: SessionId) {
        match self.position_of(id) {
            Some(position) => self.remove_at(position),
            None => tracing::debug!("remove_session: no session {}", id),
        }
    }

    /// Remove whichever session is currently active
    pub fn remove_active_session(&mut self) {
        self.remove_at(self.active_index);
    }

    fn remove_at(&mut self, position: usize) {
        let sessions = Arc::make_mut(&mut self.sessions);
        let removed = sessions.remove(position);

        if sessions.is_empty() {
            sessions.push(Session::new());
            self.active_index = 0;
        } else if position < self.active_index {
            self.active_index -= 1;
        } else if position == self.active_index {
            self.active_index = position.min(sessions.len() - 1);
        }

        tracing::debug!(
            "Removed session {} (active index now {})",
            removed.id,
            self.active_index
        );
        self.publish();
    }

    /// Point the active session at `index`
    pub fn set_active(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.sessions.len() {
            return Err(StoreError::OutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len: self.sessions.len(),
            });
        }
        if index != self.active_index {
            self.active_index = index;
            self.publish();
        }
        Ok(())
    }

    /// `set_active` for signed input; negative indices are out of range too
    pub fn set_active_signed(&mut self, index: i64) -> Result<(), StoreError> {
        match usize::try_from(index) {
            Ok(index) => self.set_active(index),
            Err(_) => Err(StoreError::OutOfRange {
                index,
                len: self.sessions.len(),
            }),
        }
    }

    /// Reorder a session; the active session stays active wherever it lands
    pub fn move_session(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        let len = self.sessions.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::OutOfRange {
                    index: i64::try_from(index).unwrap_or(i64::MAX),
                    len,
                });
            }
        }
        if from == to {
            return Ok(());
        }

        let active_id = self.active_session().id;
        let sessions = Arc::make_mut(&mut self.sessions);
        let session = sessions.remove(from);
        sessions.insert(to, session);
        self.active_index = sessions
            .iter()
            .position(|s| s.id == active_id)
            .unwrap_or(0);
        self.publish();
        Ok(())
    }

    /// Drop every session and start over with one fresh session
    pub fn clear_all_sessions(&mut self) {
        self.sessions = Arc::new(vec![Session::new()]);
        self.active_index = 0;
        tracing::info!("Cleared all sessions");
        self.publish();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session contents
    // ─────────────────────────────────────────────────────────────────────

    fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, StoreError> {
        let position = self
            .position_of(id)
            .ok_or(StoreError::UnknownSession(id))?;
        Ok(&mut Arc::make_mut(&mut self.sessions)[position])
    }

    /// Rename a session; blank titles are ignored
    pub fn rename_session(&mut self, id: SessionId, title: &str) -> Result<(), StoreError> {
        let title = title.trim();
        let session = self.session_mut(id)?;
        if title.is_empty() || session.title == title {
            return Ok(());
        }
        session.title = title.to_string();
        session.touch();
        self.publish();
        Ok(())
    }

    /// Append a message, returning its position in the session history
    pub fn append_message(&mut self, id: SessionId, message: Message) -> Result<usize, StoreError> {
        let position = self.session_mut(id)?.push(message);
        self.publish();
        Ok(position)
    }

    /// Edit an existing message in place
    pub fn update_message<F>(
        &mut self,
        id: SessionId,
        position: usize,
        edit: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Message),
    {
        let session = self.session_mut(id)?;
        let len = session.messages.len();
        let message = session
            .messages
            .get_mut(position)
            .ok_or(StoreError::MessageOutOfRange { position, len })?;
        edit(message);
        session.touch();
        self.publish();
        Ok(())
    }

    /// Truncate a session's history; an already empty session is left alone
    pub fn clear_messages(&mut self, id: SessionId) -> Result<(), StoreError> {
        let position = self
            .position_of(id)
            .ok_or(StoreError::UnknownSession(id))?;
        if self.sessions[position].is_empty() {
            return Ok(());
        }
        Arc::make_mut(&mut self.sessions)[position].clear();
        self.publish();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Config
    // ─────────────────────────────────────────────────────────────────────

    /// Apply `mutate` to a draft, validate it, then commit
    ///
    /// This is the only path that changes the config. The draft is validated
    /// (width clamped) before it replaces the live value, so an out-of-range
    /// write is never observable.
    pub fn update_config<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut ShellConfig),
    {
        let mut draft = self.config.clone();
        mutate(&mut draft);
        let draft = draft.validated();
        if draft != self.config {
            self.config = draft;
            self.publish();
        }
    }

    pub fn reset_config(&mut self) {
        self.update_config(|config| *config = ShellConfig::default());
    }

    // ─────────────────────────────────────────────────────────────────────
    // UI transience
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        if self.ui.sidebar_collapsed != collapsed {
            self.ui.sidebar_collapsed = collapsed;
            self.publish();
        }
    }

    pub fn set_settings_open(&mut self, open: bool) {
        if self.ui.settings_open != open {
            self.ui.settings_open = open;
            self.publish();
        }
    }

    /// One-way false → true transition; repeated calls do nothing
    pub fn mark_hydrated(&mut self) {
        if !self.ui.hydrated {
            self.ui.hydrated = true;
            tracing::debug!("Store hydrated");
            self.publish();
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
