//! Hydration gate
//!
//! Keeps the interactive shell from rendering until the host has completed
//! its first real frame. Before that point the store may still hold
//! defaults that are about to be replaced, and showing them would flash.
//!
//! ```text
//!   Pending ──(first Mounted signal)──▶ Hydrated
//! ```
//!
//! The transition happens once; there is no way to force it early.

use crate::store::{Snapshot, Store};

/// Lifecycle signals emitted by the rendering host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// A frame was drawn into a live terminal
    Mounted,
    /// The host lost or resized its surface; does not affect hydration
    Resized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Pending,
    Hydrated,
}

/// What the host should draw for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Neutral loading placeholder; nothing session- or config-dependent
    Placeholder,
    Interactive,
}

#[derive(Debug, Default)]
pub struct HydrationGate {
    state: GateState,
}

impl HydrationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Feed a lifecycle signal; the first `Mounted` hydrates the store
    pub fn observe(&mut self, signal: LifecycleSignal, store: &mut Store) {
        if self.state == GateState::Pending && signal == LifecycleSignal::Mounted {
            self.state = GateState::Hydrated;
            store.mark_hydrated();
        }
    }

    /// Decide what to render from a snapshot
    ///
    /// Reads the snapshot's flag rather than the gate's own state so a
    /// renderer that only holds a snapshot gets the same answer.
    pub fn view(snapshot: &Snapshot) -> GateView {
        if snapshot.hydrated {
            GateView::Interactive
        } else {
            GateView::Placeholder
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_first_mount() {
        let mut store = Store::new();
        let mut gate = HydrationGate::new();
        assert_eq!(HydrationGate::view(&store.snapshot()), GateView::Placeholder);

        gate.observe(LifecycleSignal::Resized, &mut store);
        assert_eq!(gate.state(), GateState::Pending);
        assert!(!store.hydrated());

        gate.observe(LifecycleSignal::Mounted, &mut store);
        assert_eq!(gate.state(), GateState::Hydrated);
        assert_eq!(HydrationGate::view(&store.snapshot()), GateView::Interactive);
    }

    #[test]
    fn later_mounts_do_not_republish() {
        let mut store = Store::new();
        let mut gate = HydrationGate::new();
        gate.observe(LifecycleSignal::Mounted, &mut store);
        let revision = store.revision();

        gate.observe(LifecycleSignal::Mounted, &mut store);
        gate.observe(LifecycleSignal::Mounted, &mut store);
        assert_eq!(store.revision(), revision);
        assert_eq!(gate.state(), GateState::Hydrated);
    }
}
