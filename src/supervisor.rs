//! Per-subtree fault isolation
//!
//! Each presentational subtree (sidebar, chat pane, settings pane, status
//! bar) draws through its own `SubtreeBoundary`. A panic while drawing is
//! caught, logged, and latches the boundary into its fault state; from then
//! on the caller draws a local fallback until `reset()` is called. The store
//! and sibling subtrees are unaffected.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug)]
pub struct SubtreeBoundary {
    name: &'static str,
    fault: Option<String>,
}

impl SubtreeBoundary {
    pub fn new(name: &'static str) -> Self {
        Self { name, fault: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Panic message that tripped this boundary, if any
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// Run `body` unless already faulted
    ///
    /// Returns `None` when the caller should draw its fallback instead.
    pub fn run<R>(&mut self, body: impl FnOnce() -> R) -> Option<R> {
        if self.fault.is_some() {
            return None;
        }
        match catch_unwind(AssertUnwindSafe(body)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Subtree '{}' failed while rendering: {}", self.name, message);
                self.fault = Some(message);
                None
            }
        }
    }

    /// Clear the fault so the next `run` tries the real subtree again
    pub fn reset(&mut self) {
        if self.fault.take().is_some() {
            tracing::info!("Subtree '{}' reset", self.name);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_subtree_returns_value() {
        let mut boundary = SubtreeBoundary::new("sidebar");
        assert_eq!(boundary.run(|| 3), Some(3));
        assert!(!boundary.is_faulted());
    }

    #[test]
    fn panic_latches_fallback_and_spares_siblings() {
        let mut chat = SubtreeBoundary::new("chat");
        let mut sidebar = SubtreeBoundary::new("sidebar");

        let result: Option<()> = chat.run(|| panic!("bad frame"));
        assert_eq!(result, None);
        assert_eq!(chat.fault(), Some("bad frame"));

        // Still faulted: the body is not even attempted
        let mut called = false;
        assert_eq!(chat.run(|| called = true), None);
        assert!(!called);

        assert_eq!(sidebar.run(|| "ok"), Some("ok"));
    }

    #[test]
    fn reset_retries_the_subtree() {
        let mut boundary = SubtreeBoundary::new("settings");
        let _ = boundary.run(|| -> u8 { panic!("{}", String::from("formatted")) });
        assert_eq!(boundary.fault(), Some("formatted"));
        boundary.reset();
        assert_eq!(boundary.run(|| 1), Some(1));
    }
}
