//! Deferred presentational modules
//!
//! Some panes are built off the event loop (they touch the filesystem or are
//! just slow to assemble). A `Deferred<T>` starts in `Loading`, renders a
//! placeholder, and flips to `Ready` once its value arrives. The loader only
//! ever produces a value; it never writes to the store.

use std::future::Future;
use tokio::sync::oneshot;

pub enum Deferred<T> {
    Loading(oneshot::Receiver<T>),
    Ready(T),
}

impl<T: Send + 'static> Deferred<T> {
    /// Start building `T` on the runtime
    pub fn spawn<F>(name: &'static str, build: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let value = build.await;
            if tx.send(value).is_err() {
                tracing::debug!("Deferred module {} finished after its owner went away", name);
            }
        });
        Deferred::Loading(rx)
    }
}

impl<T> Deferred<T> {
    /// Already-built value
    pub fn ready(value: T) -> Self {
        Deferred::Ready(value)
    }

    /// Pair of (handle, sender) for callers that produce the value themselves
    pub fn channel() -> (Self, oneshot::Sender<T>) {
        let (tx, rx) = oneshot::channel();
        (Deferred::Loading(rx), tx)
    }

    /// Pick up the value if it has arrived; returns it when ready
    ///
    /// A loader that died without producing a value leaves the handle in
    /// `Loading`, so the placeholder keeps rendering.
    pub fn poll(&mut self) -> Option<&T> {
        if let Deferred::Loading(rx) = self {
            match rx.try_recv() {
                Ok(value) => *self = Deferred::Ready(value),
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    tracing::warn!("Deferred module loader dropped without a value");
                }
            }
        }
        self.get()
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Deferred::Ready(value) => Some(value),
            Deferred::Loading(_) => None,
        }
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        matches!(self, Deferred::Ready(_))
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deferred::Loading(_) => f.write_str("Deferred::Loading"),
            Deferred::Ready(_) => f.write_str("Deferred::Ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_until_value_arrives() {
        let (mut deferred, tx) = Deferred::<u32>::channel();
        assert_eq!(deferred.poll(), None);
        assert!(!deferred.is_ready());

        tx.send(7).unwrap();
        assert_eq!(deferred.poll(), Some(&7));
        assert!(deferred.is_ready());
        // Stays ready
        assert_eq!(deferred.poll(), Some(&7));
    }

    #[test]
    fn dropped_loader_keeps_placeholder() {
        let (mut deferred, tx) = Deferred::<u32>::channel();
        drop(tx);
        assert_eq!(deferred.poll(), None);
        assert!(!deferred.is_ready());
    }

    #[tokio::test]
    async fn spawned_builder_completes() {
        let mut deferred = Deferred::spawn("answer", async { 42u32 });
        for _ in 0..100 {
            if deferred.poll().is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(deferred.get(), Some(&42));
    }
}
