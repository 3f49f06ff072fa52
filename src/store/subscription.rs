use tokio::{
    sync::broadcast::{Receiver, error::RecvError},
    task::spawn_blocking,
};

use crate::{
    msg::Msg,
    store::{Collection, Snapshot, Store, StoreError},
};

/// A live view of one collection.
///
/// [`Subscription::next`] first yields the current contents of the collection,
/// and afterwards yields a freshly loaded snapshot whenever a document in the
/// collection has been added, modified or removed. Every snapshot is complete,
/// so the subscriber replaces whatever it held before.
///
/// The subscription stops receiving changes as soon as it is dropped.
pub struct Subscription<S> {
    store: S,
    collection: Collection,
    rx: Receiver<Msg>,
    primed: bool,
}

impl<S> Subscription<S>
where
    S: Store + Clone + Send + 'static,
{
    pub fn new(store: S, collection: Collection) -> Self {
        // subscribe before the first load, so that no write can fall between
        // the initial snapshot and the first change message
        let rx = store.changes();
        tracing::debug!(%collection, "subscribed");

        Self {
            store,
            collection,
            rx,
            primed: false,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Waits for the next snapshot. Returns `None` once the store has shut
    /// down its change feed.
    pub async fn next(&mut self) -> Option<Result<Snapshot, StoreError>> {
        if !self.primed {
            self.primed = true;
            return Some(self.load().await);
        }

        loop {
            match self.rx.recv().await {
                Ok(msg) if msg.collection == self.collection => {
                    tracing::trace!(collection = %self.collection, change = ?msg.inner, "change received");
                    // several writes may have landed at once; one reload
                    // covers all of them
                    self.drain_pending();
                    return Some(self.load().await);
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        collection = %self.collection,
                        "subscriber lagged by {skipped} message(s), reloading"
                    );
                    return Some(self.load().await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn drain_pending(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            tracing::trace!(collection = %msg.collection, change = ?msg.inner, "coalesced change");
        }
    }

    async fn load(&self) -> Result<Snapshot, StoreError> {
        let store = self.store.clone();
        let collection = self.collection;

        spawn_blocking(move || store.snapshot(collection))
            .await
            .map_err(|e| StoreError::Background(e.to_string()))?
    }
}

impl<S> Drop for Subscription<S> {
    fn drop(&mut self) {
        tracing::debug!(collection = %self.collection, "unsubscribed");
    }
}
