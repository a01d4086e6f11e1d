//! Re-evaluating queries driven by the [`ChangeFeed`](crate::ChangeFeed).

use std::sync::Arc;

use futures::future::select_all;
use futures::Stream;
use tokio::sync::watch;

use crate::database::Database;
use crate::error::Result;
use crate::store::LocalStore;

pub(crate) type QueryFn<T> = Arc<dyn Fn(&Database) -> Result<Vec<T>> + Send + Sync>;

/// A query that re-runs whenever one of the tables it reads is written.
///
/// The first [`next`](LiveQuery::next) yields the current snapshot.  Each
/// later call waits for at least one write and yields a fresh snapshot;
/// versions written while the consumer was busy are coalesced, so a slow
/// consumer always sees the latest state rather than a backlog.  Dropping the
/// query unsubscribes it.
pub struct LiveQuery<T> {
    store: LocalStore,
    receivers: Vec<watch::Receiver<u64>>,
    query: QueryFn<T>,
    primed: bool,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(crate) fn new(
        store: LocalStore,
        receivers: Vec<watch::Receiver<u64>>,
        query: QueryFn<T>,
    ) -> Self {
        Self {
            store,
            receivers,
            query,
            primed: false,
        }
    }

    /// Run the query once against the current table contents.
    pub fn snapshot(&self) -> Result<Vec<T>> {
        self.store.with_db(|db| (self.query)(db))
    }

    /// Next snapshot, or `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Result<Vec<T>>> {
        if self.primed {
            if self.receivers.is_empty() {
                return None;
            }
            let changed = self
                .receivers
                .iter_mut()
                .map(|rx| Box::pin(rx.changed()));
            let (result, _, _) = select_all(changed).await;
            if result.is_err() {
                return None;
            }
        }

        self.primed = true;
        for rx in &mut self.receivers {
            rx.borrow_and_update();
        }
        Some(self.snapshot())
    }

    /// Adapt into a [`Stream`] of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>>> + Send {
        futures::stream::unfold(self, |mut live| async move {
            let item = live.next().await?;
            Some((item, live))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;

    use crate::changes::Table;
    use crate::models::Restaurant;
    use crate::LocalStore;

    fn restaurant(id: &str, name: &str) -> Restaurant {
        serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
    }

    #[tokio::test]
    async fn first_next_replays_current_state() {
        let store = LocalStore::open_in_memory().unwrap();
        let table = store.listings::<Restaurant>();
        table.upsert_one(&restaurant("1", "Pizza Palace")).unwrap();

        let mut live = table.get_all();
        let first = live.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn re_emits_after_write() {
        let store = LocalStore::open_in_memory().unwrap();
        let table = store.listings::<Restaurant>();
        let mut live = table.get_all();
        assert!(live.next().await.unwrap().unwrap().is_empty());

        table.upsert_one(&restaurant("1", "Pizza Palace")).unwrap();
        let after = tokio::time::timeout(Duration::from_secs(1), live.next())
            .await
            .expect("live query should wake on write")
            .unwrap()
            .unwrap();
        assert_eq!(after[0].name, "Pizza Palace");
    }

    #[tokio::test]
    async fn slow_consumer_sees_only_latest() {
        let store = LocalStore::open_in_memory().unwrap();
        let table = store.listings::<Restaurant>();
        let mut live = table.get_all();
        live.next().await.unwrap().unwrap();

        table.upsert_one(&restaurant("1", "A")).unwrap();
        table.upsert_one(&restaurant("2", "B")).unwrap();
        table.upsert_one(&restaurant("3", "C")).unwrap();

        let latest = live.next().await.unwrap().unwrap();
        assert_eq!(latest.len(), 3);

        // Nothing pending after the coalesced emission.
        let pending = tokio::time::timeout(Duration::from_millis(50), live.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn unrelated_table_does_not_wake() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut live = store.listings::<Restaurant>().get_all();
        live.next().await.unwrap().unwrap();

        store.with_db(|db| {
            db.notify(Table::Jobs);
            Ok(())
        })
        .unwrap();

        let pending = tokio::time::timeout(Duration::from_millis(50), live.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn stream_adapter_yields_snapshots() {
        let store = LocalStore::open_in_memory().unwrap();
        let table = store.listings::<Restaurant>();
        let mut stream = Box::pin(table.get_all().into_stream());

        assert!(stream.next().await.unwrap().unwrap().is_empty());
        table.upsert_one(&restaurant("1", "A")).unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 1);
    }
}
