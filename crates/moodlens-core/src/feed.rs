use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::CoreError;
use crate::firestore::{Document, FirestoreClient};
use crate::models::diary::{sort_newest_first, DiaryRecord};
use crate::models::range::RangeMode;

pub const DIARIES_COLLECTION: &str = "diaries";

/// Where snapshots come from. Implemented by [`FirestoreClient`] in
/// production and by scripted fakes in tests; injected at construction so no
/// component reaches for a shared global handle.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_diaries(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Document>, CoreError>;
}

#[async_trait]
impl SnapshotSource for FirestoreClient {
    async fn fetch_diaries(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Document>, CoreError> {
        self.run_query(DIARIES_COLLECTION, range).await
    }
}

/// Subscription lifecycle. A range change tears the old poll task down
/// before the new one is spawned (`Active`/`Error` → `Subscribing`);
/// `Error` is terminal for a given subscription: there is no automatic
/// retry; re-subscribing is the recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Idle,
    Subscribing,
    Active,
    Error,
    Unsubscribed,
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A full snapshot of the subscribed range, normalized and sorted
    /// newest-first. Supersedes any previously delivered list.
    Snapshot {
        generation: u64,
        records: Vec<DiaryRecord>,
    },
    /// The subscription failed; no data, no retry. One message regardless of
    /// whether the cause was permissions, connectivity, or a missing
    /// collection.
    Unavailable { generation: u64, message: String },
}

impl FeedEvent {
    pub fn generation(&self) -> u64 {
        match self {
            FeedEvent::Snapshot { generation, .. } => *generation,
            FeedEvent::Unavailable { generation, .. } => *generation,
        }
    }
}

/// Live view over the diaries collection.
///
/// Owns at most one poll task at a time. Each emitted snapshot carries the
/// generation it was produced under; consumers must drop events from
/// superseded generations (see [`FeedSubscriber::accepts`]) so a late event
/// from an old range can never overwrite current state.
pub struct FeedSubscriber {
    source: Arc<dyn SnapshotSource>,
    events_tx: mpsc::UnboundedSender<FeedEvent>,
    poll_interval: Duration,
    state: Arc<Mutex<SubscriptionState>>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl FeedSubscriber {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        poll_interval: Duration,
        events_tx: mpsc::UnboundedSender<FeedEvent>,
    ) -> Self {
        Self {
            source,
            events_tx,
            poll_interval,
            state: Arc::new(Mutex::new(SubscriptionState::Idle)),
            generation: 0,
            task: None,
        }
    }

    pub fn state(&self) -> SubscriptionState {
        *self.state.lock()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Consumer-side guard: only events from the current generation may be
    /// applied.
    pub fn accepts(&self, event: &FeedEvent) -> bool {
        event.generation() == self.generation
    }

    /// Open a subscription over `range`, evaluated against the current wall
    /// clock.
    pub fn subscribe(&mut self, range: RangeMode) {
        self.subscribe_at(range, Local::now());
    }

    /// Open a subscription over `range` with its bounds evaluated against
    /// `now` (captured once, here; the poll loop reuses the same bounds for
    /// its whole lifetime). Any previous subscription is released first.
    pub fn subscribe_at(&mut self, range: RangeMode, now: DateTime<Local>) {
        self.release();
        self.generation += 1;
        let generation = self.generation;
        *self.state.lock() = SubscriptionState::Subscribing;

        let bounds = range
            .bounds_at(now)
            .map(|(start, end)| (start.with_timezone(&Utc), end.with_timezone(&Utc)));
        let source = self.source.clone();
        let events_tx = self.events_tx.clone();
        let state = self.state.clone();
        let poll_interval = self.poll_interval;

        tracing::debug!(generation, range = range.label(), "opening diary subscription");
        self.task = Some(tokio::spawn(async move {
            loop {
                match source.fetch_diaries(bounds).await {
                    Ok(documents) => {
                        let mut records: Vec<DiaryRecord> =
                            documents.iter().map(DiaryRecord::from_document).collect();
                        sort_newest_first(&mut records);
                        *state.lock() = SubscriptionState::Active;
                        if events_tx
                            .send(FeedEvent::Snapshot {
                                generation,
                                records,
                            })
                            .is_err()
                        {
                            // Consumer went away; nothing left to publish to.
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(generation, "diary snapshot fetch failed: {e}");
                        *state.lock() = SubscriptionState::Error;
                        let _ = events_tx.send(FeedEvent::Unavailable {
                            generation,
                            message: e.brief(),
                        });
                        // Terminal: reconnection policy is not ours.
                        return;
                    }
                }
                tokio::time::sleep(poll_interval).await;
            }
        }));
    }

    /// Stop the subscription and mark it `Unsubscribed`. Safe to call more
    /// than once; the task handle is taken so the abort happens exactly once.
    pub fn unsubscribe(&mut self) {
        self.release();
        *self.state.lock() = SubscriptionState::Unsubscribed;
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for FeedSubscriber {
    fn drop(&mut self) {
        // Release is unconditional on teardown, success or not.
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::Value;
    use chrono::TimeZone;
    use std::collections::{BTreeMap, VecDeque};

    /// Returns one scripted result per fetch; empty snapshots after the
    /// script runs out.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Vec<Document>, CoreError>>>,
        seen_ranges: Mutex<Vec<Option<(DateTime<Utc>, DateTime<Utc>)>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<Document>, CoreError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen_ranges: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch_diaries(
            &self,
            range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        ) -> Result<Vec<Document>, CoreError> {
            self.seen_ranges.lock().push(range);
            self.script.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn diary_doc(id: &str, created_at: &str) -> Document {
        let mut fields = BTreeMap::new();
        fields.insert(
            "createdAt".to_string(),
            Value::Timestamp(created_at.parse().unwrap()),
        );
        Document {
            id: id.to_string(),
            fields,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_is_normalized_and_sorted_newest_first() {
        let source = ScriptedSource::new(vec![Ok(vec![
            diary_doc("old", "2024-06-09T08:00:00Z"),
            diary_doc("new", "2024-06-10T08:00:00Z"),
        ])]);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut feed = FeedSubscriber::new(source, Duration::from_secs(5), events_tx);

        feed.subscribe(RangeMode::All);
        let event = events.recv().await.unwrap();
        assert!(feed.accepts(&event));
        match event {
            FeedEvent::Snapshot { records, .. } => {
                let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
                assert_eq!(ids, vec!["new", "old"]);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
        assert_eq!(feed.state(), SubscriptionState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_is_terminal_with_no_retry() {
        let source = ScriptedSource::new(vec![Err(CoreError::Store {
            status: 403,
            body: "permission denied".to_string(),
        })]);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut feed = FeedSubscriber::new(source.clone(), Duration::from_secs(5), events_tx);

        feed.subscribe(RangeMode::Today);
        let event = events.recv().await.unwrap();
        assert!(matches!(event, FeedEvent::Unavailable { .. }));
        assert_eq!(feed.state(), SubscriptionState::Error);

        // The poll loop stopped: time passing produces no further fetches.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.seen_ranges.lock().len(), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn range_change_supersedes_prior_generation() {
        let source = ScriptedSource::new(vec![
            Ok(vec![diary_doc("from-old-range", "2024-06-01T00:00:00Z")]),
            Ok(vec![diary_doc("from-new-range", "2024-06-10T00:00:00Z")]),
        ]);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut feed = FeedSubscriber::new(source, Duration::from_secs(5), events_tx);

        feed.subscribe_at(RangeMode::All, Local::now());
        let stale = events.recv().await.unwrap();
        assert!(feed.accepts(&stale));

        // Re-subscribe before the stale event is applied: it must now be
        // rejected even though it is still in hand.
        feed.subscribe_at(RangeMode::Today, Local::now());
        assert!(!feed.accepts(&stale));

        let fresh = events.recv().await.unwrap();
        assert!(feed.accepts(&fresh));
        assert_eq!(fresh.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_range_query_uses_midnight_bounds() {
        let source = ScriptedSource::new(vec![]);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut feed = FeedSubscriber::new(source.clone(), Duration::from_secs(5), events_tx);

        let now = Local.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap();
        feed.subscribe_at(RangeMode::Last3Days, now);
        let _ = events.recv().await.unwrap();

        let ranges = source.seen_ranges.lock();
        let (start, end) = ranges[0].expect("bounded range");
        let expect_start = Local.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();
        let expect_end = Local.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap();
        assert_eq!(start, expect_start.with_timezone(&Utc));
        assert_eq!(end, expect_end.with_timezone(&Utc));
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribe_stops_polling() {
        let source = ScriptedSource::new(vec![]);
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut feed = FeedSubscriber::new(source.clone(), Duration::from_secs(5), events_tx);

        feed.subscribe(RangeMode::All);
        let _ = events.recv().await.unwrap();
        let fetches_before = source.seen_ranges.lock().len();

        feed.unsubscribe();
        assert_eq!(feed.state(), SubscriptionState::Unsubscribed);
        // Idempotent release.
        feed.unsubscribe();
        assert_eq!(feed.state(), SubscriptionState::Unsubscribed);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.seen_ranges.lock().len(), fetches_before);
    }
}
