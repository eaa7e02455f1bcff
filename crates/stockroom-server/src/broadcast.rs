//! Workspace-scoped fan-out of change events to live subscribers.
//!
//! Each subscriber owns a bounded queue. Publishing never blocks: a full queue
//! drops the event for that subscriber only, and queues whose receiver is gone
//! are pruned on the next publish.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::RwLock;
use stockroom_core::{ChangeEvent, WorkspaceId};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Arc<ChangeEvent>>,
}

struct Registry {
    subscribers: RwLock<HashMap<WorkspaceId, Vec<Subscriber>>>,
    next_id: AtomicU64,
    dropped: AtomicU64,
    buffer: usize,
}

impl Registry {
    fn remove(&self, workspace_id: &WorkspaceId, ids: &[u64]) {
        let mut subscribers = self.subscribers.write();
        if let Some(list) = subscribers.get_mut(workspace_id) {
            list.retain(|s| !ids.contains(&s.id));
            if list.is_empty() {
                let _ = subscribers.remove(workspace_id);
            }
        }
    }
}

/// Distributes [`ChangeEvent`]s to the subscribers of their workspace.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    /// Create a broadcaster whose subscribers queue up to `buffer` events.
    pub fn new(buffer: usize) -> Self {
        Self {
            registry: Arc::new(Registry {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                dropped: AtomicU64::new(0),
                buffer: buffer.max(1),
            }),
        }
    }

    /// Register a new subscriber for one workspace.
    pub fn subscribe(&self, workspace_id: &WorkspaceId) -> Subscription {
        let (tx, rx) = mpsc::channel(self.registry.buffer);
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .subscribers
            .write()
            .entry(workspace_id.clone())
            .or_default()
            .push(Subscriber { id, tx });
        debug!(workspace_id = %workspace_id, subscriber_id = id, "subscriber added");
        Subscription {
            registry: Arc::clone(&self.registry),
            workspace_id: workspace_id.clone(),
            id,
            rx,
        }
    }

    /// Send `event` to every subscriber of `workspace_id`.
    ///
    /// Returns the number of subscribers the event was queued for.
    pub fn publish(&self, workspace_id: &WorkspaceId, event: ChangeEvent) -> usize {
        let event = Arc::new(event);
        let mut delivered = 0;
        let mut closed = Vec::new();
        {
            let subscribers = self.registry.subscribers.read();
            let Some(list) = subscribers.get(workspace_id) else {
                debug!(workspace_id = %workspace_id, event_type = %event.event_type, "no subscribers");
                return 0;
            };
            for sub in list {
                match sub.tx.try_send(Arc::clone(&event)) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        let _ = self.registry.dropped.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            workspace_id = %workspace_id,
                            subscriber_id = sub.id,
                            event_type = %event.event_type,
                            "subscriber queue full, event dropped"
                        );
                    }
                    Err(TrySendError::Closed(_)) => closed.push(sub.id),
                }
            }
        }
        if !closed.is_empty() {
            self.registry.remove(workspace_id, &closed);
            debug!(workspace_id = %workspace_id, pruned = closed.len(), "closed subscribers pruned");
        }
        debug!(
            workspace_id = %workspace_id,
            event_type = %event.event_type,
            recipients = delivered,
            "event published"
        );
        delivered
    }

    /// Subscribers across all workspaces.
    pub fn subscriber_count(&self) -> usize {
        self.registry.subscribers.read().values().map(Vec::len).sum()
    }

    /// Subscribers of one workspace.
    pub fn workspace_subscriber_count(&self, workspace_id: &WorkspaceId) -> usize {
        self.registry
            .subscribers
            .read()
            .get(workspace_id)
            .map_or(0, Vec::len)
    }

    /// Events dropped because a subscriber queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.registry.dropped.load(Ordering::Relaxed)
    }
}

/// A live subscription. Dropping it unsubscribes.
pub struct Subscription {
    registry: Arc<Registry>,
    workspace_id: WorkspaceId,
    id: u64,
    rx: mpsc::Receiver<Arc<ChangeEvent>>,
}

impl Subscription {
    /// Workspace this subscription listens to.
    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<ChangeEvent>> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting new events. Already queued events can still be read.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl Stream for Subscription {
    type Item = Arc<ChangeEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(&self.workspace_id, &[self.id]);
        debug!(workspace_id = %self.workspace_id, subscriber_id = self.id, "subscriber removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use stockroom_core::events::ChangeAction;
    use stockroom_logging::capture_logs;
    use tracing::Level;

    fn ws(id: &str) -> WorkspaceId {
        WorkspaceId::from(id)
    }

    fn event(workspace: &str, entity_id: &str) -> ChangeEvent {
        ChangeEvent::new(&ws(workspace), "item", ChangeAction::Created, entity_id)
    }

    #[tokio::test]
    async fn subscriber_receives_events_of_its_workspace() {
        let broadcaster = Broadcaster::new(8);
        let mut sub = broadcaster.subscribe(&ws("ws-a"));

        assert_eq!(broadcaster.publish(&ws("ws-a"), event("ws-a", "it-1")), 1);
        let received = sub.next().await.unwrap();
        assert_eq!(received.entity_id, "it-1");
        assert_eq!(received.event_type, "item.created");
    }

    #[tokio::test]
    async fn other_workspaces_are_not_notified() {
        let broadcaster = Broadcaster::new(8);
        let mut a = broadcaster.subscribe(&ws("ws-a"));
        let mut b = broadcaster.subscribe(&ws("ws-b"));

        assert_eq!(broadcaster.publish(&ws("ws-a"), event("ws-a", "it-1")), 1);
        assert!(a.try_recv().is_some());
        assert!(b.try_recv().is_none());
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy_in_order() {
        let broadcaster = Broadcaster::new(8);
        let mut first = broadcaster.subscribe(&ws("ws-a"));
        let mut second = broadcaster.subscribe(&ws("ws-a"));

        for n in 0..3 {
            let _ = broadcaster.publish(&ws("ws-a"), event("ws-a", &format!("it-{n}")));
        }
        for sub in [&mut first, &mut second] {
            let ids: Vec<String> = (0..3)
                .map(|_| sub.try_recv().unwrap().entity_id.clone())
                .collect();
            assert_eq!(ids, vec!["it-0", "it-1", "it-2"]);
        }
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let broadcaster = Broadcaster::new(8);
        assert_eq!(broadcaster.publish(&ws("ws-a"), event("ws-a", "it-1")), 0);
        assert_eq!(broadcaster.dropped_count(), 0);
    }

    #[test]
    fn full_queue_drops_and_warns() {
        let (logs, _guard) = capture_logs();
        let broadcaster = Broadcaster::new(1);
        let mut slow = broadcaster.subscribe(&ws("ws-a"));

        assert_eq!(broadcaster.publish(&ws("ws-a"), event("ws-a", "it-1")), 1);
        assert_eq!(broadcaster.publish(&ws("ws-a"), event("ws-a", "it-2")), 0);

        assert_eq!(broadcaster.dropped_count(), 1);
        assert!(logs.has_event(Level::WARN, "event dropped"));
        assert_eq!(slow.try_recv().unwrap().entity_id, "it-1");
        assert!(slow.try_recv().is_none());
        // The subscriber stays registered after a drop.
        assert_eq!(broadcaster.workspace_subscriber_count(&ws("ws-a")), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let broadcaster = Broadcaster::new(8);
        let a = broadcaster.subscribe(&ws("ws-a"));
        let b = broadcaster.subscribe(&ws("ws-a"));
        let c = broadcaster.subscribe(&ws("ws-b"));
        assert_eq!(broadcaster.subscriber_count(), 3);
        assert_eq!(broadcaster.workspace_subscriber_count(&ws("ws-a")), 2);

        drop(a);
        assert_eq!(broadcaster.workspace_subscriber_count(&ws("ws-a")), 1);
        drop(b);
        drop(c);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.workspace_subscriber_count(&ws("ws-a")), 0);
    }

    #[test]
    fn closed_subscribers_are_pruned_on_publish() {
        let broadcaster = Broadcaster::new(8);
        let mut closed = broadcaster.subscribe(&ws("ws-a"));
        let mut open = broadcaster.subscribe(&ws("ws-a"));
        closed.close();

        assert_eq!(broadcaster.publish(&ws("ws-a"), event("ws-a", "it-1")), 1);
        assert_eq!(broadcaster.workspace_subscriber_count(&ws("ws-a")), 1);
        assert!(open.try_recv().is_some());
        assert!(closed.try_recv().is_none());
    }

    #[test]
    fn zero_buffer_is_clamped() {
        let broadcaster = Broadcaster::new(0);
        let mut sub = broadcaster.subscribe(&ws("ws-a"));
        assert_eq!(broadcaster.publish(&ws("ws-a"), event("ws-a", "it-1")), 1);
        assert!(sub.try_recv().is_some());
    }

    #[tokio::test]
    async fn subscription_stream_ends_when_closed() {
        let broadcaster = Broadcaster::new(8);
        let mut sub = broadcaster.subscribe(&ws("ws-a"));
        let _ = broadcaster.publish(&ws("ws-a"), event("ws-a", "it-1"));
        sub.close();
        assert!(sub.next().await.is_some());
        assert!(sub.next().await.is_none());
    }
}
