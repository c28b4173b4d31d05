//! Invalidation Events
//!
//! Every successful mutation through the `ApiClient` publishes an
//! `Invalidation` naming the resource kind it touched. Views subscribe and
//! decide for themselves what to reload, instead of each mutation call site
//! knowing which aggregate endpoints to re-fetch.
//!
//! Besides the broadcast channel, the bus keeps a version counter per
//! resource kind so a view can also poll "has anything changed since I
//! loaded?" without holding a receiver.

use crate::model::Id;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Kind of backend resource an invalidation refers to
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tasks,
    Schedules,
    Customers,
    Documents,
    Expenses,
    /// Expense categories and payment methods
    ExpenseSettings,
    RecurringExpenses,
    Account,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Tasks,
            ResourceKind::Schedules,
            ResourceKind::Customers,
            ResourceKind::Documents,
            ResourceKind::Expenses,
            ResourceKind::ExpenseSettings,
            ResourceKind::RecurringExpenses,
            ResourceKind::Account,
        ]
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Tasks => "tasks",
            ResourceKind::Schedules => "schedules",
            ResourceKind::Customers => "customers",
            ResourceKind::Documents => "documents",
            ResourceKind::Expenses => "expenses",
            ResourceKind::ExpenseSettings => "expense_settings",
            ResourceKind::RecurringExpenses => "recurring_expenses",
            ResourceKind::Account => "account",
        };
        f.write_str(name)
    }
}

/// What happened to the resource
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    Created,
    Updated,
    Deleted,
    /// Files attached (business cards, documents, receipts)
    Uploaded,
    /// Entries generated server-side (recurring expenses)
    Generated,
    /// Login, logout, token rotation
    SessionChanged,
}

/// A single invalidation notice
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Invalidation {
    pub kind: ResourceKind,
    pub mutation: Mutation,
    /// Affected record, when the mutation targets one
    pub id: Option<Id>,
    /// Version of `kind` after this mutation
    pub version: u64,
}

/// Configuration for the invalidation bus
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Capacity of the broadcast channel; slow receivers past this lag
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Publish/subscribe hub for invalidations. Clones share the same channel.
#[derive(Clone)]
pub struct InvalidationBus {
    tx: broadcast::Sender<Invalidation>,
    versions: Arc<HashMap<ResourceKind, AtomicU64>>,
}

impl InvalidationBus {
    pub fn new(config: BusConfig) -> Self {
        let (tx, _) = broadcast::channel(config.capacity.max(1));
        let versions = ResourceKind::all()
            .iter()
            .map(|kind| (*kind, AtomicU64::new(0)))
            .collect();

        Self {
            tx,
            versions: Arc::new(versions),
        }
    }

    /// Record a mutation and notify subscribers
    ///
    /// Returns the new version of `kind`. Publishing with no subscribers is fine.
    pub fn publish(&self, kind: ResourceKind, mutation: Mutation, id: Option<Id>) -> u64 {
        let version = self
            .versions
            .get(&kind)
            .map(|v| v.fetch_add(1, Ordering::SeqCst) + 1)
            .unwrap_or(0);

        let event = Invalidation {
            kind,
            mutation,
            id,
            version,
        };

        tracing::debug!(kind = %kind, mutation = ?mutation, id = ?id, version, "Invalidation published");

        // Err only means nobody is listening right now
        let _ = self.tx.send(event);
        version
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.tx.subscribe()
    }

    /// Current version of a resource kind (0 = never mutated)
    pub fn version(&self, kind: ResourceKind) -> u64 {
        self.versions
            .get(&kind)
            .map(|v| v.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl std::fmt::Debug for InvalidationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationBus")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

/// Drain every invalidation currently queued on `rx`
///
/// Lagged receivers report a synthetic invalidation for every kind, since
/// the dropped events can no longer be known.
pub fn drain(rx: &mut broadcast::Receiver<Invalidation>) -> Vec<Invalidation> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Invalidation receiver lagged");
                events.extend(ResourceKind::all().iter().map(|kind| Invalidation {
                    kind: *kind,
                    mutation: Mutation::Updated,
                    id: None,
                    version: 0,
                }));
            }
            Err(_) => break,
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_bumps_version_per_kind() {
        let bus = InvalidationBus::default();
        assert_eq!(bus.version(ResourceKind::Tasks), 0);

        assert_eq!(bus.publish(ResourceKind::Tasks, Mutation::Created, Some(1)), 1);
        assert_eq!(bus.publish(ResourceKind::Tasks, Mutation::Updated, Some(1)), 2);
        assert_eq!(bus.version(ResourceKind::Tasks), 2);
        assert_eq!(bus.version(ResourceKind::Schedules), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = InvalidationBus::default();
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(ResourceKind::Schedules, Mutation::Deleted, Some(5));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ResourceKind::Schedules);
        assert_eq!(event.mutation, Mutation::Deleted);
        assert_eq!(event.id, Some(5));
    }

    #[test]
    fn test_drain_collects_pending() {
        let bus = InvalidationBus::default();
        let mut rx = bus.subscribe();
        bus.publish(ResourceKind::Tasks, Mutation::Created, None);
        bus.publish(ResourceKind::Expenses, Mutation::Generated, None);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_drain_after_lag_invalidates_everything() {
        let bus = InvalidationBus::new(BusConfig { capacity: 1 });
        let mut rx = bus.subscribe();
        for _ in 0..3 {
            bus.publish(ResourceKind::Tasks, Mutation::Updated, None);
        }

        let kinds: Vec<ResourceKind> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
        for kind in ResourceKind::all() {
            assert!(kinds.contains(kind));
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = InvalidationBus::default();
        assert_eq!(bus.publish(ResourceKind::Account, Mutation::SessionChanged, None), 1);
    }
}
