//! ViewStateStore: observable per-screen key/value state.
//!
//! Writes go through a single-writer lock and publish a fresh immutable
//! snapshot, so readers never observe a half-applied update. Change
//! notifications are queued in commit order and delivered by whichever caller
//! wins the drain flag; a `set` issued from inside a listener is queued rather
//! than delivered re-entrantly.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;
use slotmap::{new_key_type, SlotMap};

use super::{lock, read, write};

/// A flat map from state key to value.
pub type ViewState = BTreeMap<String, Value>;

new_key_type! {
    /// Handle returned by [`ViewStateStore::subscribe`].
    pub struct SubscriptionId;
}

/// One committed update, as seen by listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    /// Monotonic commit counter (first commit is `1`).
    pub version: u64,
    /// Keys whose value changed (or were removed) in this commit.
    pub changed: BTreeSet<String>,
    /// The complete state right after this commit.
    pub snapshot: Arc<ViewState>,
}

type Listener = Arc<dyn Fn(&StateChange) + Send + Sync>;

struct Subscription {
    /// `None` means "every key".
    keys: Option<BTreeSet<String>>,
    listener: Listener,
}

impl Subscription {
    fn wants(&self, changed: &BTreeSet<String>) -> bool {
        match &self.keys {
            None => true,
            Some(keys) => !keys.is_disjoint(changed),
        }
    }
}

struct Committed {
    state: Arc<ViewState>,
    version: u64,
    mounted: bool,
}

/// Observable key/value store scoped to one mounted screen.
pub struct ViewStateStore {
    committed: RwLock<Committed>,
    writer: Mutex<()>,
    subscriptions: Mutex<SlotMap<SubscriptionId, Subscription>>,
    pending: Mutex<VecDeque<StateChange>>,
    draining: AtomicBool,
}

impl ViewStateStore {
    /// Create an empty, mounted store.
    pub fn new() -> Self {
        Self::with_initial(ViewState::new())
    }

    /// Create a mounted store seeded with `initial`. Seeding does not notify.
    pub fn with_initial(initial: ViewState) -> Self {
        Self {
            committed: RwLock::new(Committed {
                state: Arc::new(initial),
                version: 0,
                mounted: true,
            }),
            writer: Mutex::new(()),
            subscriptions: Mutex::new(SlotMap::with_key()),
            pending: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current value for `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        read(&self.committed).state.get(key).cloned()
    }

    /// The complete current state. Never reflects a partially applied write.
    pub fn snapshot(&self) -> Arc<ViewState> {
        Arc::clone(&read(&self.committed).state)
    }

    /// Number of commits applied so far.
    pub fn version(&self) -> u64 {
        read(&self.committed).version
    }

    /// Whether the owning screen is still mounted.
    pub fn is_mounted(&self) -> bool {
        read(&self.committed).mounted
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Apply all `updates` as one atomic commit, then notify listeners.
    ///
    /// Keys whose value is unchanged are not reported as changed; a commit
    /// with no effective change publishes nothing. Returns `false` if the
    /// store has been unmounted (the update is dropped).
    pub fn set<K, I>(&self, updates: I) -> bool
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let guard = lock(&self.writer);
        let change = {
            let mut committed = write(&self.committed);
            if !committed.mounted {
                return false;
            }
            let mut next = (*committed.state).clone();
            let mut changed = BTreeSet::new();
            for (key, value) in updates {
                let key = key.into();
                if next.get(&key) != Some(&value) {
                    changed.insert(key.clone());
                }
                next.insert(key, value);
            }
            if changed.is_empty() {
                return true;
            }
            committed.version += 1;
            committed.state = Arc::new(next);
            StateChange {
                version: committed.version,
                changed,
                snapshot: Arc::clone(&committed.state),
            }
        };
        tracing::debug!(version = change.version, keys = ?change.changed, "view state committed");
        // Enqueue while still holding the writer so queue order == commit order.
        lock(&self.pending).push_back(change);
        drop(guard);
        self.drain();
        true
    }

    /// Set a single key.
    pub fn set_one(&self, key: impl Into<String>, value: Value) -> bool {
        self.set([(key.into(), value)])
    }

    /// Remove every key as one commit. Listeners see all removed keys.
    pub fn clear(&self) {
        let guard = lock(&self.writer);
        let change = {
            let mut committed = write(&self.committed);
            if !committed.mounted || committed.state.is_empty() {
                return;
            }
            let changed: BTreeSet<String> = committed.state.keys().cloned().collect();
            committed.version += 1;
            committed.state = Arc::new(ViewState::new());
            StateChange {
                version: committed.version,
                changed,
                snapshot: Arc::clone(&committed.state),
            }
        };
        lock(&self.pending).push_back(change);
        drop(guard);
        self.drain();
    }

    /// Tear the store down: drop all state, listeners and queued notifications.
    ///
    /// Later `set` calls are ignored, which lets in-flight action chains detect
    /// the unmount and stop.
    pub fn unmount(&self) {
        let _guard = lock(&self.writer);
        {
            let mut committed = write(&self.committed);
            if !committed.mounted {
                return;
            }
            committed.mounted = false;
            committed.state = Arc::new(ViewState::new());
        }
        lock(&self.subscriptions).clear();
        lock(&self.pending).clear();
        tracing::debug!("view state unmounted");
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Call `listener` after every commit that changes one of `keys`.
    pub fn subscribe<S, I>(
        &self,
        keys: I,
        listener: impl Fn(&StateChange) + Send + Sync + 'static,
    ) -> SubscriptionId
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        self.insert_subscription(Some(keys), Arc::new(listener))
    }

    /// Call `listener` after every commit.
    pub fn subscribe_all(
        &self,
        listener: impl Fn(&StateChange) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.insert_subscription(None, Arc::new(listener))
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.subscriptions).remove(id).is_some()
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        lock(&self.subscriptions).len()
    }

    fn insert_subscription(
        &self,
        keys: Option<BTreeSet<String>>,
        listener: Listener,
    ) -> SubscriptionId {
        lock(&self.subscriptions).insert(Subscription { keys, listener })
    }

    // ── Notification ─────────────────────────────────────────────────

    fn drain(&self) {
        loop {
            if self
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                // Someone else is delivering; they will pick our change up.
                return;
            }

            loop {
                let next = lock(&self.pending).pop_front();
                let Some(change) = next else {
                    break;
                };
                let listeners: Vec<Listener> = lock(&self.subscriptions)
                    .values()
                    .filter(|sub| sub.wants(&change.changed))
                    .map(|sub| Arc::clone(&sub.listener))
                    .collect();
                for listener in listeners {
                    listener(&change);
                }
            }

            self.draining.store(false, Ordering::Release);

            // A change may have been queued between our last pop and the
            // flag reset.
            if lock(&self.pending).is_empty() {
                return;
            }
        }
    }
}

impl Default for ViewStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ViewStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let committed = read(&self.committed);
        f.debug_struct("ViewStateStore")
            .field("version", &committed.version)
            .field("mounted", &committed.mounted)
            .field("state", &committed.state)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn recorder(store: &ViewStateStore) -> Arc<Mutex<Vec<StateChange>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_c = Arc::clone(&log);
        store.subscribe_all(move |change| log_c.lock().unwrap().push(change.clone()));
        log
    }

    #[test]
    fn set_and_get() {
        let store = ViewStateStore::new();
        assert!(store.set([("a", json!(1)), ("b", json!("x"))]));
        assert_eq!(store.get("a"), Some(json!(1)));
        assert_eq!(store.get("b"), Some(json!("x")));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn with_initial_does_not_notify() {
        let mut initial = ViewState::new();
        initial.insert("count".into(), json!(3));
        let store = ViewStateStore::with_initial(initial);
        let log = recorder(&store);
        assert_eq!(store.get("count"), Some(json!(3)));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn listener_sees_whole_commit() {
        let store = ViewStateStore::new();
        let log = recorder(&store);
        store.set([("a", json!(1)), ("b", json!(2))]);

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        let change = &log[0];
        assert_eq!(change.version, 1);
        assert_eq!(
            change.changed,
            BTreeSet::from(["a".to_owned(), "b".to_owned()])
        );
        assert_eq!(change.snapshot.get("a"), Some(&json!(1)));
        assert_eq!(change.snapshot.get("b"), Some(&json!(2)));
    }

    #[test]
    fn unchanged_values_do_not_notify() {
        let store = ViewStateStore::new();
        store.set_one("a", json!(1));
        let log = recorder(&store);
        store.set_one("a", json!(1));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn keyed_subscription_filters() {
        let store = ViewStateStore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_c = Arc::clone(&hits);
        store.subscribe(["title"], move |_| {
            hits_c.fetch_add(1, Ordering::SeqCst);
        });
        store.set_one("other", json!(true));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        store.set([("title", json!("Hi")), ("other", json!(false))]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = ViewStateStore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_c = Arc::clone(&hits);
        let id = store.subscribe_all(move |_| {
            hits_c.fetch_add(1, Ordering::SeqCst);
        });
        store.set_one("a", json!(1));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_one("a", json!(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_inside_listener_is_queued_in_order() {
        let store = Arc::new(ViewStateStore::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let store_c = Arc::clone(&store);
        store.subscribe(["a"], move |change| {
            let a = change.snapshot.get("a").cloned().unwrap_or(Value::Null);
            store_c.set_one("b", a);
        });
        let seen_c = Arc::clone(&seen);
        store.subscribe_all(move |change| {
            seen_c.lock().unwrap().push(change.version);
        });

        store.set_one("a", json!(5));
        assert_eq!(store.get("b"), Some(json!(5)));
        // Commit 1 (a) is delivered fully before commit 2 (b).
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn clear_reports_removed_keys() {
        let store = ViewStateStore::new();
        store.set([("a", json!(1)), ("b", json!(2))]);
        let log = recorder(&store);
        store.clear();
        assert!(store.snapshot().is_empty());
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].changed.len(), 2);
    }

    #[test]
    fn unmount_drops_everything() {
        let store = ViewStateStore::new();
        store.set_one("a", json!(1));
        let log = recorder(&store);
        store.unmount();
        assert!(!store.is_mounted());
        assert_eq!(store.get("a"), None);
        assert_eq!(store.subscription_count(), 0);
        assert!(!store.set_one("a", json!(2)));
        assert_eq!(store.get("a"), None);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn concurrent_writers_never_tear() {
        let store = Arc::new(ViewStateStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.set([("a", json!(i)), ("b", json!(i))]);
                    }
                })
            })
            .collect();
        // Readers always see `a == b`: no half-applied commit is visible.
        for _ in 0..200 {
            let snap = store.snapshot();
            assert_eq!(snap.get("a"), snap.get("b"));
        }
        for h in handles {
            h.join().unwrap();
        }
        let snap = store.snapshot();
        assert_eq!(snap.get("a"), snap.get("b"));
    }
}
