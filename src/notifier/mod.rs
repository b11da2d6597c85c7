//! Cross-view "branch changed" broadcast.
//!
//! Any view can subscribe, wherever it sits in the UI, and is told that the
//! active branch changed. The signal carries no payload: subscribers re-read
//! the persisted scope themselves, so a subscriber that handles an old signal
//! late still reads the newest branch.
//!
//! Delivery is synchronous to the subscriptions alive at broadcast time.
//! There is no replay: a subscription created after a broadcast must do its
//! own initial read.
//!
//! ```ignore
//! let watcher = BranchWatcher::new(BranchNotifier::global().subscribe(), store.reader());
//!
//! // In the view's update loop
//! if let Some(branch) = watcher.poll() {
//!     reload_for_branch(branch.as_deref());
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::debug;

use crate::store::ScopeReader;

/// Buffer used by the process-wide notifier.
pub const DEFAULT_CAPACITY: usize = 16;

static GLOBAL: OnceLock<BranchNotifier> = OnceLock::new();

/// Zero-payload signal: the active branch changed, re-read the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchChanged;

struct Subscriber {
    id: u64,
    sender: Sender<BranchChanged>,
}

struct NotifierInner {
    subscribers: Mutex<Vec<Subscriber>>,
    capacity: usize,
    next_id: AtomicU64,

    // Stats (atomic, no locks)
    broadcasts: AtomicU64,
    delivered: AtomicU64,
    coalesced: AtomicU64,
}

impl NotifierInner {
    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Broadcast channel for branch changes.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct BranchNotifier {
    inner: Arc<NotifierInner>,
}

impl BranchNotifier {
    /// Create an isolated notifier.
    ///
    /// Each subscription buffers at most `capacity` pending signals; further
    /// signals coalesce into the pending ones.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                subscribers: Mutex::new(Vec::new()),
                capacity: capacity.max(1),
                next_id: AtomicU64::new(0),
                broadcasts: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
            }),
        }
    }

    /// The process-wide notifier shared by every view.
    pub fn global() -> BranchNotifier {
        Self::global_with_capacity(DEFAULT_CAPACITY)
    }

    /// Like [`BranchNotifier::global`]; `capacity` only applies if this call
    /// creates the notifier.
    pub fn global_with_capacity(capacity: usize) -> BranchNotifier {
        GLOBAL
            .get_or_init(|| BranchNotifier::new(capacity))
            .clone()
    }

    /// Register a subscription; dropping it unsubscribes.
    pub fn subscribe(&self) -> BranchSubscription {
        let (sender, receiver) = bounded(self.inner.capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers().push(Subscriber { id, sender });

        BranchSubscription {
            id,
            receiver,
            notifier: Arc::downgrade(&self.inner),
        }
    }

    /// Signal every live subscription. Never blocks, never fails.
    ///
    /// Returns the number of subscriptions signalled.
    pub fn notify(&self) -> usize {
        self.inner.broadcasts.fetch_add(1, Ordering::Relaxed);

        let mut subscribers = self.inner.subscribers();
        let mut signalled = 0;
        subscribers.retain(|subscriber| match subscriber.sender.try_send(BranchChanged) {
            Ok(()) => {
                signalled += 1;
                self.inner.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(_)) => {
                // Already has a pending signal, which says the same thing
                signalled += 1;
                self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });

        debug!(subscribers = signalled, "Broadcast branch change");
        signalled
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }

    pub fn stats(&self) -> NotifierStats {
        NotifierStats {
            broadcasts: self.inner.broadcasts.load(Ordering::Relaxed),
            delivered: self.inner.delivered.load(Ordering::Relaxed),
            coalesced: self.inner.coalesced.load(Ordering::Relaxed),
        }
    }
}

impl Default for BranchNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Notifier statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifierStats {
    /// Calls to `notify`
    pub broadcasts: u64,
    /// Signals enqueued into a subscription
    pub delivered: u64,
    /// Signals folded into an already pending one
    pub coalesced: u64,
}

/// One view's registration with a [`BranchNotifier`].
pub struct BranchSubscription {
    id: u64,
    receiver: Receiver<BranchChanged>,
    notifier: Weak<NotifierInner>,
}

impl BranchSubscription {
    /// Take one pending signal without blocking.
    pub fn try_recv(&self) -> Option<BranchChanged> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for a signal.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BranchChanged> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Consume every pending signal; returns how many there were.
    pub fn drain(&self) -> usize {
        self.receiver.try_iter().count()
    }

    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }
}

impl Drop for BranchSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.notifier.upgrade() {
            inner.subscribers().retain(|s| s.id != self.id);
        }
    }
}

/// Subscription paired with a read-only scope, for views that only care
/// about "what is the branch now".
pub struct BranchWatcher {
    subscription: BranchSubscription,
    reader: ScopeReader,
}

impl BranchWatcher {
    pub fn new(subscription: BranchSubscription, reader: ScopeReader) -> Self {
        Self {
            subscription,
            reader,
        }
    }

    /// Initial read for a freshly mounted view.
    pub fn current(&self) -> Option<String> {
        self.reader.branch()
    }

    /// `Some(latest branch)` if at least one signal arrived since the last
    /// poll, `None` otherwise. Pending signals are collapsed into one read.
    pub fn poll(&self) -> Option<Option<String>> {
        if self.subscription.drain() == 0 {
            return None;
        }
        Some(self.reader.branch())
    }
}
