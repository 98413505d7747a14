//! Self-dismissing user messages.
//!
//! [`TransientSlots`] keeps at most one message per key and removes it after a
//! fixed delay. Showing a new message under the same key aborts the pending
//! dismissal and starts a fresh one. Dropping the last handle aborts every
//! pending dismissal.
use std::{
    collections::BTreeMap,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(3);

struct Entry {
    message: String,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Slots<K> {
    entries: BTreeMap<K, Entry>,
    next_generation: u64,
}

impl<K> Drop for Slots<K> {
    fn drop(&mut self) {
        for entry in self.entries.values() {
            if let Some(timer) = &entry.timer {
                timer.abort();
            }
        }
    }
}

#[derive(Clone)]
pub struct TransientSlots<K> {
    ttl: Duration,
    inner: Arc<Mutex<Slots<K>>>,
}

impl<K> TransientSlots<K>
where
    K: Ord + Clone + Debug + Send + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(Slots {
                entries: BTreeMap::new(),
                next_generation: 0,
            })),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replace the message under `key` and (re)arm its dismissal.
    pub fn show(&self, key: K, message: impl Into<String>) {
        let message = message.into();
        let mut slots = lock(&self.inner);
        let generation = slots.next_generation;
        slots.next_generation += 1;

        let timer = self.arm(key.clone(), generation);
        debug!(?key, %message, "showing transient message");

        let replaced = slots.entries.insert(
            key,
            Entry {
                message,
                generation,
                timer,
            },
        );
        if let Some(timer) = replaced.and_then(|entry| entry.timer) {
            timer.abort();
        }
    }

    pub fn get(&self, key: &K) -> Option<String> {
        lock(&self.inner)
            .entries
            .get(key)
            .map(|entry| entry.message.clone())
    }

    pub fn clear(&self, key: &K) {
        if let Some(timer) = lock(&self.inner)
            .entries
            .remove(key)
            .and_then(|entry| entry.timer)
        {
            timer.abort();
        }
    }

    /// Drop every message and cancel every pending dismissal.
    pub fn clear_all(&self) {
        let drained = std::mem::take(&mut lock(&self.inner).entries);
        for timer in drained.into_values().filter_map(|entry| entry.timer) {
            timer.abort();
        }
    }

    pub fn all(&self) -> BTreeMap<K, String> {
        lock(&self.inner)
            .entries
            .iter()
            .map(|(k, entry)| (k.clone(), entry.message.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).entries.is_empty()
    }

    fn arm(&self, key: K, generation: u64) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(?key, "no async runtime, message will not auto-dismiss");
            return None;
        };
        let slots: Weak<Mutex<Slots<K>>> = Arc::downgrade(&self.inner);
        let ttl = self.ttl;

        Some(runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(slots) = slots.upgrade() else {
                return;
            };
            let mut slots = lock(&slots);
            if slots
                .entries
                .get(&key)
                .is_some_and(|entry| entry.generation == generation)
            {
                slots.entries.remove(&key);
                debug!(?key, "transient message dismissed");
            }
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    Success,
    Error,
}

/// One success and one error banner per screen.
#[derive(Clone)]
pub struct MessageBus {
    slots: TransientSlots<MessageKind>,
}

impl MessageBus {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: TransientSlots::new(ttl),
        }
    }
    pub fn show(&self, kind: MessageKind, message: impl Into<String>) {
        self.slots.show(kind, message);
    }
    pub fn show_success(&self, message: impl Into<String>) {
        self.show(MessageKind::Success, message);
    }
    pub fn show_error(&self, message: impl Into<String>) {
        self.show(MessageKind::Error, message);
    }
    pub fn success(&self) -> Option<String> {
        self.slots.get(&MessageKind::Success)
    }
    pub fn error(&self) -> Option<String> {
        self.slots.get(&MessageKind::Error)
    }
    pub fn dismiss(&self, kind: MessageKind) {
        self.slots.clear(&kind);
    }
    pub fn clear(&self) {
        self.slots.clear_all();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TTL)
    }
}

/// Per-field validation messages, keyed by the field's dot path.
#[derive(Clone)]
pub struct FieldErrors {
    slots: TransientSlots<String>,
}

impl FieldErrors {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: TransientSlots::new(ttl),
        }
    }
    pub fn flash(&self, field: impl Into<String>, message: impl Into<String>) {
        self.slots.show(field.into(), message);
    }
    pub fn get(&self, field: &str) -> Option<String> {
        self.slots.get(&field.to_owned())
    }
    pub fn clear(&self, field: &str) {
        self.slots.clear(&field.to_owned());
    }
    pub fn clear_all(&self) {
        self.slots.clear_all();
    }
    pub fn all(&self) -> BTreeMap<String, String> {
        self.slots.all()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for FieldErrors {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TTL)
    }
}
