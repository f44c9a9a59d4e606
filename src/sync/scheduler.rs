use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancellable delayed actions keyed by id. Scheduling a key again re-arms
/// its timer and drops the previously scheduled action.
///
pub struct Scheduler<K> {
    timers: Arc<Mutex<HashMap<K, (u64, JoinHandle<()>)>>>,
    generation: AtomicU64,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Scheduler {
            timers: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<K> Scheduler<K>
where
    K: Clone + Eq + Hash + Send + 'static,
{
    pub fn new() -> Scheduler<K> {
        Scheduler::default()
    }

    /// Run `action` after `delay` unless the key is re-armed or cancelled
    /// first. Must be called from within a tokio runtime.
    ///
    pub fn schedule<F>(&self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let timers = Arc::clone(&self.timers);
        // Held until the handle is stored so the timer task always finds it.
        let mut guard = lock(&self.timers);
        let own_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut timers = lock(&timers);
                match timers.get(&own_key) {
                    Some((current, _)) if *current == generation => {
                        timers.remove(&own_key);
                    }
                    _ => return,
                }
            }
            action.await;
        });
        if let Some((_, previous)) = guard.insert(key, (generation, handle)) {
            previous.abort();
        }
    }

    /// Drop the pending action for a key. Returns whether one was pending.
    ///
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.timers).remove(key) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, (_, handle)) in lock(&self.timers).drain() {
            handle.abort();
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.timers).contains_key(key)
    }
}

impl<K> Drop for Scheduler<K> {
    fn drop(&mut self) {
        for (_, (_, handle)) in lock(&self.timers).drain() {
            handle.abort();
        }
    }
}
