//! Time-delay primitives that coalesce bursts of changes.
//!
//! Both types schedule work on the ambient tokio runtime, so they must be
//! driven from within one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Delay used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(recipe_core::config::DEFAULT_DEBOUNCE_MS);

/// Invokes a callback once its input has been stable for the full delay.
///
/// Each [`call`](Debouncer::call) cancels the emission scheduled by the
/// previous one, so only the arguments of the last call in a burst reach the
/// callback. Dropping the debouncer cancels anything still pending.
pub struct Debouncer<A> {
    delay: Duration,
    callback: Arc<dyn Fn(A) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A> Debouncer<A>
where
    A: Send + 'static,
{
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    pub fn with_default_delay<F>(callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::new(DEFAULT_DEBOUNCE, callback)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `args` for delivery, replacing any pending emission.
    pub fn call(&self, args: A) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let callback = self.callback.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(args);
        }));
    }

    /// Cancels the pending emission. Returns true if one was still waiting.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

/// A value whose published copy trails the input by a debounce window.
///
/// [`set`](DebouncedValue::set) records the latest input; subscribers only
/// observe it once no newer input arrived for the full delay.
pub struct DebouncedValue<T> {
    published: Arc<watch::Sender<T>>,
    debouncer: Debouncer<T>,
}

impl<T> DebouncedValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (sender, _) = watch::channel(initial);
        let published = Arc::new(sender);
        let target = published.clone();
        let debouncer = Debouncer::new(delay, move |value: T| {
            target.send_replace(value);
        });
        Self {
            published,
            debouncer,
        }
    }

    pub fn set(&self, value: T) {
        self.debouncer.call(value);
    }

    /// The most recently published (settled) value.
    pub fn get(&self) -> T {
        self.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.published.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Drops the pending input, keeping the last published value.
    pub fn cancel(&self) -> bool {
        self.debouncer.cancel()
    }
}
