use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::dispatcher::Dispatcher;
use super::handler::{EventHandler, EventSubscriber};
use super::queue::EventQueue;
use super::types::{DispatcherState, Event};
use crate::config::EventSettings;

/// In-process publish/subscribe engine
///
/// `publish` is fire-and-forget: the caller learns nothing about whether the
/// event was queued, handled or dropped. Cloning the bus shares the same queue,
/// registries and dispatch loop.
pub struct EventBus<E: Event> {
    inner: Arc<Inner<E>>,
}

struct Inner<E: Event> {
    queue: EventQueue<E>,
    dispatcher: Arc<Dispatcher<E>>,
    shutdown: watch::Sender<bool>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
    // Set by `run` while the previous loop is still winding down
    restart_pending: AtomicBool,
}

impl<E: Event> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Event> EventBus<E> {
    /// Create a bus with a queue of `channel_buffer_size` events and a budget
    /// of `max_workers` concurrently handled events (both clamped to >= 1)
    pub fn new(channel_buffer_size: usize, max_workers: usize) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                queue: EventQueue::new(channel_buffer_size),
                dispatcher: Arc::new(Dispatcher::new(max_workers)),
                shutdown,
                loop_handle: Mutex::new(None),
                restart_pending: AtomicBool::new(false),
            }),
        }
    }

    pub fn from_settings(settings: &EventSettings) -> Self {
        Self::new(settings.channel_buffer_size, settings.max_workers)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start the dispatch loop as a background task
    ///
    /// Must be called from within a Tokio runtime. Calling it while a loop is
    /// already draining the queue only logs a warning. Calling it while a
    /// stopped loop is still winding down schedules the restart for when that
    /// loop has exited; a `stop` issued in between cancels the restart.
    pub fn run(&self) {
        let mut slot = self
            .inner
            .loop_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(rx) = self.inner.queue.take_receiver() {
            *slot = Some(self.spawn_loop(rx));
            return;
        }

        if !*self.inner.shutdown.borrow() {
            warn!("event bus already running");
            return;
        }

        let Some(previous) = slot.take() else {
            warn!("event bus still stopping, call wait_stopped before run");
            return;
        };

        debug!("event bus still stopping, restart deferred");
        self.inner.restart_pending.store(true, Ordering::SeqCst);

        let bus = self.clone();
        *slot = Some(tokio::spawn(async move {
            if let Err(e) = previous.await {
                error!("event dispatcher task failed: {}", e);
            }

            // Holding the slot lock orders the restart against `stop`
            let handle = {
                let _slot = bus
                    .inner
                    .loop_handle
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);

                if !bus.inner.restart_pending.swap(false, Ordering::SeqCst) {
                    debug!("deferred restart cancelled by stop");
                    return;
                }

                let Some(rx) = bus.inner.queue.take_receiver() else {
                    warn!("event bus already running");
                    return;
                };

                bus.spawn_loop(rx)
            };

            if let Err(e) = handle.await {
                error!("event dispatcher task failed: {}", e);
            }
        }));
    }

    fn spawn_loop(&self, rx: mpsc::Receiver<Arc<E>>) -> JoinHandle<()> {
        self.inner.shutdown.send_replace(false);
        let shutdown = self.inner.shutdown.subscribe();
        self.inner.dispatcher.set_state(DispatcherState::Idle);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let rx = inner.dispatcher.clone().run_loop(rx, shutdown).await;
            inner.queue.restore_receiver(rx);
            debug!("event queue receiver released");
        })
    }

    /// Ask the dispatch loop to stop
    ///
    /// Returns immediately. Events still queued stay queued; events already
    /// handed to a worker run to completion.
    pub fn stop(&self) {
        let _slot = self
            .inner
            .loop_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.restart_pending.store(false, Ordering::SeqCst);
        self.inner.shutdown.send_replace(true);
    }

    /// Wait until the dispatch loop has exited (no-op when it never ran)
    pub async fn wait_stopped(&self) {
        let handle = self
            .inner
            .loop_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("event dispatcher task failed: {}", e);
            }
        }
    }

    // ========================================================================
    // Publishing
    // ========================================================================

    /// Queue an event for dispatch
    ///
    /// Never blocks. When the queue is full the event is dropped without any
    /// signal to the caller.
    pub fn publish(&self, event: impl Into<E>) {
        self.inner.queue.push(Arc::new(event.into()));
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub async fn register_handler(&self, topic: &str, handler: Arc<dyn EventHandler<E>>) {
        debug!(topic = %topic, handler = handler.name(), "registering event handler");
        self.inner.dispatcher.handlers().register(topic, handler).await;
    }

    pub async fn unregister_handler(&self, topic: &str, handler: &Arc<dyn EventHandler<E>>) {
        let removed = self.inner.dispatcher.handlers().unregister(topic, handler).await;
        debug!(topic = %topic, removed, "unregistered event handler");
    }

    pub async fn register_subscriber(&self, topic: &str, subscriber: Arc<dyn EventSubscriber<E>>) {
        debug!(topic = %topic, subscriber = subscriber.name(), "registering event subscriber");
        self.inner.dispatcher.subscribers().register(topic, subscriber).await;
    }

    pub async fn unregister_subscriber(
        &self,
        topic: &str,
        subscriber: &Arc<dyn EventSubscriber<E>>,
    ) {
        let removed = self
            .inner
            .dispatcher
            .subscribers()
            .unregister(topic, subscriber)
            .await;
        debug!(topic = %topic, removed, "unregistered event subscriber");
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn state(&self) -> DispatcherState {
        self.inner.dispatcher.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() != DispatcherState::Stopped
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.inner.queue.capacity()
    }

    /// Events dropped because the queue was full
    pub fn dropped_events(&self) -> u64 {
        self.inner.queue.dropped()
    }

    /// Events currently being handled
    pub fn in_flight(&self) -> usize {
        self.inner.dispatcher.limiter().in_flight()
    }

    pub fn max_workers(&self) -> usize {
        self.inner.dispatcher.limiter().max_workers()
    }

    pub async fn handler_count(&self, topic: &str) -> usize {
        self.inner.dispatcher.handlers().count(topic).await
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.inner.dispatcher.subscribers().count(topic).await
    }
}
