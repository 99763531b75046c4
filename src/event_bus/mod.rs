// Event Bus
//
// In-process dispatcher for write commands. Callers publish events into a
// bounded queue; a single loop drains it and hands each event to the handlers
// registered for its topic, within a global concurrency budget. Results are
// relayed to the topic's subscribers. Nothing is persisted or retried.

pub mod bus;
pub mod dispatcher;
pub mod handler;
pub mod limiter;
pub mod queue;
pub mod registry;
pub mod types;

pub use bus::EventBus;
pub use dispatcher::Dispatcher;
pub use handler::{EventHandler, EventSubscriber};
pub use limiter::ConcurrencyLimiter;
pub use queue::EventQueue;
pub use registry::Registry;
pub use types::{DispatcherState, Event, EventResult};
