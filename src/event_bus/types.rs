use std::fmt;
use std::sync::Arc;

/// A unit of work routed by the bus.
///
/// Implementors are immutable once published. `topic` selects the handlers and
/// subscribers an event reaches; `name` identifies the concrete variant in logs.
/// Both must be pure functions of the variant.
pub trait Event: fmt::Debug + Send + Sync + 'static {
    /// Routing key (one per aggregate)
    fn topic(&self) -> &'static str;

    /// Variant discriminator, e.g. "CreateTodo"
    fn name(&self) -> &'static str;
}

/// Outcome of one handler executing one event
#[derive(Debug)]
pub struct EventResult<E> {
    pub succeeded: bool,
    pub event: Arc<E>,
    /// Optional handler payload (opaque to the bus)
    pub response: Option<serde_json::Value>,
}

// Manual impl: cloning shares the event, so `E` itself need not be `Clone`
impl<E> Clone for EventResult<E> {
    fn clone(&self) -> Self {
        Self {
            succeeded: self.succeeded,
            event: Arc::clone(&self.event),
            response: self.response.clone(),
        }
    }
}

impl<E: Event> EventResult<E> {
    pub fn success(event: Arc<E>) -> Self {
        Self {
            succeeded: true,
            event,
            response: None,
        }
    }

    pub fn failure(event: Arc<E>) -> Self {
        Self {
            succeeded: false,
            event,
            response: None,
        }
    }

    /// Attach a response payload
    pub fn with_response(mut self, response: serde_json::Value) -> Self {
        self.response = Some(response);
        self
    }

    pub fn topic(&self) -> &'static str {
        self.event.topic()
    }

    pub fn name(&self) -> &'static str {
        self.event.name()
    }
}

/// Observable state of the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// Waiting for an event or a stop signal
    Idle,
    /// Holding a dequeued event while a permit is acquired and its task spawned
    Dispatching,
    /// Loop not running
    Stopped,
}

impl DispatcherState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatcherState::Idle => "idle",
            DispatcherState::Dispatching => "dispatching",
            DispatcherState::Stopped => "stopped",
        }
    }

    pub(crate) fn as_u8(&self) -> u8 {
        match self {
            DispatcherState::Idle => 0,
            DispatcherState::Dispatching => 1,
            DispatcherState::Stopped => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::Idle,
            1 => DispatcherState::Dispatching,
            _ => DispatcherState::Stopped,
        }
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ping;

    impl Event for Ping {
        fn topic(&self) -> &'static str {
            "ping"
        }

        fn name(&self) -> &'static str {
            "Ping"
        }
    }

    #[test]
    fn test_result_constructors() {
        let event = Arc::new(Ping);

        let ok = EventResult::success(event.clone());
        assert!(ok.succeeded);
        assert!(ok.response.is_none());
        assert_eq!(ok.topic(), "ping");
        assert_eq!(ok.name(), "Ping");

        let failed = EventResult::failure(event).with_response(serde_json::json!({"id": 1}));
        assert!(!failed.succeeded);
        assert_eq!(failed.response, Some(serde_json::json!({"id": 1})));
    }

    #[test]
    fn test_state_roundtrip_through_u8() {
        for state in [
            DispatcherState::Idle,
            DispatcherState::Dispatching,
            DispatcherState::Stopped,
        ] {
            assert_eq!(DispatcherState::from_u8(state.as_u8()), state);
        }
        assert_eq!(DispatcherState::Stopped.to_string(), "stopped");
    }
}
