use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// A lifecycle event at a commit point. `name` is one of the
/// [`crate::constants::events`] constants.
#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
    pub name: &'static str,
    pub job_id: Uuid,
    /// The user whose action produced the event, when there is one.
    pub actor_id: Option<Uuid>,
    pub payload: Value,
    pub published_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(name: &'static str, job_id: Uuid, actor_id: Option<Uuid>, payload: Value) -> Self {
        Self {
            name,
            job_id,
            actor_id,
            payload,
            published_at: Utc::now(),
        }
    }
}

/// In-process event fan-out.
///
/// Publishing never fails and never blocks. With no subscribers the event is
/// dropped; that is the expected state for embeddings that don't consume
/// events.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to every current subscriber. Returns the number of
    /// subscribers the event reached.
    pub fn publish(&self, event: DomainEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(event = event.name, job_id = %event.job_id, "no event subscribers");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
