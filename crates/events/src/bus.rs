use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use crate::types::{Event, EventEnvelope};

const DEFAULT_CAPACITY: usize = 1000;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    event_count: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            event_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns how many subscribers received the envelope. With nobody
    /// listening the event is dropped and 0 is returned.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.event_count.fetch_add(1, Ordering::Relaxed);
        self.sender.send(envelope).unwrap_or(0)
    }

    pub fn emit(&self, event: Event) -> usize {
        self.publish(EventEnvelope::new(event))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Events for one deployment only.
    pub fn subscribe_deployment(&self, deployment_id: Uuid) -> DeploymentEvents {
        DeploymentEvents {
            deployment_id,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn event_count(&self) -> usize {
        self.event_count.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("event_count", &self.event_count())
            .finish()
    }
}

pub struct DeploymentEvents {
    deployment_id: Uuid,
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl DeploymentEvents {
    /// Next event for this deployment, `None` once the bus is gone. Lagged
    /// receivers skip what they missed and keep going.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.event.deployment_id() == self.deployment_id => {
                    return Some(envelope)
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        deployment_id = %self.deployment_id,
                        "Event subscriber lagged, skipped {} events",
                        skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the terminal status change and returns it.
    pub async fn wait_terminal(&mut self) -> Option<EventEnvelope> {
        while let Some(envelope) = self.next().await {
            if envelope.event.is_terminal() {
                return Some(envelope);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_core::{DeploymentStatus, LogStep};

    fn created(id: Uuid) -> Event {
        Event::DeploymentCreated {
            deployment_id: id,
            chain_name: "my-chain".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let envelope = EventEnvelope::new(created(Uuid::new_v4()));
        let sent = bus.publish(envelope.clone());
        assert_eq!(sent, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, envelope.id);
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(created(Uuid::new_v4())), 0);
        assert_eq!(bus.event_count(), 1);
    }

    #[tokio::test]
    async fn test_deployment_subscription_filters() {
        let bus = EventBus::new();
        let ours = Uuid::new_v4();
        let mut events = bus.subscribe_deployment(ours);

        bus.emit(created(Uuid::new_v4()));
        bus.emit(Event::DeploymentLogAppended {
            deployment_id: ours,
            log_id: 1,
            step: LogStep::Connect,
        });

        let received = events.next().await.unwrap();
        assert_eq!(received.event.deployment_id(), ours);
    }

    #[tokio::test]
    async fn test_wait_terminal() {
        let bus = EventBus::new();
        let id = Uuid::new_v4();
        let mut events = bus.subscribe_deployment(id);

        bus.emit(Event::DeploymentStatusChanged {
            deployment_id: id,
            from: DeploymentStatus::Queued,
            to: DeploymentStatus::Connecting,
            message: None,
        });
        bus.emit(Event::DeploymentStatusChanged {
            deployment_id: id,
            from: DeploymentStatus::Connecting,
            to: DeploymentStatus::Failed,
            message: Some("Connection failed".to_string()),
        });

        let terminal = events.wait_terminal().await.unwrap();
        assert_eq!(terminal.event.status(), Some(DeploymentStatus::Failed));
    }

    #[test]
    fn test_clone_shares_channel() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let _rx = bus2.subscribe();
        assert_eq!(bus1.subscriber_count(), 1);
    }
}
