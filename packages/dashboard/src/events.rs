//! Session-scoped change notifications.
//!
//! Replaces a process-wide signal: each session owns one [`EventBus`] and
//! hands receivers to whatever needs to recompute on change (summary
//! cards, for instance).

use tokio::sync::broadcast;

/// Buffered events per receiver before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 32;

/// Something that changed in the session's local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A verified repair was appended to the history log.
    HistoryAppended {
        /// Id of the verified record.
        id: String,
        /// History length after the append.
        total: usize,
    },
    /// Active records changed status or contractor.
    RecordsChanged {
        /// Ids of the records that changed.
        ids: Vec<String>,
    },
}

/// Broadcast channel for [`DashboardEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashboardEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Sends `event` to every current receiver. Having none is fine.
    pub fn publish(&self, event: DashboardEvent) {
        log::debug!("Publishing {event:?}");
        if self.tx.send(event).is_err() {
            log::trace!("No subscribers for dashboard event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(DashboardEvent::HistoryAppended {
            id: "PH-1".to_string(),
            total: 3,
        });

        let expected = DashboardEvent::HistoryAppended {
            id: "PH-1".to_string(),
            total: 3,
        };
        assert_eq!(first.recv().await.unwrap(), expected);
        assert_eq!(second.recv().await.unwrap(), expected);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(DashboardEvent::RecordsChanged { ids: vec![] });
    }
}
