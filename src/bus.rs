//! Session event bus for UI-wide notifications.
//!
//! Process-wide pub/sub with explicit subscribe/notify semantics: stores and
//! background tasks publish [`SessionEvent`]s; the TUI shell subscribes and
//! reacts (status notices, selection changes). Events are fire-and-forget, a
//! publish with no live subscriber is dropped silently.

use std::sync::Arc;
use tokio::sync::broadcast;

/// Severity of an operator-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Events published on the session bus.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A dismissible status-line notice (the TUI's toast).
    Notice { level: NoticeLevel, message: String },
    /// The active conversation changed.
    ConversationSelected { id: String },
    /// A collection was mutated and re-fetched; views holding derived state
    /// should refresh.
    CollectionRefreshed { resource: &'static str },
}

/// Session event bus backed by a broadcast channel.
pub struct SessionBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Convenience: publish a notice.
    pub fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.publish(SessionEvent::Notice {
            level,
            message: message.into(),
        });
    }
}

/// Global session bus instance.
static GLOBAL_BUS: std::sync::LazyLock<Arc<SessionBus>> =
    std::sync::LazyLock::new(|| Arc::new(SessionBus::new()));

/// Get the global session bus.
pub fn global() -> Arc<SessionBus> {
    GLOBAL_BUS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = SessionBus::new();
        let mut rx = bus.subscribe();

        bus.notice(NoticeLevel::Success, "provider created");

        match rx.recv().await.unwrap() {
            SessionEvent::Notice { level, message } => {
                assert_eq!(level, NoticeLevel::Success);
                assert_eq!(message, "provider created");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscriber_is_silent() {
        let bus = SessionBus::new();
        bus.notice(NoticeLevel::Info, "nobody listening");
    }
}
