use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

/// Notification fanned out to a user's subscribers when their project list
/// changed and should be re-fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectsEvent {
    ListChanged,
}

type SenderSlot = (u64, mpsc::UnboundedSender<ProjectsEvent>);
type Registry = Arc<RwLock<HashMap<String, Vec<SenderSlot>>>>;

/// In-process pub/sub for project list changes, keyed by user. Mutating
/// handlers publish; interested parties hold a [`ProjectsSubscription`],
/// which unregisters itself on drop.
#[derive(Clone, Default)]
pub struct ProjectsHub {
    subscribers: Registry,
    next_id: Arc<AtomicU64>,
}

impl ProjectsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, user_id: &str) -> ProjectsSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut map = self.subscribers.write().unwrap();
        map.entry(user_id.to_string()).or_default().push((id, tx));

        ProjectsSubscription {
            id,
            user_id: user_id.to_string(),
            receiver: rx,
            registry: Arc::clone(&self.subscribers),
        }
    }

    /// Deliver `ListChanged` to every live subscriber of a user. Dead
    /// senders are pruned on the way.
    pub fn project_list_changed(&self, user_id: &str) {
        let mut map = match self.subscribers.write() {
            Ok(map) => map,
            Err(_) => return,
        };
        let Some(senders) = map.get_mut(user_id) else {
            return;
        };

        senders.retain(|(_, sender)| sender.send(ProjectsEvent::ListChanged).is_ok());
        if senders.is_empty() {
            map.remove(user_id);
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self, user_id: &str) -> usize {
        self.subscribers
            .read()
            .unwrap()
            .get(user_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// One subscriber's end of the hub. Dropping it removes the registration.
pub struct ProjectsSubscription {
    id: u64,
    user_id: String,
    receiver: mpsc::UnboundedReceiver<ProjectsEvent>,
    registry: Registry,
}

impl ProjectsSubscription {
    pub async fn recv(&mut self) -> Option<ProjectsEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ProjectsEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for ProjectsSubscription {
    fn drop(&mut self) {
        if let Ok(mut map) = self.registry.write() {
            if let Some(senders) = map.get_mut(&self.user_id) {
                senders.retain(|(id, _)| *id != self.id);
                if senders.is_empty() {
                    map.remove(&self.user_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notifies_every_subscriber_of_the_user() {
        let hub = ProjectsHub::new();
        let mut first = hub.subscribe("alice");
        let mut second = hub.subscribe("alice");

        hub.project_list_changed("alice");

        assert_eq!(first.try_recv(), Some(ProjectsEvent::ListChanged));
        assert_eq!(second.try_recv(), Some(ProjectsEvent::ListChanged));
    }

    #[tokio::test]
    async fn does_not_cross_users() {
        let hub = ProjectsHub::new();
        let mut alice = hub.subscribe("alice");
        let mut bob = hub.subscribe("bob");

        hub.project_list_changed("alice");

        assert_eq!(alice.try_recv(), Some(ProjectsEvent::ListChanged));
        assert_eq!(bob.try_recv(), None);
    }

    #[tokio::test]
    async fn drop_unregisters_the_subscription() {
        let hub = ProjectsHub::new();
        let subscription = hub.subscribe("alice");
        assert_eq!(hub.subscriber_count("alice"), 1);

        drop(subscription);
        assert_eq!(hub.subscriber_count("alice"), 0);

        // Publishing to a user with no subscribers is a no-op.
        hub.project_list_changed("alice");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_harmless() {
        let hub = ProjectsHub::new();
        hub.project_list_changed("nobody");
        assert_eq!(hub.subscriber_count("nobody"), 0);
    }
}
