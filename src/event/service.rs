use async_trait::async_trait;
use bytes::Bytes;
use log::{error, info};

use super::{Notification, Notifier, Subject};
use crate::user;

#[derive(Clone)]
pub struct NatsNotifier {
    pubsub: async_nats::Client,
}

impl NatsNotifier {
    pub fn new(pubsub: async_nats::Client) -> Self {
        Self { pubsub }
    }
}

#[async_trait]
impl Notifier for NatsNotifier {
    async fn notify(&self, recipient: &user::Id, sender_name: &str, text: &str) {
        let subject = Subject::Notifications(recipient);
        let noti = Notification::NewMessage {
            sender: sender_name.to_owned(),
            text: text.to_owned(),
        };

        if let Err(e) = self.pubsub.publish(&subject, Bytes::from(&noti)).await {
            error!("failed to publish notification to {subject}: {e:?}");
        }
    }
}

#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &user::Id, sender_name: &str, text: &str) {
        info!(
            "{}: new message for {recipient} from {sender_name}: {text}",
            Subject::Notifications(recipient)
        );
    }
}
