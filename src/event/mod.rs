use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::user;

pub mod service;

pub type Service = Arc<dyn Notifier + Send + Sync>;

pub enum Subject<'a> {
    Notifications(&'a user::Id),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    NewMessage { sender: String, text: String },
}

/// Fire-and-forget delivery. Implementations log their own failures.
#[async_trait]
pub trait Notifier {
    async fn notify(&self, recipient: &user::Id, sender_name: &str, text: &str);
}
