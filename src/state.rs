use std::sync::Arc;

use axum::extract::FromRef;
use log::info;

use crate::conversation::{self, LogReporter, service::ConversationService, store::ConversationStore};
use crate::event::{
    self,
    service::{LogNotifier, NatsNotifier},
};
use crate::integration::{self, store::Substrate};
use crate::user::{self, repository::StoreUserRepository, service::UserServiceImpl};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub user_service: user::Service,
    pub conversation_service: conversation::Service,
}

impl AppState {
    pub async fn init(config: &integration::Config) -> Self {
        let substrate: Substrate = match &config.redis {
            Some(redis) => Arc::new(redis.connect().await),
            None => {
                info!("using in-memory storage");
                Arc::new(config.storage.connect())
            }
        };

        let event_service: event::Service = match &config.pubsub {
            Some(nats) => Arc::new(NatsNotifier::new(nats.connect().await)),
            None => {
                info!("notifications go to the log only");
                Arc::new(LogNotifier)
            }
        };

        Self::new(substrate, event_service, &config.conversation)
    }

    pub fn new(
        substrate: Substrate,
        event_service: event::Service,
        config: &conversation::Config,
    ) -> Self {
        let user_repo = StoreUserRepository::new(substrate.clone());
        let user_service: user::Service = Arc::new(UserServiceImpl::new(Arc::new(user_repo)));

        let store = ConversationStore::new(substrate, Arc::new(LogReporter), config.preview_budget);
        let conversation_service = ConversationService::new(
            store,
            user_service.clone(),
            event_service,
            config.max_attachment_bytes,
        );

        Self {
            user_service,
            conversation_service: Arc::new(conversation_service),
        }
    }
}
