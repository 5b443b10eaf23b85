use std::cmp::Ordering;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use futures::future::join_all;
use log::{debug, warn};

use super::model::{Attachment, Draft, InboxEntry, Message, Preview, Sent, Upload, truncate};
use super::store::ConversationStore;
use super::{Error, Key};
use crate::user::model::{Identity, User};
use crate::{event, user};

const NOTIFICATION_BUDGET: usize = 30;
const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Clone)]
pub struct ConversationService {
    store: Arc<ConversationStore>,
    user_service: user::Service,
    event_service: event::Service,
    max_attachment_bytes: usize,
}

impl ConversationService {
    pub fn new(
        store: ConversationStore,
        user_service: user::Service,
        event_service: event::Service,
        max_attachment_bytes: usize,
    ) -> Self {
        Self {
            store: Arc::new(store),
            user_service,
            event_service,
            max_attachment_bytes,
        }
    }
}

impl ConversationService {
    pub async fn open(&self, identity: &Identity) -> super::Result<Vec<Message>> {
        let key = key_of(identity)?;
        Ok(self.store.load(&key).await)
    }

    pub async fn send(&self, identity: &Identity, draft: Draft) -> super::Result<Sent> {
        let key = key_of(identity)?;

        if draft.content.trim().is_empty() && draft.file.is_none() {
            return Err(Error::EmptyMessage);
        }

        let attachment = draft
            .file
            .map(|upload| self.materialize(upload))
            .transpose()?;

        let message = Message::new(
            identity.current.clone(),
            Some(identity.counterpart.clone()),
            draft.content,
            attachment,
        );
        let summary = truncate(message.summary_text(), NOTIFICATION_BUDGET);

        let appended = self.store.append(&key, message).await?;
        let persisted = appended.is_persisted();

        if persisted {
            self.notify(identity, &summary).await;
        } else {
            debug!("skipping notification for unsaved message in {key}");
        }

        Ok(Sent {
            messages: appended.messages,
            persisted,
        })
    }

    pub async fn preview(&self, identity: &Identity) -> super::Result<Preview> {
        let key = key_of(identity)?;
        Ok(self.store.preview(&key).await)
    }

    /// Every other user in the directory with the preview of the
    /// conversation with them, most recent first.
    pub async fn inbox(&self, current: &User) -> super::Result<Vec<InboxEntry>> {
        let users = self.user_service.find_all().await?;

        let mut entries = join_all(
            users
                .into_iter()
                .filter(|u| u.id.ne(&current.id))
                .map(|u| async move {
                    match Key::for_pair(&current.id, &u.id) {
                        Ok(key) => Some(InboxEntry {
                            preview: self.store.preview(&key).await,
                            user: u,
                        }),
                        Err(e) => {
                            warn!("skipping inbox entry: {e}");
                            None
                        }
                    }
                }),
        )
        .await
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

        entries.sort_by(by_recency);
        Ok(entries)
    }
}

impl ConversationService {
    // The message is already stored here, so a failed lookup only costs the
    // notification.
    async fn notify(&self, identity: &Identity, summary: &str) {
        match self.user_service.find(&identity.current).await {
            Ok(sender) => {
                self.event_service
                    .notify(&identity.counterpart, &sender.username, summary)
                    .await
            }
            Err(e) => warn!(
                "not notifying {} about a message from {}: {e}",
                identity.counterpart, identity.current
            ),
        }
    }

    /// Turns an upload into an inline `data:` locator so the attachment lives
    /// as long as the message does.
    fn materialize(&self, upload: Upload) -> super::Result<Attachment> {
        if upload.name.trim().is_empty() {
            return Err(Error::InvalidAttachment("file name is empty".into()));
        }

        let bytes = STANDARD
            .decode(upload.data.trim())
            .map_err(|e| Error::InvalidAttachment(e.to_string()))?;

        if bytes.len() > self.max_attachment_bytes {
            return Err(Error::AttachmentTooLarge {
                size: bytes.len(),
                limit: self.max_attachment_bytes,
            });
        }

        let mime_type = match upload.mime_type.trim() {
            "" => FALLBACK_MIME.to_owned(),
            m => m.to_owned(),
        };
        let url = format!("data:{mime_type};base64,{}", STANDARD.encode(&bytes));

        Ok(Attachment::new(upload.name, url, mime_type, upload.caption))
    }
}

fn key_of(identity: &Identity) -> super::Result<Key> {
    if !identity.logged_in {
        return Err(user::Error::Unauthorized.into());
    }

    Key::for_pair(&identity.current, &identity.counterpart)
}

fn by_recency(a: &InboxEntry, b: &InboxEntry) -> Ordering {
    match (a.preview.last_timestamp, b.preview.last_timestamp) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.user.username.cmp(&b.user.username))
}
