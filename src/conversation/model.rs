use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::user::{self, model::User};

const ELLIPSIS: &str = "...";

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// UUIDv7, so ids created later sort later.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MessageId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Image,
    File,
}

impl Kind {
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::Image => "[image]",
            Self::File => "[file]",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Attachment {
    name: String,
    url: String,
    #[serde(rename = "type", default)]
    mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        mime_type: impl Into<String>,
        caption: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            mime_type: mime_type.into(),
            caption: caption.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn kind(&self) -> Kind {
        if self.mime_type.starts_with("image/") {
            Kind::Image
        } else {
            Kind::File
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    id: MessageId,
    sender: user::Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    receiver: Option<user::Id>,
    #[serde(default)]
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(rename = "file", default, skip_serializing_if = "Option::is_none")]
    attachment: Option<Attachment>,
}

impl Message {
    pub fn new(
        sender: user::Id,
        receiver: Option<user::Id>,
        content: impl Into<String>,
        attachment: Option<Attachment>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            receiver,
            content: content.into(),
            timestamp: Utc::now(),
            attachment,
        }
    }

    pub fn with_id(self, id: MessageId) -> Self {
        Self { id, ..self }
    }

    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, ..self }
    }

    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    pub const fn sender(&self) -> &user::Id {
        &self.sender
    }

    pub const fn receiver(&self) -> Option<&user::Id> {
        self.receiver.as_ref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub const fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty() && self.attachment.is_none()
    }

    /// Text shown for this message in lists and notifications: the content,
    /// else the attachment caption, else a placeholder for the attachment kind.
    pub fn summary_text(&self) -> &str {
        if !self.content.trim().is_empty() {
            return &self.content;
        }

        match &self.attachment {
            Some(a) => a.caption().unwrap_or(a.kind().placeholder()),
            None => "",
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Default)]
pub struct Preview {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl Preview {
    pub fn of(messages: &[Message], budget: usize) -> Self {
        match messages.last() {
            Some(last) => Self {
                summary: truncate(last.summary_text(), budget),
                last_timestamp: Some(*last.timestamp()),
            },
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_timestamp.is_none()
    }
}

/// Cuts `text` to at most `budget` grapheme clusters, marking the cut.
pub fn truncate(text: &str, budget: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(budget).collect();

    if graphemes.next().is_some() {
        format!("{head}{ELLIPSIS}")
    } else {
        head
    }
}

/// An attachment as the client uploads it, before it becomes a locator.
#[derive(Deserialize, Clone, Debug)]
pub struct Upload {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    pub data: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Draft {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub file: Option<Upload>,
}

#[derive(Serialize, Clone, Debug)]
pub struct Sent {
    pub messages: Vec<Message>,
    pub persisted: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct InboxEntry {
    pub user: User,
    pub preview: Preview,
}
