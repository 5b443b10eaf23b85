use std::{env, fmt::Display, sync::Arc};

use axum::{Router, http::StatusCode, routing::get};
use log::warn;
use serde::{Deserialize, Serialize};

use service::ConversationService;

use crate::{integration::store as substrate, state::AppState, user};

mod handler;
pub mod model;
pub mod service;
pub mod store;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<ConversationService>;
pub type Reporter = Arc<dyn WarningReporter + Send + Sync>;

const SEPARATOR: char = '-';
const DEFAULT_PREVIEW_BUDGET: usize = 30;
const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/chats", get(handler::api::inbox))
        .route(
            "/chats/{id}/messages",
            get(handler::api::find_all).post(handler::api::create),
        )
        .route("/chats/{id}/preview", get(handler::api::preview))
        .with_state(s)
}

/// Both participants of a pair, sorted and joined, so either side derives
/// the same key.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key(String);

impl Key {
    pub fn for_pair(a: &user::Id, b: &user::Id) -> Result<Self> {
        if a.is_empty() || b.is_empty() || a.eq(b) {
            return Err(Error::InvalidParticipants(a.to_owned(), b.to_owned()));
        }

        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        Ok(Self(format!("{lo}{SEPARATOR}{hi}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    CorruptStore { key: Key, cause: String },
    ReadFailed { key: Key, cause: String },
    WriteFailed { key: Key, cause: String },
}

pub trait WarningReporter {
    fn report(&self, warning: &Warning);
}

#[derive(Clone, Default)]
pub struct LogReporter;

impl WarningReporter for LogReporter {
    fn report(&self, warning: &Warning) {
        match warning {
            Warning::CorruptStore { key, cause } => {
                warn!("conversation {key} is unreadable, treating as empty: {cause}")
            }
            Warning::ReadFailed { key, cause } => {
                warn!("could not read conversation {key}, treating as empty: {cause}")
            }
            Warning::WriteFailed { key, cause } => {
                warn!("conversation {key} kept in memory only, write failed: {cause}")
            }
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub preview_budget: usize,
    pub max_attachment_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preview_budget: DEFAULT_PREVIEW_BUDGET,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

impl Config {
    pub fn env() -> Self {
        let parse = |name: &str, default: usize| {
            env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        Self {
            preview_budget: parse("PREVIEW_BUDGET", DEFAULT_PREVIEW_BUDGET),
            max_attachment_bytes: parse("MAX_ATTACHMENT_BYTES", DEFAULT_MAX_ATTACHMENT_BYTES),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("a conversation needs two different participants, got {0:?} and {1:?}")]
    InvalidParticipants(user::Id, user::Id),
    #[error("message has neither text nor attachment")]
    EmptyMessage,
    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),
    #[error("attachment is {size} bytes, limit is {limit}")]
    AttachmentTooLarge { size: usize, limit: usize },
    #[error("could not persist conversation {key}: {cause}")]
    PersistenceWriteFailed {
        key: Key,
        #[source]
        cause: substrate::Error,
    },

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

impl From<Error> for StatusCode {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidParticipants(..) | Error::EmptyMessage | Error::InvalidAttachment(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::AttachmentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::_User(e) => e.into(),
            Error::PersistenceWriteFailed { .. } | Error::_ParseJson(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(s: &str) -> user::Id {
        user::Id::from(s)
    }

    #[test]
    fn should_derive_same_key_from_both_sides() {
        let k1 = Key::for_pair(&id("u1"), &id("u2")).unwrap();
        let k2 = Key::for_pair(&id("u2"), &id("u1")).unwrap();

        assert_eq!(k1, k2);
        assert_eq!(k1.as_str(), "u1-u2");
    }

    #[test]
    fn should_be_commutative_for_many_pairs() {
        let ids = ["1", "2", "10", "jane", "john", "Zed", "ä", "a-b"];

        for a in ids {
            for b in ids {
                if a == b {
                    continue;
                }
                assert_eq!(
                    Key::for_pair(&id(a), &id(b)).unwrap(),
                    Key::for_pair(&id(b), &id(a)).unwrap()
                );
            }
        }
    }

    #[test]
    fn should_sort_lexicographically() {
        let key = Key::for_pair(&id("2"), &id("10")).unwrap();

        assert_eq!(key.to_string(), "10-2");
    }

    #[test]
    fn should_reject_same_participant() {
        let res = Key::for_pair(&id("u1"), &id("u1"));

        assert!(matches!(res, Err(Error::InvalidParticipants(..))));
    }

    #[test]
    fn should_reject_empty_participant() {
        assert!(matches!(
            Key::for_pair(&id(""), &id("u1")),
            Err(Error::InvalidParticipants(..))
        ));
        assert!(matches!(
            Key::for_pair(&id("u1"), &id("")),
            Err(Error::InvalidParticipants(..))
        ));
    }
}
