use std::{fmt::Display, sync::Arc};

use axum::{Router, http::StatusCode, routing::{delete, get, patch}};
use serde::{Deserialize, Serialize};

use repository::UserRepository;
use service::UserService;

use crate::{integration::store, state::AppState};

mod handler;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn UserRepository + Send + Sync>;
pub type Service = Arc<dyn UserService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/users",
            get(handler::api::find_all).post(handler::api::register),
        )
        .route(
            "/session",
            get(handler::api::current)
                .post(handler::api::sign_in)
                .delete(handler::api::sign_out),
        )
        .with_state(s)
}

/// Routes acting on the signed-in user. Mount behind `middleware::authorize`.
pub fn account_api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/session/profile", patch(handler::api::update_profile))
        .route("/users/me", delete(handler::api::delete_account))
        .with_state(s)
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id(pub String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Id, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Id(s))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found: {0:?}")]
    NotFound(Id),
    #[error("not logged in")]
    Unauthorized,
    #[error("email is already registered: {0}")]
    EmailTaken(String),
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("username is empty")]
    EmptyUsername,

    #[error(transparent)]
    _Store(#[from] store::Error),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

impl From<Error> for StatusCode {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::EmailTaken(_) => StatusCode::CONFLICT,
            Error::InvalidEmail(_) | Error::EmptyUsername => StatusCode::BAD_REQUEST,
            Error::_Store(_) | Error::_ParseJson(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
