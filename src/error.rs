use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::debug;
use serde::Serialize;

use crate::{conversation, user};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Conversation(#[from] conversation::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let detail = self.to_string();
        let status: StatusCode = match self {
            Error::_User(e) => e.into(),
            Error::_Conversation(e) => e.into(),
        };

        let message = if status.is_server_error() {
            debug!("{status}: {detail}");
            "Something went wrong".to_owned()
        } else {
            detail
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
