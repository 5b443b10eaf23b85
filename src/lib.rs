use axum::{Router, http::StatusCode, middleware, routing::get};

use crate::state::AppState;

pub mod conversation;
pub mod error;
pub mod event;
pub mod integration;
pub mod state;
pub mod user;

pub type Result<T> = std::result::Result<T, error::Error>;

pub fn app(state: AppState) -> Router {
    let authorized = user::account_api(state.clone())
        .merge(conversation::api(state.clone()))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            user::middleware::authorize,
        ));

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .nest("/api", user::api(state).merge(authorized))
}
