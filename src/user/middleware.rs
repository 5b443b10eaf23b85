use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use log::debug;

use crate::user;

/// Resolves the signed-in user for the request.
///
/// There is a single session slot (`devnet_user`) per substrate, not one per
/// client, so every caller acts as whoever signed in last.
pub async fn authorize(
    user_service: State<user::Service>,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    let Some(current) = user_service.current().await? else {
        debug!("no active session for {}", req.uri());
        return Err(user::Error::Unauthorized.into());
    };

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}
