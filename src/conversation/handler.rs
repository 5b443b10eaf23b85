pub(super) mod api {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        conversation::{
            self,
            model::{Draft, InboxEntry, Message, Preview, Sent},
        },
        user::{self, model::User},
    };

    pub async fn inbox(
        Extension(current): Extension<User>,
        conversation_service: State<conversation::Service>,
    ) -> crate::Result<Json<Vec<InboxEntry>>> {
        let entries = conversation_service.inbox(&current).await?;
        Ok(Json(entries))
    }

    pub async fn find_all(
        Extension(current): Extension<User>,
        user_service: State<user::Service>,
        conversation_service: State<conversation::Service>,
        Path(id): Path<user::Id>,
    ) -> crate::Result<Json<Vec<Message>>> {
        let identity = user_service.identify(&current, &id).await?;
        let messages = conversation_service.open(&identity).await?;
        Ok(Json(messages))
    }

    /// Answers 201 even when the write failed; `persisted` tells the client
    /// whether to warn that the message may not be saved.
    pub async fn create(
        Extension(current): Extension<User>,
        user_service: State<user::Service>,
        conversation_service: State<conversation::Service>,
        Path(id): Path<user::Id>,
        Json(draft): Json<Draft>,
    ) -> crate::Result<(StatusCode, Json<Sent>)> {
        let identity = user_service.identify(&current, &id).await?;
        let sent = conversation_service.send(&identity, draft).await?;
        Ok((StatusCode::CREATED, Json(sent)))
    }

    pub async fn preview(
        Extension(current): Extension<User>,
        user_service: State<user::Service>,
        conversation_service: State<conversation::Service>,
        Path(id): Path<user::Id>,
    ) -> crate::Result<Json<Preview>> {
        let identity = user_service.identify(&current, &id).await?;
        let preview = conversation_service.preview(&identity).await?;
        Ok(Json(preview))
    }
}
