pub(super) mod api {
    use axum::{Extension, Json, extract::State, http::StatusCode};
    use serde::Deserialize;

    use crate::user::{
        self,
        model::{NewUser, ProfileUpdate, User},
    };

    pub async fn find_all(user_service: State<user::Service>) -> crate::Result<Json<Vec<User>>> {
        let users = user_service.find_all().await?;
        Ok(Json(users))
    }

    pub async fn register(
        user_service: State<user::Service>,
        Json(params): Json<NewUser>,
    ) -> crate::Result<(StatusCode, Json<User>)> {
        let user = user_service.register(&params).await?;
        Ok((StatusCode::CREATED, Json(user)))
    }

    pub async fn current(user_service: State<user::Service>) -> crate::Result<Json<User>> {
        let user = user_service
            .current()
            .await?
            .ok_or(user::Error::Unauthorized)?;
        Ok(Json(user))
    }

    #[derive(Deserialize)]
    pub struct SignInParams {
        user_id: user::Id,
    }

    pub async fn sign_in(
        user_service: State<user::Service>,
        Json(params): Json<SignInParams>,
    ) -> crate::Result<Json<User>> {
        let user = user_service.sign_in(&params.user_id).await?;
        Ok(Json(user))
    }

    pub async fn sign_out(user_service: State<user::Service>) -> crate::Result<StatusCode> {
        user_service.sign_out().await?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn update_profile(
        Extension(current): Extension<User>,
        user_service: State<user::Service>,
        Json(params): Json<ProfileUpdate>,
    ) -> crate::Result<Json<User>> {
        let user = user_service.update_profile(&current, params).await?;
        Ok(Json(user))
    }

    pub async fn delete_account(
        Extension(current): Extension<User>,
        user_service: State<user::Service>,
    ) -> crate::Result<StatusCode> {
        user_service.delete_account(&current).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
