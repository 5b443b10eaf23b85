use chrono::Utc;
use email_address::EmailAddress;
use log::info;

use super::model::{Identity, NewUser, ProfileUpdate, User};
use super::{Id, Repository};

#[async_trait::async_trait]
pub trait UserService {
    async fn find_all(&self) -> super::Result<Vec<User>>;

    async fn find(&self, id: &Id) -> super::Result<User>;

    /// Adds the user to the directory and signs them in.
    async fn register(&self, new_user: &NewUser) -> super::Result<User>;

    async fn sign_in(&self, id: &Id) -> super::Result<User>;

    async fn sign_out(&self) -> super::Result<()>;

    async fn current(&self) -> super::Result<Option<User>>;

    async fn identify(&self, current: &User, counterpart: &Id) -> super::Result<Identity>;

    /// Edits the signed-in user in both the directory and the session.
    async fn update_profile(&self, current: &User, update: ProfileUpdate) -> super::Result<User>;

    /// Removes the user from the directory and signs them out. Their
    /// conversations stay in storage.
    async fn delete_account(&self, current: &User) -> super::Result<()>;
}

#[derive(Clone)]
pub struct UserServiceImpl {
    repo: Repository,
}

impl UserServiceImpl {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl UserService for UserServiceImpl {
    async fn find_all(&self) -> super::Result<Vec<User>> {
        self.repo.find_all().await
    }

    async fn find(&self, id: &Id) -> super::Result<User> {
        self.repo.find_by_id(id).await
    }

    async fn register(&self, new_user: &NewUser) -> super::Result<User> {
        let username = new_user.username.trim();
        if username.is_empty() {
            return Err(super::Error::EmptyUsername);
        }

        let email = new_user.email.trim();
        if !EmailAddress::is_valid(email) {
            return Err(super::Error::InvalidEmail(email.to_owned()));
        }

        let users = self.repo.find_all().await?;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(super::Error::EmailTaken(email.to_owned()));
        }

        let mut seq = users.len() + 1;
        let id = loop {
            let candidate = Id(seq.to_string());
            if !users.iter().any(|u| u.id.eq(&candidate)) {
                break candidate;
            }
            seq += 1;
        };

        let mut profile = new_user.profile.clone();
        profile
            .registration_date
            .get_or_insert_with(|| Utc::now().date_naive());

        let user = User::new(id, username, email, new_user.avatar.clone()).with_profile(profile);
        self.repo.insert(&user).await?;
        self.repo.save_session(&user).await?;

        info!("registered {} as {}", user.username, user.id);
        Ok(user)
    }

    async fn sign_in(&self, id: &Id) -> super::Result<User> {
        let user = self.repo.find_by_id(id).await?;
        self.repo.save_session(&user).await?;
        Ok(user)
    }

    async fn sign_out(&self) -> super::Result<()> {
        self.repo.delete_session().await
    }

    async fn current(&self) -> super::Result<Option<User>> {
        self.repo.find_session().await
    }

    async fn identify(&self, current: &User, counterpart: &Id) -> super::Result<Identity> {
        let counterpart = self.repo.find_by_id(counterpart).await?;
        Ok(Identity::new(current.id.clone(), counterpart.id))
    }

    async fn update_profile(&self, current: &User, update: ProfileUpdate) -> super::Result<User> {
        if update.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(super::Error::EmptyUsername);
        }

        let existing = self.repo.find_by_id(&current.id).await?;
        let user = update.apply(existing);

        self.repo.update(&user).await?;
        self.repo.save_session(&user).await?;
        Ok(user)
    }

    async fn delete_account(&self, current: &User) -> super::Result<()> {
        self.repo.delete(&current.id).await?;
        self.repo.delete_session().await?;

        info!("deleted account {} ({})", current.username, current.id);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::integration::store::MemoryStore;
    use crate::user::{self, repository::StoreUserRepository};

    use super::*;

    fn service() -> UserServiceImpl {
        let store = Arc::new(MemoryStore::default());
        UserServiceImpl::new(Arc::new(StoreUserRepository::new(store)))
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            avatar: None,
            profile: Default::default(),
        }
    }

    #[tokio::test]
    async fn should_register_and_sign_in() {
        let service = service();

        let radu = service
            .register(&new_user("radu", "radu@example.com"))
            .await
            .unwrap();

        assert_eq!(radu.id, Id::from("3"));
        assert_eq!(service.current().await.unwrap(), Some(radu));
    }

    #[tokio::test]
    async fn should_reject_taken_email() {
        let service = service();

        let res = service
            .register(&new_user("john2", "JOHN@example.com"))
            .await;

        assert!(matches!(res, Err(user::Error::EmailTaken(_))));
    }

    #[tokio::test]
    async fn should_reject_invalid_email() {
        let service = service();

        let res = service.register(&new_user("radu", "not-an-email")).await;

        assert!(matches!(res, Err(user::Error::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn should_reject_blank_username() {
        let service = service();

        let res = service.register(&new_user("  ", "radu@example.com")).await;

        assert!(matches!(res, Err(user::Error::EmptyUsername)));
    }

    #[tokio::test]
    async fn should_sign_out() {
        let service = service();
        service.sign_in(&Id::from("2")).await.unwrap();

        service.sign_out().await.unwrap();

        assert!(service.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_stamp_registration_date() {
        let service = service();

        let radu = service
            .register(&new_user("radu", "radu@example.com"))
            .await
            .unwrap();

        assert_eq!(radu.profile.registration_date, Some(Utc::now().date_naive()));
    }

    #[tokio::test]
    async fn should_update_profile_in_directory_and_session() {
        let service = service();
        let jane = service.sign_in(&Id::from("2")).await.unwrap();
        let update = ProfileUpdate {
            specialization: Some("Platform Engineering".into()),
            skills: Some(vec!["Rust".into()]),
            ..Default::default()
        };

        let updated = service.update_profile(&jane, update).await.unwrap();

        assert_eq!(updated.profile.skills, vec!["Rust"]);
        assert_eq!(service.find(&Id::from("2")).await.unwrap(), updated);
        assert_eq!(service.current().await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn should_reject_blank_username_on_update() {
        let service = service();
        let jane = service.sign_in(&Id::from("2")).await.unwrap();
        let update = ProfileUpdate {
            username: Some(" ".into()),
            ..Default::default()
        };

        let res = service.update_profile(&jane, update).await;

        assert!(matches!(res, Err(user::Error::EmptyUsername)));
        assert_eq!(service.find(&Id::from("2")).await.unwrap(), jane);
    }

    #[tokio::test]
    async fn should_delete_account_and_sign_out() {
        let service = service();
        let john = service.sign_in(&Id::from("1")).await.unwrap();

        service.delete_account(&john).await.unwrap();

        assert!(service.current().await.unwrap().is_none());
        assert!(matches!(
            service.find(&Id::from("1")).await,
            Err(user::Error::NotFound(_))
        ));
        assert!(matches!(
            service.sign_in(&Id::from("1")).await,
            Err(user::Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_identify_known_counterpart() {
        let service = service();
        let john = service.sign_in(&Id::from("1")).await.unwrap();

        let identity = service.identify(&john, &Id::from("2")).await.unwrap();
        assert_eq!(identity.current, Id::from("1"));
        assert_eq!(identity.counterpart, Id::from("2"));
        assert!(identity.logged_in);

        let res = service.identify(&john, &Id::from("9")).await;
        assert!(matches!(res, Err(user::Error::NotFound(_))));
    }
}
