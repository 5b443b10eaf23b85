use async_trait::async_trait;
use log::{debug, warn};

use super::Id;
use super::model::{User, sample_users};
use crate::integration::cache::Key;
use crate::integration::store::Substrate;

#[async_trait]
pub trait UserRepository {
    async fn find_all(&self) -> super::Result<Vec<User>>;

    async fn find_by_id(&self, id: &Id) -> super::Result<User>;

    async fn insert(&self, user: &User) -> super::Result<()>;

    async fn update(&self, user: &User) -> super::Result<()>;

    async fn delete(&self, id: &Id) -> super::Result<()>;

    async fn find_session(&self) -> super::Result<Option<User>>;

    async fn save_session(&self, user: &User) -> super::Result<()>;

    async fn delete_session(&self) -> super::Result<()>;
}

pub struct StoreUserRepository {
    store: Substrate,
}

impl StoreUserRepository {
    pub fn new(store: Substrate) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn find_all(&self) -> super::Result<Vec<User>> {
        let Some(raw) = self.store.get(&Key::Users).await? else {
            return Ok(sample_users());
        };

        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(e) => {
                warn!("user directory is unreadable, falling back to samples: {e}");
                Ok(sample_users())
            }
        }
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<User> {
        self.find_all()
            .await?
            .into_iter()
            .find(|u| u.id.eq(id))
            .ok_or(super::Error::NotFound(id.to_owned()))
    }

    async fn insert(&self, user: &User) -> super::Result<()> {
        let mut users = self.find_all().await?;
        users.push(user.clone());
        self.save_all(&users).await
    }

    async fn update(&self, user: &User) -> super::Result<()> {
        let mut users = self.find_all().await?;
        let Some(existing) = users.iter_mut().find(|u| u.id.eq(&user.id)) else {
            return Err(super::Error::NotFound(user.id.to_owned()));
        };
        *existing = user.clone();
        self.save_all(&users).await
    }

    async fn delete(&self, id: &Id) -> super::Result<()> {
        let mut users = self.find_all().await?;
        let before = users.len();
        users.retain(|u| u.id.ne(id));
        if users.len() == before {
            return Err(super::Error::NotFound(id.to_owned()));
        }
        self.save_all(&users).await
    }

    async fn find_session(&self) -> super::Result<Option<User>> {
        let Some(raw) = self.store.get(&Key::Session).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("dropping unreadable session: {e}");
                self.store.remove(&Key::Session).await?;
                Ok(None)
            }
        }
    }

    async fn save_session(&self, user: &User) -> super::Result<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(&Key::Session, &raw).await?;
        debug!("session saved for {}", user.id);
        Ok(())
    }

    async fn delete_session(&self) -> super::Result<()> {
        self.store.remove(&Key::Session).await?;
        Ok(())
    }
}

impl StoreUserRepository {
    async fn save_all(&self, users: &[User]) -> super::Result<()> {
        let raw = serde_json::to_string(users)?;
        self.store.set(&Key::Users, &raw).await?;
        Ok(())
    }
}
