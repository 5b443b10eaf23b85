use std::{env, fmt};

use async_trait::async_trait;
use log::warn;
use redis::AsyncCommands;

use super::store::{self, Store};
use crate::conversation;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 6379,
        }
    }
}

impl Config {
    pub fn env() -> Option<Self> {
        let host = env::var("REDIS_HOST").ok();
        let port = env::var("REDIS_PORT")
            .unwrap_or_else(|_| "6379".to_string())
            .parse()
            .ok();

        if let (Some(host), Some(port)) = (host, port) {
            Some(Self { host, port })
        } else {
            warn!("REDIS env is not configured");
            None
        }
    }

    pub async fn connect(&self) -> Redis {
        let con = match redis::Client::open(format!("redis://{}:{}", self.host, self.port)) {
            Ok(client) => match client.get_connection_manager().await {
                Ok(con) => con,
                Err(e) => panic!("Failed to connect to Redis: {e}"),
            },
            Err(e) => panic!("Failed to create Redis client: {e}"),
        };

        Redis { con }
    }
}

#[derive(Clone)]
pub enum Key {
    Chat(conversation::Key),
    Session,
    Users,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Chat(key) => write!(f, "chat_{key}"),
            Key::Session => write!(f, "devnet_user"),
            Key::Users => write!(f, "devnet_users"),
        }
    }
}

#[derive(Clone)]
pub struct Redis {
    con: redis::aio::ConnectionManager,
}

#[async_trait]
impl Store for Redis {
    async fn get(&self, key: &Key) -> store::Result<Option<String>> {
        let mut con = self.con.clone();
        let value: Option<String> = con.get(key.to_string()).await?;
        Ok(value)
    }

    async fn set(&self, key: &Key, value: &str) -> store::Result<()> {
        let mut con = self.con.clone();
        let _: () = con.set(key.to_string(), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &Key) -> store::Result<()> {
        let mut con = self.con.clone();
        let _: () = con.del(key.to_string()).await?;
        Ok(())
    }
}
