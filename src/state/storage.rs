//! Session storage implementations
//!
//! Sessions live in process memory by default. The Redis backend keeps them
//! across restarts, serialized as JSON.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use crate::config::{SessionBackend, SessionConfig};
use crate::utils::errors::{SignupError, Result};
use super::session::Conversation;

/// Keyed storage of one session per chat
#[async_trait]
pub trait SessionStore<S>: Send + Sync {
    async fn load(&self, chat_id: i64) -> Result<Option<S>>;

    async fn save(&self, chat_id: i64, session: &S) -> Result<()>;

    /// Forget the chat's session; the next message starts from bootstrap
    async fn reset(&self, chat_id: i64) -> Result<()>;
}

/// In-process session map
pub struct MemorySessionStore<S> {
    sessions: Mutex<HashMap<i64, S>>,
}

impl<S> MemorySessionStore<S> {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of chats with a stored session
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

impl<S> Default for MemorySessionStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: Conversation> SessionStore<S> for MemorySessionStore<S> {
    async fn load(&self, chat_id: i64) -> Result<Option<S>> {
        Ok(self.sessions.lock().await.get(&chat_id).cloned())
    }

    async fn save(&self, chat_id: i64, session: &S) -> Result<()> {
        self.sessions.lock().await.insert(chat_id, session.clone());
        Ok(())
    }

    async fn reset(&self, chat_id: i64) -> Result<()> {
        self.sessions.lock().await.remove(&chat_id);
        Ok(())
    }
}

/// Redis-backed session storage
pub struct RedisSessionStore<S> {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
    namespace: &'static str,
    ttl_seconds: u64,
    _session: PhantomData<fn() -> S>,
}

impl<S> RedisSessionStore<S> {
    /// Connect to Redis; `namespace` separates the two bots' sessions
    pub async fn new(redis_url: &str, prefix: &str, namespace: &'static str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            prefix: prefix.to_string(),
            namespace,
            ttl_seconds,
            _session: PhantomData,
        })
    }

    fn session_key(&self, chat_id: i64) -> String {
        format!("{}{}:session:{}", self.prefix, self.namespace, chat_id)
    }
}

#[async_trait]
impl<S: Conversation> SessionStore<S> for RedisSessionStore<S> {
    async fn load(&self, chat_id: i64) -> Result<Option<S>> {
        let key = self.session_key(chat_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await?;
        match serialized {
            Some(data) => {
                let session = serde_json::from_str::<S>(&data).map_err(|e| {
                    error!(chat_id = chat_id, error = %e, "Failed to deserialize session");
                    SignupError::from(e)
                })?;
                debug!(chat_id = chat_id, step = session.step_name(), "Session loaded from Redis");
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, chat_id: i64, session: &S) -> Result<()> {
        let key = self.session_key(chat_id);
        let serialized = serde_json::to_string(session)?;
        let mut conn = self.connection_manager.clone();

        if self.ttl_seconds > 0 {
            conn.set_ex::<_, _, ()>(&key, serialized, self.ttl_seconds).await?;
        } else {
            conn.set::<_, _, ()>(&key, serialized).await?;
        }

        debug!(chat_id = chat_id, step = session.step_name(), "Session saved to Redis");
        Ok(())
    }

    async fn reset(&self, chat_id: i64) -> Result<()> {
        let key = self.session_key(chat_id);
        let mut conn = self.connection_manager.clone();
        conn.del::<_, ()>(&key).await?;
        Ok(())
    }
}

/// Build the session store selected in configuration
pub async fn create_session_store<S: Conversation>(
    config: &SessionConfig,
    namespace: &'static str,
) -> Result<Arc<dyn SessionStore<S>>> {
    match config.backend {
        SessionBackend::Memory => {
            info!(namespace = namespace, "Using in-memory session storage");
            Ok(Arc::new(MemorySessionStore::<S>::new()))
        }
        SessionBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                SignupError::Config("Redis URL is required for the redis session backend".to_string())
            })?;
            let store = RedisSessionStore::<S>::new(url, &config.prefix, namespace, config.ttl_seconds).await?;
            info!(namespace = namespace, "Using Redis session storage");
            Ok(Arc::new(store))
        }
    }
}
