//! Database service layer
//!
//! This module provides a high-level interface to database operations

use async_trait::async_trait;
use tracing::info;
use crate::database::{
    AdminRepository, DatabasePool, RegistrationRepository, TokenRepository, UserRepository,
};
use crate::database::store::{Activation, Store};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub requests: RegistrationRepository,
    pub users: UserRepository,
    pub tokens: TokenRepository,
    pub admins: AdminRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            requests: RegistrationRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            tokens: TokenRepository,
            admins: AdminRepository::new(pool.clone()),
            pool,
        }
    }

    /// Make sure every configured admin id exists in the admins table
    pub async fn seed_admins(&self, admin_ids: &[i64]) -> Result<()> {
        for &chat_id in admin_ids {
            if self.admins.create(chat_id).await? {
                info!(chat_id = chat_id, "Seeded admin from configuration");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for DatabaseService {
    async fn create_request(&self, request: NewRegistrationRequest) -> Result<RegistrationRequest> {
        self.requests.create(request).await
    }

    async fn request_by_id(&self, request_id: i64) -> Result<Option<RegistrationRequest>> {
        self.requests.find_by_id(request_id).await
    }

    async fn latest_request(&self, chat_id: i64) -> Result<Option<RegistrationRequest>> {
        self.requests.find_latest_by_chat(chat_id).await
    }

    async fn next_pending_request(&self) -> Result<Option<RegistrationRequest>> {
        self.requests.next_pending().await
    }

    async fn set_request_status(
        &self,
        request_id: i64,
        status: RequestStatus,
        reason: Option<String>,
    ) -> Result<RegistrationRequest> {
        self.requests.update_status(request_id, status, reason).await
    }

    async fn resubmit_document(
        &self,
        request_id: i64,
        chat_id: i64,
        document_path: &str,
    ) -> Result<RegistrationRequest> {
        self.requests.resubmit_document(request_id, chat_id, document_path).await
    }

    async fn find_member(&self, chat_id: i64) -> Result<Option<User>> {
        self.users.find_by_telegram_id(chat_id).await
    }

    async fn activate_member(&self, user: NewUser, code: &str) -> Result<Activation> {
        let mut tx = self.pool.begin().await?;

        let Some(created) = self.users.insert(&mut tx, &user).await? else {
            tx.rollback().await?;
            return Ok(Activation::AlreadyActive);
        };

        let token = self
            .tokens
            .insert(&mut tx, created.id, code, &created.phone_number, created.expires_at)
            .await?;

        tx.commit().await?;
        Ok(Activation::Created { user: created, token })
    }

    async fn is_admin(&self, chat_id: i64) -> Result<bool> {
        self.admins.is_admin(chat_id).await
    }

    async fn add_admin(&self, chat_id: i64) -> Result<bool> {
        self.admins.create(chat_id).await
    }

    async fn list_admins(&self) -> Result<Vec<Admin>> {
        self.admins.list().await
    }

    async fn save_admin_message(&self, message: NewAdminMessage) -> Result<AdminMessage> {
        self.admins.create_message(message).await
    }

    async fn latest_admin_messages(&self, limit: i64) -> Result<Vec<AdminMessage>> {
        self.admins.latest_messages(limit).await
    }
}
