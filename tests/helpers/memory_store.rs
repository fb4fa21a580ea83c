//! In-memory `Store` used to drive the flows without Postgres

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use ac_signup::database::{Activation, Store};
use ac_signup::models::*;
use ac_signup::utils::errors::{Result, SignupError};

#[derive(Default)]
struct Tables {
    requests: Vec<RegistrationRequest>,
    users: Vec<User>,
    tokens: Vec<Token>,
    admins: Vec<Admin>,
    messages: Vec<AdminMessage>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_activation: AtomicBool,
    fail_member_lookup: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `activate_member` fail with an I/O error
    pub fn fail_activation(&self, fail: bool) {
        self.fail_activation.store(fail, Ordering::SeqCst);
    }

    /// Make `find_member` fail with an I/O error
    pub fn fail_member_lookup(&self, fail: bool) {
        self.fail_member_lookup.store(fail, Ordering::SeqCst);
    }

    /// Insert a complete request directly, bypassing the conversation
    pub fn seed_request(&self, chat_id: i64, status: RequestStatus) -> RegistrationRequest {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        // Spread creation times so ordering does not depend on the clock
        let created_at = Utc::now() + Duration::seconds(id);
        let request = RegistrationRequest {
            id,
            telegram_user_id: chat_id,
            first_name: format!("Имя{}", chat_id),
            last_name: format!("Фамилия{}", chat_id),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            user_status: UserStatus::Graduate,
            document_path: format!("doc_files/seed-{}.jpg", id),
            phone_number: "+79991234567".to_string(),
            status,
            rejection_reason: None,
            created_at,
            updated_at: created_at,
        };
        tables.requests.push(request.clone());
        request
    }

    /// Move a member's expiry into the past
    pub fn expire_member(&self, chat_id: i64) {
        let mut tables = self.tables.lock().unwrap();
        for member in tables.users.iter_mut().filter(|u| u.telegram_user_id == chat_id) {
            member.expires_at = Utc::now() - Duration::days(1);
        }
    }

    pub fn requests(&self) -> Vec<RegistrationRequest> {
        self.tables.lock().unwrap().requests.clone()
    }

    pub fn members(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.clone()
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.tables.lock().unwrap().tokens.clone()
    }

    pub fn admin_messages(&self) -> Vec<AdminMessage> {
        self.tables.lock().unwrap().messages.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_request(&self, request: NewRegistrationRequest) -> Result<RegistrationRequest> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let created_at = Utc::now() + Duration::seconds(id);
        let created = RegistrationRequest {
            id,
            telegram_user_id: request.telegram_user_id,
            first_name: request.first_name,
            last_name: request.last_name,
            birth_date: request.birth_date,
            user_status: request.user_status,
            document_path: request.document_path,
            phone_number: request.phone_number,
            status: RequestStatus::Pending,
            rejection_reason: None,
            created_at,
            updated_at: created_at,
        };
        tables.requests.push(created.clone());
        Ok(created)
    }

    async fn request_by_id(&self, request_id: i64) -> Result<Option<RegistrationRequest>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.iter().find(|r| r.id == request_id).cloned())
    }

    async fn latest_request(&self, chat_id: i64) -> Result<Option<RegistrationRequest>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter()
            .filter(|r| r.telegram_user_id == chat_id)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn next_pending_request(&self) -> Result<Option<RegistrationRequest>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .min_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn set_request_status(
        &self,
        request_id: i64,
        status: RequestStatus,
        reason: Option<String>,
    ) -> Result<RegistrationRequest> {
        let mut tables = self.tables.lock().unwrap();
        let request = tables
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(SignupError::RequestNotFound { request_id })?;
        request.status = status;
        request.rejection_reason = reason;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn resubmit_document(
        &self,
        request_id: i64,
        chat_id: i64,
        document_path: &str,
    ) -> Result<RegistrationRequest> {
        let mut tables = self.tables.lock().unwrap();
        let request = tables
            .requests
            .iter_mut()
            .find(|r| r.id == request_id && r.telegram_user_id == chat_id)
            .ok_or(SignupError::RequestNotFound { request_id })?;
        request.document_path = document_path.to_string();
        request.status = RequestStatus::Pending;
        request.rejection_reason = None;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn find_member(&self, chat_id: i64) -> Result<Option<User>> {
        if self.fail_member_lookup.load(Ordering::SeqCst) {
            return Err(SignupError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "connection reset",
            )));
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.telegram_user_id == chat_id).cloned())
    }

    async fn activate_member(&self, user: NewUser, code: &str) -> Result<Activation> {
        if self.fail_activation.load(Ordering::SeqCst) {
            return Err(SignupError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "connection reset",
            )));
        }

        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let existing = tables
            .users
            .iter()
            .position(|u| u.telegram_user_id == user.telegram_user_id);
        if let Some(index) = existing {
            if tables.users[index].is_active_at(now) {
                return Ok(Activation::AlreadyActive);
            }
        }

        let (id, created_at) = match existing {
            Some(index) => (tables.users[index].id, tables.users[index].created_at),
            None => (tables.next_id(), now),
        };
        let member = User {
            id,
            telegram_user_id: user.telegram_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
            status: user.status,
            phone_number: user.phone_number,
            photo_path: None,
            expires_at: user.expires_at,
            created_at,
            updated_at: now,
        };
        let token = Token {
            id: tables.next_id(),
            user_id: member.id,
            token: None,
            code: code.to_string(),
            phone_number: member.phone_number.clone(),
            created_at: now,
            expires_at: member.expires_at,
        };
        match existing {
            Some(index) => tables.users[index] = member.clone(),
            None => tables.users.push(member.clone()),
        }
        tables.tokens.push(token.clone());
        Ok(Activation::Created { user: member, token })
    }

    async fn is_admin(&self, chat_id: i64) -> Result<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.admins.iter().any(|a| a.chat_id == chat_id))
    }

    async fn add_admin(&self, chat_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if tables.admins.iter().any(|a| a.chat_id == chat_id) {
            return Ok(false);
        }
        let id = tables.next_id();
        tables.admins.push(Admin {
            id,
            chat_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_admins(&self) -> Result<Vec<Admin>> {
        Ok(self.tables.lock().unwrap().admins.clone())
    }

    async fn save_admin_message(&self, message: NewAdminMessage) -> Result<AdminMessage> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let saved = AdminMessage {
            id,
            telegram_user_id: message.telegram_user_id,
            first_name: message.first_name,
            last_name: message.last_name,
            message: message.message,
            created_at: Utc::now() + Duration::seconds(id),
        };
        tables.messages.push(saved.clone());
        Ok(saved)
    }

    async fn latest_admin_messages(&self, limit: i64) -> Result<Vec<AdminMessage>> {
        let tables = self.tables.lock().unwrap();
        let mut messages = tables.messages.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        messages.truncate(limit.max(0) as usize);
        Ok(messages)
    }
}
