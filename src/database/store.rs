//! Persistence seam used by the conversation flows

use async_trait::async_trait;
use crate::models::{
    Admin, AdminMessage, NewAdminMessage, NewRegistrationRequest, NewUser, RegistrationRequest,
    RequestStatus, Token, User,
};
use crate::utils::errors::Result;

/// Outcome of turning an approved applicant into a member
#[derive(Debug, Clone)]
pub enum Activation {
    Created { user: User, token: Token },
    /// The chat already has a member row; nothing was written
    AlreadyActive,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_request(&self, request: NewRegistrationRequest) -> Result<RegistrationRequest>;

    async fn request_by_id(&self, request_id: i64) -> Result<Option<RegistrationRequest>>;

    async fn latest_request(&self, chat_id: i64) -> Result<Option<RegistrationRequest>>;

    /// Oldest request still waiting for review
    async fn next_pending_request(&self) -> Result<Option<RegistrationRequest>>;

    async fn set_request_status(
        &self,
        request_id: i64,
        status: RequestStatus,
        reason: Option<String>,
    ) -> Result<RegistrationRequest>;

    /// Replace the document and move the request back to `pending`
    async fn resubmit_document(
        &self,
        request_id: i64,
        chat_id: i64,
        document_path: &str,
    ) -> Result<RegistrationRequest>;

    async fn find_member(&self, chat_id: i64) -> Result<Option<User>>;

    /// Create the member and its access code atomically
    async fn activate_member(&self, user: NewUser, code: &str) -> Result<Activation>;

    async fn is_admin(&self, chat_id: i64) -> Result<bool>;

    /// Returns `false` when the chat was already an admin
    async fn add_admin(&self, chat_id: i64) -> Result<bool>;

    async fn list_admins(&self) -> Result<Vec<Admin>>;

    async fn save_admin_message(&self, message: NewAdminMessage) -> Result<AdminMessage>;

    async fn latest_admin_messages(&self, limit: i64) -> Result<Vec<AdminMessage>>;
}
