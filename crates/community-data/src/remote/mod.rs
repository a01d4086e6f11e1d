//! The REST API seen from the data layer.
//!
//! Repositories only talk to the traits defined here; [`HttpRemote`] is the
//! production implementation and tests substitute hand-written stubs.

pub mod dto;
pub mod http;

use async_trait::async_trait;
use community_shared::constants::INITIAL_PAGE;
use community_shared::RemoteFailure;
use community_store::{Listing, User};
use serde::{Deserialize, Serialize};

pub use dto::*;
pub use http::HttpRemote;

pub type RemoteResult<T> = std::result::Result<T, RemoteFailure>;

/// Paging and filter parameters for list and search calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
    /// Extra query-string pairs such as `("city", "Toronto")`.
    pub filters: Vec<(String, String)>,
}

impl PageRequest {
    pub fn first(per_page: u32) -> Self {
        Self {
            page: INITIAL_PAGE,
            per_page,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// One page of a paginated listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Remote operations available for every listing domain.
#[async_trait]
pub trait ListingRemote<L: Listing>: Send + Sync {
    async fn list(&self, request: &PageRequest) -> RemoteResult<Page<L>>;

    async fn get_by_id(&self, id: &str) -> RemoteResult<L>;

    async fn search(&self, query: &str, request: &PageRequest) -> RemoteResult<Page<L>>;

    async fn featured(&self, limit: u32) -> RemoteResult<Vec<L>>;

    async fn favorite(&self, id: &str) -> RemoteResult<()>;

    async fn unfavorite(&self, id: &str) -> RemoteResult<()>;
}

/// Account and session endpoints.
#[async_trait]
pub trait AuthRemote: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> RemoteResult<LoginResponse>;

    async fn register(&self, request: &RegisterRequest) -> RemoteResult<LoginResponse>;

    async fn logout(&self) -> RemoteResult<()>;

    /// Exchange the current credentials for a fresh token pair.
    async fn refresh_token(&self) -> RemoteResult<AuthTokens>;

    async fn current_user(&self) -> RemoteResult<User>;

    async fn update_profile(&self, request: &UpdateProfileRequest) -> RemoteResult<User>;

    async fn change_password(&self, request: &ChangePasswordRequest) -> RemoteResult<()>;

    async fn request_password_reset(&self, request: &PasswordResetRequest) -> RemoteResult<()>;

    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirmRequest,
    ) -> RemoteResult<()>;

    async fn verify_email(&self, request: &EmailVerificationRequest) -> RemoteResult<()>;

    async fn resend_email_verification(&self) -> RemoteResult<()>;

    async fn verify_phone(&self, request: &PhoneVerificationRequest) -> RemoteResult<()>;

    async fn send_phone_verification_code(
        &self,
        request: &SendVerificationCodeRequest,
    ) -> RemoteResult<()>;

    async fn delete_account(&self) -> RemoteResult<()>;
}
