//! Hand-written remotes for repository tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use community_shared::RemoteFailure;
use community_store::{Listing, LocalStore, User};

use crate::remote::*;
use crate::session::SessionState;

pub(crate) fn store_and_session() -> (LocalStore, SessionState) {
    let store = LocalStore::open_in_memory().unwrap();
    let session = SessionState::load(store.clone()).unwrap();
    (store, session)
}

pub(crate) fn tokens() -> AuthTokens {
    AuthTokens {
        access_token: "access".into(),
        refresh_token: "refresh".into(),
        expires_in: 3600,
    }
}

/// Serves `items` for every read; every call fails while `failure` is set.
pub(crate) struct StubListingRemote<L> {
    pub items: Mutex<Vec<L>>,
    pub featured: Mutex<Option<Vec<L>>>,
    pub failure: Mutex<Option<RemoteFailure>>,
    pub calls: AtomicUsize,
}

impl<L: Listing> StubListingRemote<L> {
    pub fn new(items: Vec<L>) -> Self {
        Self {
            items: Mutex::new(items),
            featured: Mutex::new(None),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_with(&self, code: i32) {
        *self.failure.lock().unwrap() = Some(RemoteFailure::new(code));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn page(&self, items: Vec<L>) -> Page<L> {
        Page {
            pagination: Pagination {
                current_page: 1,
                per_page: items.len() as u32,
                total: items.len() as u32,
                total_pages: 1,
                ..Pagination::default()
            },
            data: items,
        }
    }
}

#[async_trait]
impl<L: Listing> ListingRemote<L> for StubListingRemote<L> {
    async fn list(&self, request: &PageRequest) -> RemoteResult<Page<L>> {
        self.enter()?;
        let items: Vec<L> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .take(request.per_page as usize)
            .cloned()
            .collect();
        Ok(self.page(items))
    }

    async fn get_by_id(&self, id: &str) -> RemoteResult<L> {
        self.enter()?;
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| RemoteFailure::new(RemoteFailure::NOT_FOUND))
    }

    async fn search(&self, query: &str, _request: &PageRequest) -> RemoteResult<Page<L>> {
        self.enter()?;
        let needle = query.to_lowercase();
        let items: Vec<L> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.title().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(self.page(items))
    }

    async fn featured(&self, limit: u32) -> RemoteResult<Vec<L>> {
        self.enter()?;
        match self.featured.lock().unwrap().clone() {
            Some(items) => Ok(items.into_iter().take(limit as usize).collect()),
            None => Err(RemoteFailure::new(RemoteFailure::NOT_FOUND)),
        }
    }

    async fn favorite(&self, _id: &str) -> RemoteResult<()> {
        self.enter()
    }

    async fn unfavorite(&self, _id: &str) -> RemoteResult<()> {
        self.enter()
    }
}

/// Auth endpoints answering with a fixed user.
pub(crate) struct StubAuthRemote {
    pub user: User,
    pub failure: Mutex<Option<RemoteFailure>>,
    pub calls: AtomicUsize,
}

impl StubAuthRemote {
    pub fn new(user: User) -> Self {
        Self {
            user,
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_with(&self, code: i32) {
        *self.failure.lock().unwrap() = Some(RemoteFailure::new(code));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn login_response(&self) -> LoginResponse {
        LoginResponse {
            user: self.user.clone(),
            tokens: tokens(),
        }
    }
}

#[async_trait]
impl AuthRemote for StubAuthRemote {
    async fn login(&self, _request: &LoginRequest) -> RemoteResult<LoginResponse> {
        self.enter()?;
        Ok(self.login_response())
    }

    async fn register(&self, _request: &RegisterRequest) -> RemoteResult<LoginResponse> {
        self.enter()?;
        Ok(self.login_response())
    }

    async fn logout(&self) -> RemoteResult<()> {
        self.enter()
    }

    async fn refresh_token(&self) -> RemoteResult<AuthTokens> {
        self.enter()?;
        Ok(AuthTokens {
            access_token: "access-2".into(),
            refresh_token: "refresh-2".into(),
            expires_in: 7200,
        })
    }

    async fn current_user(&self) -> RemoteResult<User> {
        self.enter()?;
        Ok(self.user.clone())
    }

    async fn update_profile(&self, request: &UpdateProfileRequest) -> RemoteResult<User> {
        self.enter()?;
        let mut user = self.user.clone();
        if let Some(name) = &request.name {
            user.name = Some(name.clone());
        }
        if let Some(bio) = &request.bio {
            user.bio = Some(bio.clone());
        }
        Ok(user)
    }

    async fn change_password(&self, _request: &ChangePasswordRequest) -> RemoteResult<()> {
        self.enter()
    }

    async fn request_password_reset(&self, _request: &PasswordResetRequest) -> RemoteResult<()> {
        self.enter()
    }

    async fn confirm_password_reset(
        &self,
        _request: &PasswordResetConfirmRequest,
    ) -> RemoteResult<()> {
        self.enter()
    }

    async fn verify_email(&self, _request: &EmailVerificationRequest) -> RemoteResult<()> {
        self.enter()
    }

    async fn resend_email_verification(&self) -> RemoteResult<()> {
        self.enter()
    }

    async fn verify_phone(&self, _request: &PhoneVerificationRequest) -> RemoteResult<()> {
        self.enter()
    }

    async fn send_phone_verification_code(
        &self,
        _request: &SendVerificationCodeRequest,
    ) -> RemoteResult<()> {
        self.enter()
    }

    async fn delete_account(&self) -> RemoteResult<()> {
        self.enter()
    }
}
