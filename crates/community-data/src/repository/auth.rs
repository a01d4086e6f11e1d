//! Account, login state and the cached user profile.

use std::sync::Arc;

use community_store::{LocalStore, User};

use crate::error::{DataError, Result};
use crate::ledger::FavoritesLedger;
use crate::remote::{
    AuthRemote, AuthTokens, ChangePasswordRequest, EmailVerificationRequest, LoginRequest,
    LoginResponse, PasswordResetConfirmRequest, PasswordResetRequest, PhoneVerificationRequest,
    RegisterRequest, SendVerificationCodeRequest, UpdateProfileRequest,
};
use crate::session::SessionState;
use crate::validation::{
    ensure_valid, validate_email, validate_password_change, LoginCredentials,
    PasswordResetConfirmation, RegisterData,
};

#[derive(Clone)]
pub struct AuthRepository {
    remote: Arc<dyn AuthRemote>,
    store: LocalStore,
    session: SessionState,
    favorites: FavoritesLedger,
}

impl AuthRepository {
    pub fn new(remote: Arc<dyn AuthRemote>, store: LocalStore, session: SessionState) -> Self {
        Self {
            remote,
            favorites: FavoritesLedger::new(store.clone()),
            store,
            session,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        ensure_valid(credentials.validate())?;

        let response = self
            .remote
            .login(&LoginRequest {
                email: credentials.email.trim().to_string(),
                password: credentials.password.clone(),
            })
            .await?;

        tracing::info!(user_id = %response.user.id, "login successful");
        Ok(self.store_auth_data(response))
    }

    pub async fn register(&self, data: &RegisterData) -> Result<User> {
        ensure_valid(data.validate())?;

        let response = self
            .remote
            .register(&RegisterRequest {
                email: data.email.trim().to_string(),
                password: data.password.clone(),
                password_confirmation: data.confirm_password.clone(),
                name: data.name.clone(),
                phone: data.phone.clone(),
            })
            .await?;

        tracing::info!(user_id = %response.user.id, "registration successful");
        Ok(self.store_auth_data(response))
    }

    /// End the session.  Local state (session, cached profile, the user's
    /// favorites) is cleared whatever the server says; the result reports
    /// the server's outcome.
    pub async fn logout(&self) -> Result<()> {
        let outcome = self.remote.logout().await;
        if let Err(failure) = &outcome {
            tracing::warn!(
                code = failure.code,
                "logout request failed, clearing local state anyway"
            );
        }

        self.clear_local_state();
        outcome.map_err(DataError::from)
    }

    /// The logged-in user: cached profile if present, otherwise fetched.
    /// `None` when logged out or when the fetch fails.
    pub async fn current_user(&self) -> Option<User> {
        if !self.session.is_logged_in() {
            return None;
        }

        if let Some(user_id) = self.session.current_user_id() {
            match self.store.with_db(|db| db.get_user(&user_id)) {
                Ok(Some(user)) => return Some(user),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "failed to read cached user"),
            }
        }

        match self.remote.current_user().await {
            Ok(user) => {
                self.cache_user(&user);
                if let Err(e) = self.session.set_user_id(&user.id) {
                    tracing::warn!(error = %e, "failed to persist session user");
                }
                Some(user)
            }
            Err(failure) => {
                tracing::warn!(code = failure.code, "failed to fetch current user");
                None
            }
        }
    }

    pub async fn refresh_token(&self) -> Result<AuthTokens> {
        let tokens = self.remote.refresh_token().await?;
        if let Err(e) = self.session.update_tokens(&tokens) {
            tracing::warn!(error = %e, "failed to persist refreshed tokens");
        }
        tracing::debug!("token refreshed");
        Ok(tokens)
    }

    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> Result<User> {
        let user = self.remote.update_profile(update).await?;
        self.cache_user(&user);
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        ensure_valid(validate_password_change(current_password, new_password))?;

        self.remote
            .change_password(&ChangePasswordRequest {
                current_password: current_password.to_string(),
                new_password: new_password.to_string(),
                new_password_confirmation: new_password.to_string(),
            })
            .await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        ensure_valid(validate_email(email))?;

        self.remote
            .request_password_reset(&PasswordResetRequest {
                email: email.trim().to_string(),
            })
            .await?;
        Ok(())
    }

    pub async fn confirm_password_reset(
        &self,
        confirmation: &PasswordResetConfirmation,
    ) -> Result<()> {
        ensure_valid(confirmation.validate())?;

        self.remote
            .confirm_password_reset(&PasswordResetConfirmRequest {
                token: confirmation.token.trim().to_string(),
                password: confirmation.new_password.clone(),
                password_confirmation: confirmation.confirm_password.clone(),
            })
            .await?;
        Ok(())
    }

    pub async fn verify_email(&self, token: &str) -> Result<()> {
        ensure_valid(required(token, "Verification token is required"))?;

        self.remote
            .verify_email(&EmailVerificationRequest {
                token: token.trim().to_string(),
            })
            .await?;
        Ok(())
    }

    pub async fn resend_email_verification(&self) -> Result<()> {
        self.remote.resend_email_verification().await?;
        Ok(())
    }

    pub async fn verify_phone(&self, phone: &str, code: &str) -> Result<()> {
        let mut errors = required(phone, "Phone number is required");
        errors.extend(required(code, "Verification code is required"));
        ensure_valid(errors)?;

        self.remote
            .verify_phone(&PhoneVerificationRequest {
                phone: phone.trim().to_string(),
                code: code.trim().to_string(),
            })
            .await?;
        Ok(())
    }

    pub async fn send_phone_verification_code(&self, phone: &str) -> Result<()> {
        ensure_valid(required(phone, "Phone number is required"))?;

        self.remote
            .send_phone_verification_code(&SendVerificationCodeRequest {
                phone: phone.trim().to_string(),
            })
            .await?;
        Ok(())
    }

    /// Delete the account on the server, then forget it locally.
    pub async fn delete_account(&self) -> Result<()> {
        self.remote.delete_account().await?;
        self.clear_local_state();
        tracing::info!("account deleted");
        Ok(())
    }

    fn store_auth_data(&self, response: LoginResponse) -> User {
        if let Err(e) = self.session.sign_in(&response.tokens, &response.user.id) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        self.cache_user(&response.user);
        response.user
    }

    fn cache_user(&self, user: &User) {
        if let Err(e) = self.store.with_db(|db| db.upsert_user(user)) {
            tracing::warn!(error = %e, user_id = %user.id, "failed to cache user");
        }
    }

    /// Best effort: each step runs even if an earlier one failed.
    fn clear_local_state(&self) {
        let user_id = self.session.current_user_id();

        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }

        let Some(user_id) = user_id else {
            return;
        };
        if let Err(e) = self.store.with_db(|db| db.delete_user(&user_id)) {
            tracing::warn!(error = %e, "failed to clear cached user");
        }
        if let Err(e) = self.favorites.clear_for_user(&user_id) {
            tracing::warn!(error = %e, "failed to clear favorites");
        }
    }
}

fn required(value: &str, message: &str) -> Vec<String> {
    if value.trim().is_empty() {
        vec![message.to_string()]
    } else {
        Vec::new()
    }
}
