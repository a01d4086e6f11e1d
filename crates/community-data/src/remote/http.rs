//! [`reqwest`] implementation of the remote traits.

use async_trait::async_trait;
use community_shared::RemoteFailure;
use community_store::{Listing, User};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::SessionState;

use super::{
    ApiResponse, AuthRemote, AuthTokens, ChangePasswordRequest, EmailVerificationRequest,
    ListingRemote, LoginRequest, LoginResponse, Page, PageRequest, PasswordResetConfirmRequest,
    PasswordResetRequest, PhoneVerificationRequest, RegisterRequest, RemoteResult,
    SendVerificationCodeRequest, UpdateProfileRequest,
};

/// Talks to the community REST API.
///
/// Requests carry `Authorization: Bearer <token>` whenever the session holds
/// an access token.  Non-2xx statuses become [`RemoteFailure`] with that
/// status; transport problems use the negative pseudo-codes.
#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    session: SessionState,
}

impl HttpRemote {
    pub fn new(config: &ClientConfig, session: SessionState) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(concat!("community-data/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(token) = self.session.auth_token().filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> RemoteResult<T> {
        let response = send(builder).await?;
        response.json::<T>().await.map_err(decode_failure)
    }

    /// For endpoints whose body (if any) carries no data we need.
    async fn execute(&self, builder: RequestBuilder) -> RemoteResult<()> {
        send(builder).await?;
        Ok(())
    }
}

async fn send(builder: RequestBuilder) -> RemoteResult<Response> {
    let response = builder.send().await.map_err(transport_failure)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %url, "request failed");
    tracing::debug!(%body, "error body");

    Err(status_failure(status, &body))
}

/// Map a non-2xx response to a failure, preferring the server's own message.
fn status_failure(status: StatusCode, body: &str) -> RemoteFailure {
    let code = i32::from(status.as_u16());
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|m| !m.trim().is_empty());

    match message {
        Some(message) => RemoteFailure::with_message(code, message),
        None => RemoteFailure::new(code),
    }
}

fn transport_failure(err: reqwest::Error) -> RemoteFailure {
    if err.is_timeout() {
        RemoteFailure::new(RemoteFailure::REQUEST_TIMEOUT)
    } else if err.is_decode() {
        decode_failure(err)
    } else {
        RemoteFailure::network_unavailable(err.to_string())
    }
}

fn decode_failure(err: reqwest::Error) -> RemoteFailure {
    RemoteFailure::with_message(RemoteFailure::UNKNOWN_ERROR, format!("Malformed response: {err}"))
}

fn page_query(request: &PageRequest) -> Vec<(String, String)> {
    let mut query = vec![
        ("page".to_string(), request.page.to_string()),
        ("per_page".to_string(), request.per_page.to_string()),
    ];
    query.extend(request.filters.iter().cloned());
    query
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

fn listing_path<L: Listing>(suffix: &str) -> String {
    let endpoint = L::ITEM_TYPE.endpoint();
    if suffix.is_empty() {
        endpoint.to_string()
    } else {
        format!("{endpoint}/{suffix}")
    }
}

fn listing_item_path<L: Listing>(id: &str, suffix: &str) -> String {
    let mut path = format!("{}/{}", L::ITEM_TYPE.endpoint(), encode_segment(id));
    if !suffix.is_empty() {
        path.push('/');
        path.push_str(suffix);
    }
    path
}

#[async_trait]
impl<L: Listing> ListingRemote<L> for HttpRemote {
    async fn list(&self, request: &PageRequest) -> RemoteResult<Page<L>> {
        let path = listing_path::<L>("");
        self.fetch(self.request(Method::GET, &path).query(&page_query(request)))
            .await
    }

    async fn get_by_id(&self, id: &str) -> RemoteResult<L> {
        let path = listing_item_path::<L>(id, "");
        self.fetch(self.request(Method::GET, &path)).await
    }

    async fn search(&self, query: &str, request: &PageRequest) -> RemoteResult<Page<L>> {
        let path = listing_path::<L>("search");
        let mut params = vec![("q".to_string(), query.to_string())];
        params.extend(page_query(request));
        self.fetch(self.request(Method::GET, &path).query(&params))
            .await
    }

    async fn featured(&self, limit: u32) -> RemoteResult<Vec<L>> {
        let path = listing_path::<L>("featured");
        self.fetch(self.request(Method::GET, &path).query(&[("limit", limit)]))
            .await
    }

    async fn favorite(&self, id: &str) -> RemoteResult<()> {
        let path = listing_item_path::<L>(id, "favorite");
        self.execute(self.request(Method::POST, &path)).await
    }

    async fn unfavorite(&self, id: &str) -> RemoteResult<()> {
        let path = listing_item_path::<L>(id, "favorite");
        self.execute(self.request(Method::DELETE, &path)).await
    }
}

/// Percent-encode an id for use as one path segment.
fn encode_segment(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[async_trait]
impl AuthRemote for HttpRemote {
    async fn login(&self, request: &LoginRequest) -> RemoteResult<LoginResponse> {
        self.fetch(self.request(Method::POST, "auth/login").json(request))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> RemoteResult<LoginResponse> {
        self.fetch(self.request(Method::POST, "auth/register").json(request))
            .await
    }

    async fn logout(&self) -> RemoteResult<()> {
        self.execute(self.request(Method::POST, "auth/logout")).await
    }

    async fn refresh_token(&self) -> RemoteResult<AuthTokens> {
        self.fetch(self.request(Method::POST, "auth/refresh")).await
    }

    async fn current_user(&self) -> RemoteResult<User> {
        self.fetch(self.request(Method::GET, "auth/user")).await
    }

    async fn update_profile(&self, request: &UpdateProfileRequest) -> RemoteResult<User> {
        self.fetch(self.request(Method::PUT, "auth/user").json(request))
            .await
    }

    async fn change_password(&self, request: &ChangePasswordRequest) -> RemoteResult<()> {
        self.execute(self.request(Method::POST, "auth/password/change").json(request))
            .await
    }

    async fn request_password_reset(&self, request: &PasswordResetRequest) -> RemoteResult<()> {
        self.execute(self.request(Method::POST, "auth/password/reset").json(request))
            .await
    }

    async fn confirm_password_reset(
        &self,
        request: &PasswordResetConfirmRequest,
    ) -> RemoteResult<()> {
        self.execute(
            self.request(Method::POST, "auth/password/reset/confirm")
                .json(request),
        )
        .await
    }

    async fn verify_email(&self, request: &EmailVerificationRequest) -> RemoteResult<()> {
        self.execute(self.request(Method::POST, "auth/email/verify").json(request))
            .await
    }

    async fn resend_email_verification(&self) -> RemoteResult<()> {
        self.execute(self.request(Method::POST, "auth/email/verify/resend"))
            .await
    }

    async fn verify_phone(&self, request: &PhoneVerificationRequest) -> RemoteResult<()> {
        self.execute(self.request(Method::POST, "auth/phone/verify").json(request))
            .await
    }

    async fn send_phone_verification_code(
        &self,
        request: &SendVerificationCodeRequest,
    ) -> RemoteResult<()> {
        self.execute(
            self.request(Method::POST, "auth/phone/verify/send")
                .json(request),
        )
        .await
    }

    async fn delete_account(&self) -> RemoteResult<()> {
        self.execute(self.request(Method::DELETE, "auth/user")).await
    }
}
