//! Cookie sessions: an opaque random token mapped to the signed-in user.

use crate::errors::AppError;
use crate::models::UserId;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "habit_session";
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct Session {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    secure_cookie: bool,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration, secure_cookie: bool) -> Self {
        Self {
            ttl,
            secure_cookie,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a session for `user_id` and returns its token.
    pub async fn create(&self, user_id: UserId) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let session = Session {
            user_id,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.lock().await.insert(token.clone(), session);
        token
    }

    pub async fn lookup(&self, token: &str) -> Option<UserId> {
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();
        sessions.retain(|_, session| session.expires_at > now);
        sessions.get(token).map(|session| session.user_id)
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.lock().await.remove(token);
    }

    pub async fn current_user(&self, headers: &HeaderMap) -> Option<UserId> {
        let token = token_from_headers(headers)?;
        self.lookup(&token).await
    }

    pub fn set_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl.num_seconds()
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn clear_cookie(&self) -> String {
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// The signed-in user. Rejects with 401 when the request has no live session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .sessions
            .current_user(&parts.headers)
            .await
            .map(CurrentUser)
            .ok_or(AppError::Unauthenticated)
    }
}
