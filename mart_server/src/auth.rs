//! Session-cookie crypto and the authenticated-user extractor.
//!
//! The cookie value is `base64url(nonce ‖ AES-256-GCM(user_id))`. The nonce
//! is 12 random bytes drawn per seal; GCM authentication makes a tampered or
//! foreign cookie indistinguishable from garbage.

use std::future::{ready, Ready};

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::Payload,
    error::ErrorUnauthorized,
    FromRequest, HttpMessage, HttpRequest,
};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE, Engine};
use rand::RngCore;
use thiserror::Error;

pub const SESSION_COOKIE: &str = "userID";
/// Sessions expire after eight hours.
pub const SESSION_TTL_HOURS: i64 = 8;

const NONCE_SIZE: usize = 12;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid authentication cookie")]
    InvalidCookie,
    #[error("session sealing failed")]
    SealFailed,
}

/// The AES-256-GCM key sessions are sealed under.
#[derive(Clone)]
pub struct SessionKey {
    cipher: Aes256Gcm,
}

impl SessionKey {
    pub fn new(key: &[u8; 32]) -> Self {
        Self { cipher: Aes256Gcm::new(key.into()) }
    }

    /// Encrypt a user id into a cookie value.
    pub fn seal(&self, user_id: i64) -> Result<String, AuthError> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), user_id.to_string().as_bytes())
            .map_err(|_| AuthError::SealFailed)?;
        let mut envelope = nonce.to_vec();
        envelope.extend_from_slice(&ciphertext);
        Ok(URL_SAFE.encode(envelope))
    }

    /// Decrypt a cookie value back into a user id. Every failure collapses
    /// into `InvalidCookie`; callers answer 401 either way.
    pub fn open(&self, value: &str) -> Result<i64, AuthError> {
        let envelope = URL_SAFE.decode(value).map_err(|_| AuthError::InvalidCookie)?;
        if envelope.len() < NONCE_SIZE {
            return Err(AuthError::InvalidCookie);
        }
        let (nonce, ciphertext) = envelope.split_at(NONCE_SIZE);
        let plain =
            self.cipher.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| AuthError::InvalidCookie)?;
        let id = String::from_utf8(plain).map_err(|_| AuthError::InvalidCookie)?;
        id.parse().map_err(|_| AuthError::InvalidCookie)
    }

    /// Build the session cookie issued on register and login.
    pub fn session_cookie(&self, user_id: i64) -> Result<Cookie<'static>, AuthError> {
        let value = self.seal(user_id)?;
        Ok(Cookie::build(SESSION_COOKIE, value)
            .path("/")
            .max_age(CookieDuration::hours(SESSION_TTL_HOURS))
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish())
    }
}

/// The user id the session middleware authenticated for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().copied();
        ready(user.ok_or_else(|| ErrorUnauthorized(r#"{"error":"user is not authenticated"}"#)))
    }
}
