use axum::http::{header, HeaderMap};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

pub const ADMIN_FLAG_COOKIE: &str = "isAdmin";
const FLAG_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 365;

/// Issues and checks the persisted password-login flag.
///
/// The cookie value is `<issued_at>.<hex hmac>`, so the browser keeps the flag
/// across sessions but cannot mint one.
#[derive(Clone)]
pub struct AdminFlagSigner {
    secret: String,
    secure: bool,
}

impl AdminFlagSigner {
    pub fn new(secret: &str, secure: bool) -> Self {
        Self {
            secret: secret.to_string(),
            secure,
        }
    }

    fn mac(&self, issued_at: i64) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::Internal(format!("HMAC error: {}", e)))?;
        mac.update(format!("{}:true:{}", ADMIN_FLAG_COOKIE, issued_at).as_bytes());
        Ok(mac)
    }

    pub fn sign(&self, issued_at: i64) -> AppResult<String> {
        let signature = hex::encode(self.mac(issued_at)?.finalize().into_bytes());
        Ok(format!("{}.{}", issued_at, signature))
    }

    pub fn issue(&self) -> AppResult<String> {
        self.sign(Utc::now().timestamp())
    }

    pub fn verify(&self, value: &str) -> bool {
        let Some((issued_at, signature)) = value.split_once('.') else {
            return false;
        };
        let Ok(issued_at) = issued_at.parse::<i64>() else {
            return false;
        };
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };

        let age = Utc::now().timestamp() - issued_at;
        if !(0..=FLAG_MAX_AGE_SECS).contains(&age) {
            return false;
        }

        self.mac(issued_at)
            .is_ok_and(|mac| mac.verify_slice(&signature).is_ok())
    }

    /// Whether the request carries a valid flag.
    pub fn is_set(&self, headers: &HeaderMap) -> bool {
        cookie_value(headers, ADMIN_FLAG_COOKIE).is_some_and(|v| self.verify(v))
    }

    pub fn set_cookie(&self) -> AppResult<String> {
        Ok(self.cookie(&self.issue()?, FLAG_MAX_AGE_SECS))
    }

    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            ADMIN_FLAG_COOKIE, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Reads one cookie from the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
