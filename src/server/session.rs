//! Session Cookie
//!
//! The session id travels in a single cookie. Absent or malformed values get a
//! fresh id, which is then issued on the response.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use tracing::debug;

use crate::constants::server::SESSION_COOKIE;
use crate::types::SessionId;

const MAX_SESSION_ID_LEN: usize = 64;

/// Session resolved for one request
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub id: SessionId,
    /// True when the id was minted for this request and must be set
    pub issued: bool,
}

impl ClientSession {
    /// Read the session cookie, minting a new id when missing
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match find_cookie(headers, SESSION_COOKIE) {
            Some(value) if is_valid_id(value) => Self {
                id: SessionId::new(value),
                issued: false,
            },
            _ => {
                let id = SessionId::generate();
                debug!(session = %id, "Issuing new session");
                Self { id, issued: true }
            }
        }
    }

    /// Attach `Set-Cookie` when the id is new
    pub fn apply(&self, mut response: Response) -> Response {
        if self.issued
            && let Ok(value) = HeaderValue::from_str(&set_cookie_value(&self.id))
        {
            response.headers_mut().append(SET_COOKIE, value);
        }
        response
    }
}

fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

fn is_valid_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn set_cookie_value(id: &SessionId) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
