use axum::http::HeaderMap;
use serde::Serialize;

/// The signed-in user, as far as the watchlist cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub email: String,
}

impl Session {
    /// `None` for a blank email.
    pub fn new(email: impl Into<String>) -> Option<Self> {
        let email = email.into().trim().to_owned();
        (!email.is_empty()).then_some(Self { email })
    }
}

/// Looks up the session for an incoming request.
pub trait SessionProvider: Send + Sync {
    fn get_session(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Trusts an email header set by the fronting auth proxy.
#[derive(Debug, Clone)]
pub struct HeaderSessionProvider {
    header: String,
}

impl HeaderSessionProvider {
    pub const DEFAULT_HEADER: &'static str = "x-user-email";

    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

impl Default for HeaderSessionProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HEADER)
    }
}

impl SessionProvider for HeaderSessionProvider {
    fn get_session(&self, headers: &HeaderMap) -> Option<Session> {
        let value = headers.get(self.header.as_str())?.to_str().ok()?;
        Session::new(value)
    }
}
