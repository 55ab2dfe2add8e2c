use std::net::{Ipv4Addr, SocketAddr};

use crate::session::HeaderSessionProvider;

pub const BIND_ADDR_ENV_VAR: &str = "TICKWATCH_BIND_ADDR";
pub const SESSION_HEADER_ENV_VAR: &str = "TICKWATCH_SESSION_HEADER";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub bind_addr: SocketAddr,
    /// Header carrying the signed-in user's email.
    pub session_header: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            session_header: HeaderSessionProvider::DEFAULT_HEADER.to_owned(),
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Unset, blank or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_addr = match present(BIND_ADDR_ENV_VAR) {
            Some(value) => value.trim().parse().unwrap_or_else(|error| {
                tracing::warn!(value = %value, %error, "ignoring invalid bind address");
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        Self {
            bind_addr,
            session_header: present(SESSION_HEADER_ENV_VAR)
                .map(|value| value.trim().to_owned())
                .unwrap_or(defaults.session_header),
        }
    }
}
