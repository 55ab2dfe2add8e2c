//! Add/remove control for a single symbol.
//!
//! The control flips its membership optimistically when activated and
//! waits in [`ToggleState::Pending`] until [`WatchlistToggle::complete`]
//! receives the mutation result. A failed or errored mutation restores the
//! previous membership. While pending, further activations are refused.

use serde::Serialize;
use tickwatch_core::Symbol;
use tickwatch_store::MutationOutcome;

use crate::backend::{BackendError, WatchlistBackend};
use crate::render::SIGN_IN_HREF;

pub const SIGN_IN_REQUIRED: &str = "Please sign in to use watchlist";
pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    Idle,
    Pending,
    Confirmed,
    Reverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Success,
    Error,
}

/// Side effects the surrounding UI should perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ToggleEvent {
    Notify { level: NotifyLevel, message: String },
    Redirect { href: String },
    MembershipChanged { symbol: Symbol, in_watchlist: bool },
    Refresh,
}

impl ToggleEvent {
    fn error(message: impl Into<String>) -> Self {
        Self::Notify {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }
}

/// The server call an activation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleMutation {
    Add {
        email: String,
        symbol: Symbol,
        company: String,
    },
    Remove {
        email: String,
        symbol: Symbol,
    },
}

impl ToggleMutation {
    pub async fn run(
        &self,
        backend: &dyn WatchlistBackend,
    ) -> Result<MutationOutcome, BackendError> {
        match self {
            Self::Add {
                email,
                symbol,
                company,
            } => backend.add(email, symbol.as_str(), company).await,
            Self::Remove { email, symbol } => backend.remove(email, symbol.as_str()).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A mutation is already in flight.
    Busy,
    SignInRequired(Vec<ToggleEvent>),
    Mutate(ToggleMutation),
}

#[derive(Debug, Clone)]
pub struct WatchlistToggle {
    symbol: Symbol,
    company: String,
    user_email: Option<String>,
    in_watchlist: bool,
    previous: bool,
    state: ToggleState,
}

impl WatchlistToggle {
    pub fn new(
        symbol: Symbol,
        company: impl Into<String>,
        user_email: Option<String>,
        in_watchlist: bool,
    ) -> Self {
        Self {
            symbol,
            company: company.into(),
            user_email: user_email.filter(|email| !email.trim().is_empty()),
            in_watchlist,
            previous: in_watchlist,
            state: ToggleState::Idle,
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn in_watchlist(&self) -> bool {
        self.in_watchlist
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn is_disabled(&self) -> bool {
        self.state == ToggleState::Pending
    }

    pub fn label(&self) -> &'static str {
        if self.in_watchlist {
            "Remove from Watchlist"
        } else {
            "Add to Watchlist"
        }
    }

    pub fn title(&self) -> String {
        if self.in_watchlist {
            format!("Remove {} from watchlist", self.symbol)
        } else {
            format!("Add {} to watchlist", self.symbol)
        }
    }

    pub fn activate(&mut self) -> Activation {
        if self.state == ToggleState::Pending {
            return Activation::Busy;
        }

        let Some(email) = self.user_email.clone() else {
            return Activation::SignInRequired(vec![
                ToggleEvent::error(SIGN_IN_REQUIRED),
                ToggleEvent::Redirect {
                    href: SIGN_IN_HREF.to_owned(),
                },
            ]);
        };

        self.previous = self.in_watchlist;
        self.in_watchlist = !self.in_watchlist;
        self.state = ToggleState::Pending;

        let symbol = self.symbol.clone();
        Activation::Mutate(if self.in_watchlist {
            ToggleMutation::Add {
                email,
                symbol,
                company: self.company.clone(),
            }
        } else {
            ToggleMutation::Remove { email, symbol }
        })
    }

    /// Apply the result of the mutation requested by [`activate`](Self::activate).
    ///
    /// Ignored unless a mutation is pending.
    pub fn complete(&mut self, result: Result<MutationOutcome, BackendError>) -> Vec<ToggleEvent> {
        if self.state != ToggleState::Pending {
            tracing::debug!(symbol = %self.symbol, state = ?self.state, "ignoring result without pending toggle");
            return Vec::new();
        }

        match result {
            Ok(outcome) if outcome.success => {
                self.state = ToggleState::Confirmed;
                vec![
                    ToggleEvent::Notify {
                        level: NotifyLevel::Success,
                        message: outcome.message,
                    },
                    ToggleEvent::MembershipChanged {
                        symbol: self.symbol.clone(),
                        in_watchlist: self.in_watchlist,
                    },
                    ToggleEvent::Refresh,
                ]
            }
            Ok(outcome) => {
                self.revert();
                vec![ToggleEvent::error(outcome.message)]
            }
            Err(error) => {
                tracing::error!(symbol = %self.symbol, error = %error, "watchlist toggle failed");
                self.revert();
                vec![ToggleEvent::error(GENERIC_FAILURE)]
            }
        }
    }

    /// Abandon the pending mutation and restore the previous membership.
    ///
    /// Returns `false` when nothing was pending. A result that arrives
    /// afterwards is ignored by [`complete`](Self::complete).
    pub fn cancel(&mut self) -> bool {
        if self.state != ToggleState::Pending {
            return false;
        }
        tracing::debug!(symbol = %self.symbol, "watchlist toggle cancelled");
        self.revert();
        true
    }

    /// Activate, run the mutation against `backend` and apply its result.
    ///
    /// Dropping the returned future before it resolves leaves the control
    /// pending; call [`cancel`](Self::cancel) to release it.
    pub async fn toggle(&mut self, backend: &dyn WatchlistBackend) -> Vec<ToggleEvent> {
        match self.activate() {
            Activation::Busy => Vec::new(),
            Activation::SignInRequired(events) => events,
            Activation::Mutate(mutation) => {
                let result = mutation.run(backend).await;
                self.complete(result)
            }
        }
    }

    fn revert(&mut self) {
        self.in_watchlist = self.previous;
        self.state = ToggleState::Reverted;
    }
}
