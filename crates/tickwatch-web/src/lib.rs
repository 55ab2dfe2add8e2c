//! # Tickwatch Web
//!
//! Presentation and HTTP surface for the watchlist.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`backend`] | Async watchlist access (`spawn_blocking` over the store) |
//! | [`render`] | Watchlist page view model with parallel enrichment |
//! | [`toggle`] | Optimistic add/remove control |
//! | [`session`] | Session lookup from request headers |
//! | [`router`] | axum routes and server loop |
//!
//! ## Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/health` | `{ "status": "ok" }` |
//! | GET | `/watchlist` | [`WatchlistPage`] |
//! | GET | `/api/watchlist` | entries, 401 without session |
//! | GET | `/api/watchlist/symbols` | symbols, 401 without session |
//! | POST | `/api/watchlist` | [`MutationOutcome`](tickwatch_store::MutationOutcome) |
//! | DELETE | `/api/watchlist/:symbol` | [`MutationOutcome`](tickwatch_store::MutationOutcome) |

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod session;
pub mod state;
pub mod toggle;

pub use backend::{BackendError, BackendFuture, WatchlistBackend};
pub use config::WebConfig;
pub use error::AppError;
pub use render::{render_watchlist, WatchlistCard, WatchlistPage};
pub use router::{create_router, serve};
pub use session::{HeaderSessionProvider, Session, SessionProvider};
pub use state::AppState;
pub use toggle::{
    Activation, NotifyLevel, ToggleEvent, ToggleMutation, ToggleState, WatchlistToggle,
};
