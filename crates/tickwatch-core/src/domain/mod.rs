//! # Domain Models
//!
//! Canonical domain types for tickwatch.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercased ticker |
//! | [`UtcDateTime`] | UTC timestamp at microsecond precision |
//! | [`QuoteData`] | Latest quote, every field optional |
//! | [`ProfileData`] | Company profile, every field optional |
//! | [`Enrichment`] | Quote and profile for one symbol |
//!
//! Market data is never persisted; a failed fetch is represented by the
//! `Default` value of the corresponding type.

mod models;
mod symbol;
mod timestamp;

pub use models::{Enrichment, ProfileData, QuoteData};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
