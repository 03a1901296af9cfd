//! # alfred-memory
//!
//! The two-tier memory model for the Alfred document assistant:
//!
//! - **Cross-thread memory** — a [`UserProfile`] per user identity, persisted
//!   across conversations in a [`ProfileStore`] and rewritten wholesale after
//!   every turn by structured extraction ([`ProfileExtractor`]).
//! - **Within-thread memory** — a [`Checkpoint`] per conversation session,
//!   holding the message list, kept in a [`SessionStore`] and never deleted
//!   automatically.

pub mod error;
pub mod extract;
pub mod profile;
pub mod session;
pub mod store;

pub use error::{MemoryError, Result};
pub use extract::{LlmProfileExtractor, ProfileExtractor};
pub use profile::UserProfile;
pub use session::{Checkpoint, SessionStore};
pub use store::{InMemoryProfileStore, ProfileStore};
