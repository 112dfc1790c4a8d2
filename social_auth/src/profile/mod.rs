//! Social profile records and their storage.
//!
//! A profile is the persisted mirror of one provider identity, keyed by
//! `(provider, identifier)` and optionally linked to a local user.

mod errors;
mod storage;
mod types;

pub use errors::ProfileError;
pub use storage::{MemoryProfileStore, ProfileStore, SqliteProfileStore};
pub use types::SocialProfile;
