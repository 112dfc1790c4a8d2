//! Local user accounts, as far as this crate needs to see them.
//!
//! The host application owns the user schema; the core only requires a
//! primary key, a password-like field it strips, and a lookup scoped by the
//! configured finder.

mod errors;
mod storage;
mod types;

pub use errors::UserError;
pub use storage::{MemoryUserStore, UserStore};
pub use types::UserRecord;
