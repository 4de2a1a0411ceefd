//! Authentication state for the client.
//!
//! This module provides:
//! - `SessionStore`: the single owner of the logged-in session, with
//!   passive expiry checks, a background expiry sweep, and change
//!   notifications
//! - `KeyValueStore` backends the session is persisted to (file, OS
//!   keychain, memory)
//! - `Clock`: injectable time source for expiry decisions
//!
//! Sessions are persisted under three keys (`user`, `token`,
//! `tokenExpiry`) and expire after 7 days unless configured otherwise.

pub mod clock;
pub mod keychain;
pub mod session;
pub mod storage;

#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use keychain::KeyringStore;
pub use session::{
    Session, SessionStore, DEFAULT_SESSION_TTL_DAYS, EXPIRY_KEY, SWEEP_INTERVAL, TOKEN_KEY,
    USER_KEY,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};
