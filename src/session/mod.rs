//! Session storage for the form-filling flow.
//!
//! This module provides the in-memory session store that owns the full
//! lifecycle of a form session: creation with a fresh opaque token,
//! exactly-one submission, and age-based expiry via the periodic sweep.
//!
//! # Architecture
//!
//! - [`Session`]: a single form-filling transaction (a plain record)
//! - [`SessionStore`]: thread-safe store for all live sessions
//!
//! # Example
//!
//! ```rust
//! use formrelay::session::{SessionStatus, SessionStore};
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! assert_eq!(session.status, SessionStatus::Pending);
//!
//! let filled = store
//!     .fill(&session.id, serde_json::json!({"name": "Alice"}))
//!     .unwrap();
//! assert_eq!(filled.status, SessionStatus::Filled);
//! ```

mod store;

pub use store::{Session, SessionError, SessionStatus, SessionStore};
