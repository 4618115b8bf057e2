//! Server-side search sessions.
//!
//! A session is created by `POST /search` and stays addressable by its id
//! until it expires, so a client can request the manual fallback or poll
//! the state while the automatic path is still running.

mod store;

pub use store::{start_session_sweeper, SearchSessionStore, SharedSession};
