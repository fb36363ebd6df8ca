//! Store-level failures, translated to HTTP errors at the handler
//! boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness index rejected a write (`books.isbn` or
    /// `carts.(sessionId, bookId)`).
    #[error("{field} must be unique")]
    UniqueViolation {
        collection: &'static str,
        field: &'static str,
    },

    /// The backend failed the round-trip. The message is for server-side
    /// logs; callers surface a generic error to clients.
    #[error("store backend failure: {0}")]
    Backend(String),
}
