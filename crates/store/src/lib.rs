//! Document store access for bookmart.
//!
//! The catalog, review, and cart collections are reached exclusively
//! through the [`BookStore`], [`ReviewStore`], and [`CartStore`] traits;
//! the backing database is an implementation detail behind them. The
//! in-memory backend in [`memory`] is the one that ships in-tree.

use std::sync::Arc;

use async_trait::async_trait;

pub mod error;
pub mod memory;
pub mod records;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use records::{Book, BookFilter, BookPatch, CartLine, NewBook, NewReview, Review};

/// Catalog collection operations.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a new book. Fails with [`StoreError::UniqueViolation`] if the
    /// ISBN is already taken.
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Look up a single book by id.
    async fn get(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Return one page of books matching `filter`, skipping `skip` matches
    /// and returning at most `limit`.
    async fn page(&self, filter: &BookFilter, skip: u64, limit: u64)
        -> Result<Vec<Book>, StoreError>;

    /// Count every book matching `filter`, ignoring pagination.
    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError>;

    /// Apply a partial update. Returns `None` if the book does not exist.
    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError>;

    /// Delete a book, returning the deleted record. Reviews and cart lines
    /// referencing it are left dangling; consumers filter them out.
    async fn delete(&self, id: &str) -> Result<Option<Book>, StoreError>;
}

/// Review collection operations. Reviews are written by seeding and
/// never updated, so the surface is intentionally small.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, review: NewReview) -> Result<Review, StoreError>;

    /// All reviews for one book, in insertion order.
    async fn for_book(&self, book_id: &str) -> Result<Vec<Review>, StoreError>;
}

/// Cart collection operations, all scoped by session.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Atomic increment-or-insert for the (session, book) line. Creates the
    /// line with `quantity` when absent, otherwise adds `quantity` to the
    /// existing line. This is the only write path for adds, so the
    /// one-line-per-(session, book) invariant cannot be raced from here.
    async fn add_or_increment(
        &self,
        session_id: &str,
        book_id: &str,
        quantity: u32,
    ) -> Result<CartLine, StoreError>;

    /// Look up one line. Returns `None` when the line does not exist or
    /// belongs to a different session.
    async fn get(&self, item_id: &str, session_id: &str) -> Result<Option<CartLine>, StoreError>;

    /// Set a line's quantity to an absolute value. Returns `None` when the
    /// line does not exist or belongs to a different session.
    async fn set_quantity(
        &self,
        item_id: &str,
        session_id: &str,
        quantity: u32,
    ) -> Result<Option<CartLine>, StoreError>;

    /// Delete a line, returning it. Returns `None` when the line does not
    /// exist or belongs to a different session.
    async fn remove(&self, item_id: &str, session_id: &str)
        -> Result<Option<CartLine>, StoreError>;

    /// Every line for the session, in insertion order.
    async fn for_session(&self, session_id: &str) -> Result<Vec<CartLine>, StoreError>;

    /// Bulk delete of every line for the session, in one operation.
    /// Returns the number of removed lines.
    async fn clear_session(&self, session_id: &str) -> Result<u64, StoreError>;
}

/// Shared handle bundling the three collections, constructed once at
/// startup and dependency-injected into the services.
#[derive(Clone)]
pub struct StoreHandle {
    pub books: Arc<dyn BookStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub carts: Arc<dyn CartStore>,
}

impl StoreHandle {
    /// Build a handle backed by a single in-memory store.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            books: store.clone() as Arc<dyn BookStore>,
            reviews: store.clone() as Arc<dyn ReviewStore>,
            carts: store as Arc<dyn CartStore>,
        }
    }
}
