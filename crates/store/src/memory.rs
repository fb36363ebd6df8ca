//! In-memory document store.
//!
//! Collections are plain vectors in insertion order behind
//! `tokio::sync::RwLock`, which mirrors a document database's natural
//! ordering and gives every write a single critical section. That is
//! what makes [`CartStore::add_or_increment`] and
//! [`CartStore::clear_session`] atomic: no reader or writer can observe
//! the collection between the lookup and the write.
//!
//! Cross-collection checks (book exists before a cart write) are still
//! read-then-act at the service layer; there are no transactions
//! spanning collections here.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::records::{Book, BookFilter, BookPatch, CartLine, NewBook, NewReview, Review};
use crate::{BookStore, CartStore, ReviewStore};

/// All three collections in one process-local store.
#[derive(Default)]
pub struct MemoryStore {
    books: RwLock<Vec<Book>>,
    reviews: RwLock<Vec<Review>>,
    carts: RwLock<Vec<CartLine>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id() -> String {
        Uuid::now_v7().to_string()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        if books.iter().any(|b| b.isbn == book.isbn) {
            return Err(StoreError::UniqueViolation {
                collection: "books",
                field: "isbn",
            });
        }
        let now = OffsetDateTime::now_utc();
        let record = Book {
            id: Self::next_id(),
            title: book.title,
            author: book.author,
            description: book.description,
            price: book.price,
            image: book.image,
            isbn: book.isbn,
            genre: book.genre,
            tags: book.tags,
            date_published: book.date_published,
            pages: book.pages,
            language: book.language,
            publisher: book.publisher,
            rating: book.rating,
            review_count: book.review_count,
            in_stock: book.in_stock,
            featured: book.featured,
            created_at: now,
            updated_at: now,
        };
        books.push(record.clone());
        tracing::debug!(book_id = %record.id, isbn = %record.isbn, "book inserted");
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let books = self.books.read().await;
        Ok(books.iter().find(|b| b.id == id).cloned())
    }

    async fn page(
        &self,
        filter: &BookFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Book>, StoreError> {
        let books = self.books.read().await;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(books
            .iter()
            .filter(|b| filter.matches(b))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError> {
        let books = self.books.read().await;
        Ok(books.iter().filter(|b| filter.matches(b)).count() as u64)
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Option<Book>, StoreError> {
        let mut books = self.books.write().await;
        if let Some(new_isbn) = &patch.isbn {
            if books.iter().any(|b| b.isbn == *new_isbn && b.id != id) {
                return Err(StoreError::UniqueViolation {
                    collection: "books",
                    field: "isbn",
                });
            }
        }
        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };

        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field { book.$field = value; })*
            };
        }
        apply!(title, author, description, price, image, isbn, genre, tags, rating, review_count, in_stock, featured);
        // Optional fields stay optional; a patch can set but not unset them.
        if patch.date_published.is_some() {
            book.date_published = patch.date_published;
        }
        if patch.pages.is_some() {
            book.pages = patch.pages;
        }
        if patch.language.is_some() {
            book.language = patch.language;
        }
        if patch.publisher.is_some() {
            book.publisher = patch.publisher;
        }
        book.updated_at = OffsetDateTime::now_utc();
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let mut books = self.books.write().await;
        let Some(pos) = books.iter().position(|b| b.id == id) else {
            return Ok(None);
        };
        let removed = books.remove(pos);
        tracing::debug!(book_id = %removed.id, "book deleted");
        Ok(Some(removed))
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn insert(&self, review: NewReview) -> Result<Review, StoreError> {
        let mut reviews = self.reviews.write().await;
        let record = Review {
            id: Self::next_id(),
            book_id: review.book_id,
            user: review.user,
            rating: review.rating,
            title: review.title,
            comment: review.comment,
            date: review.date,
            verified: review.verified,
        };
        reviews.push(record.clone());
        Ok(record)
    }

    async fn for_book(&self, book_id: &str) -> Result<Vec<Review>, StoreError> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn add_or_increment(
        &self,
        session_id: &str,
        book_id: &str,
        quantity: u32,
    ) -> Result<CartLine, StoreError> {
        let mut carts = self.carts.write().await;
        if let Some(line) = carts
            .iter_mut()
            .find(|l| l.session_id == session_id && l.book_id == book_id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return Ok(line.clone());
        }
        let line = CartLine {
            id: Self::next_id(),
            session_id: session_id.to_string(),
            book_id: book_id.to_string(),
            quantity,
            added_at: OffsetDateTime::now_utc(),
        };
        carts.push(line.clone());
        Ok(line)
    }

    async fn get(&self, item_id: &str, session_id: &str) -> Result<Option<CartLine>, StoreError> {
        let carts = self.carts.read().await;
        Ok(carts
            .iter()
            .find(|l| l.id == item_id && l.session_id == session_id)
            .cloned())
    }

    async fn set_quantity(
        &self,
        item_id: &str,
        session_id: &str,
        quantity: u32,
    ) -> Result<Option<CartLine>, StoreError> {
        let mut carts = self.carts.write().await;
        let Some(line) = carts
            .iter_mut()
            .find(|l| l.id == item_id && l.session_id == session_id)
        else {
            return Ok(None);
        };
        line.quantity = quantity;
        Ok(Some(line.clone()))
    }

    async fn remove(
        &self,
        item_id: &str,
        session_id: &str,
    ) -> Result<Option<CartLine>, StoreError> {
        let mut carts = self.carts.write().await;
        let Some(pos) = carts
            .iter()
            .position(|l| l.id == item_id && l.session_id == session_id)
        else {
            return Ok(None);
        };
        Ok(Some(carts.remove(pos)))
    }

    async fn for_session(&self, session_id: &str) -> Result<Vec<CartLine>, StoreError> {
        let carts = self.carts.read().await;
        Ok(carts
            .iter()
            .filter(|l| l.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn clear_session(&self, session_id: &str) -> Result<u64, StoreError> {
        let mut carts = self.carts.write().await;
        let before = carts.len();
        carts.retain(|l| l.session_id != session_id);
        let removed = (before - carts.len()) as u64;
        tracing::debug!(session_id, removed, "cart cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, isbn: &str, genre: &[&str]) -> NewBook {
        NewBook {
            title: title.into(),
            author: "Test Author".into(),
            description: "A test book".into(),
            price: 9.99,
            image: "/images/default.jpg".into(),
            isbn: isbn.into(),
            genre: genre.iter().map(|s| s.to_string()).collect(),
            tags: vec![],
            date_published: None,
            pages: None,
            language: None,
            publisher: None,
            rating: 0.0,
            review_count: 0,
            in_stock: true,
            featured: false,
        }
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected() {
        let store = MemoryStore::new();
        BookStore::insert(&store, new_book("A", "111", &[]))
            .await
            .unwrap();
        let err = BookStore::insert(&store, new_book("B", "111", &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                collection: "books",
                field: "isbn"
            }
        ));
        assert!(err.to_string().contains("unique"));
    }

    #[tokio::test]
    async fn page_and_count_share_the_filter() {
        let store = MemoryStore::new();
        for i in 1..=12 {
            BookStore::insert(
                &store,
                new_book(&format!("Fiction {i}"), &format!("f-{i}"), &["Fiction"]),
            )
            .await
            .unwrap();
        }
        for i in 1..=3 {
            BookStore::insert(
                &store,
                new_book(&format!("History {i}"), &format!("h-{i}"), &["History"]),
            )
            .await
            .unwrap();
        }

        let filter = BookFilter {
            genre: Some("fiction".into()),
            ..Default::default()
        };
        assert_eq!(store.count(&filter).await.unwrap(), 12);

        // Page 2 of 5 covers matches 6 through 10.
        let page = store.page(&filter, 5, 5).await.unwrap();
        let titles: Vec<_> = page.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Fiction 6", "Fiction 7", "Fiction 8", "Fiction 9", "Fiction 10"]
        );

        // Last page is short, past-the-end pages are empty.
        assert_eq!(store.page(&filter, 10, 5).await.unwrap().len(), 2);
        assert!(store.page(&filter, 15, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_patches_only_provided_fields() {
        let store = MemoryStore::new();
        let book = BookStore::insert(&store, new_book("A", "111", &[]))
            .await
            .unwrap();

        let patch = BookPatch {
            price: Some(19.99),
            in_stock: Some(false),
            ..Default::default()
        };
        let updated = store.update(&book.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.price, 19.99);
        assert!(!updated.in_stock);
        assert_eq!(updated.title, "A");
        assert_eq!(updated.isbn, "111");

        assert!(store
            .update("missing", BookPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_cannot_steal_an_isbn() {
        let store = MemoryStore::new();
        let a = BookStore::insert(&store, new_book("A", "111", &[]))
            .await
            .unwrap();
        BookStore::insert(&store, new_book("B", "222", &[]))
            .await
            .unwrap();

        let patch = BookPatch {
            isbn: Some("222".into()),
            ..Default::default()
        };
        let err = store.update(&a.id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));

        // Re-asserting a book's own ISBN is not a violation.
        let patch = BookPatch {
            isbn: Some("111".into()),
            ..Default::default()
        };
        assert!(store.update(&a.id, patch).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_returns_the_record_once() {
        let store = MemoryStore::new();
        let book = BookStore::insert(&store, new_book("A", "111", &[]))
            .await
            .unwrap();
        let removed = store.delete(&book.id).await.unwrap().unwrap();
        assert_eq!(removed.id, book.id);
        assert!(store.delete(&book.id).await.unwrap().is_none());
        assert!(BookStore::get(&store, &book.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reviews_come_back_in_insertion_order() {
        let store = MemoryStore::new();
        for user in ["alice", "bob"] {
            ReviewStore::insert(
                &store,
                NewReview {
                    book_id: "b-1".into(),
                    user: user.into(),
                    rating: 4.0,
                    title: None,
                    comment: "fine".into(),
                    date: "2024-01-01".into(),
                    verified: false,
                },
            )
            .await
            .unwrap();
        }
        ReviewStore::insert(
            &store,
            NewReview {
                book_id: "b-2".into(),
                user: "carol".into(),
                rating: 5.0,
                title: Some("great".into()),
                comment: "great".into(),
                date: "2024-01-02".into(),
                verified: true,
            },
        )
        .await
        .unwrap();

        let reviews = store.for_book("b-1").await.unwrap();
        let users: Vec<_> = reviews.iter().map(|r| r.user.as_str()).collect();
        assert_eq!(users, ["alice", "bob"]);
    }

    #[tokio::test]
    async fn repeated_adds_accumulate_on_one_line() {
        let store = MemoryStore::new();
        let first = store.add_or_increment("s-1", "b-1", 2).await.unwrap();
        let second = store.add_or_increment("s-1", "b-1", 3).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);

        let lines = store.for_session("s-1").await.unwrap();
        assert_eq!(lines.len(), 1);

        // A different session gets its own line.
        store.add_or_increment("s-2", "b-1", 1).await.unwrap();
        assert_eq!(store.for_session("s-1").await.unwrap().len(), 1);
        assert_eq!(store.for_session("s-2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_adds_do_not_lose_updates() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let mut tasks = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.add_or_increment("s-1", "b-1", 1).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let lines = store.for_session("s-1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 10);
    }

    #[tokio::test]
    async fn get_line_is_session_scoped() {
        let store = MemoryStore::new();
        let line = store.add_or_increment("s-1", "b-1", 2).await.unwrap();

        let found = CartStore::get(&store, &line.id, "s-1").await.unwrap();
        assert_eq!(found.unwrap().quantity, 2);
        assert!(CartStore::get(&store, &line.id, "s-other")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn set_quantity_is_absolute_and_session_scoped() {
        let store = MemoryStore::new();
        let line = store.add_or_increment("s-1", "b-1", 4).await.unwrap();

        let updated = store
            .set_quantity(&line.id, "s-1", 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.quantity, 1);

        // A foreign session sees nothing and mutates nothing.
        assert!(store
            .set_quantity(&line.id, "s-other", 7)
            .await
            .unwrap()
            .is_none());
        let lines = store.for_session("s-1").await.unwrap();
        assert_eq!(lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn remove_is_session_scoped() {
        let store = MemoryStore::new();
        let line = store.add_or_increment("s-1", "b-1", 1).await.unwrap();

        assert!(store.remove(&line.id, "s-other").await.unwrap().is_none());
        assert_eq!(store.for_session("s-1").await.unwrap().len(), 1);

        let removed = store.remove(&line.id, "s-1").await.unwrap().unwrap();
        assert_eq!(removed.id, line.id);
        assert!(store.for_session("s-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_session_is_one_bulk_delete() {
        let store = MemoryStore::new();
        store.add_or_increment("s-1", "b-1", 1).await.unwrap();
        store.add_or_increment("s-1", "b-2", 2).await.unwrap();
        store.add_or_increment("s-2", "b-1", 3).await.unwrap();

        assert_eq!(store.clear_session("s-1").await.unwrap(), 2);
        assert!(store.for_session("s-1").await.unwrap().is_empty());
        assert_eq!(store.for_session("s-2").await.unwrap().len(), 1);
        assert_eq!(store.clear_session("s-1").await.unwrap(), 0);
    }
}
