//! Record types for the three collections.
//!
//! Wire format is camelCase to match the JSON API; ids are UUID strings
//! assigned by the store on insert.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub isbn: String,
    pub genre: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Denormalized average rating, 0 to 5. Not recomputed from review
    /// rows; it can drift from them.
    pub rating: f64,
    /// Denormalized review count. Same caveat as `rating`.
    pub review_count: u32,
    pub in_stock: bool,
    pub featured: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields for a book insert, with defaults already applied by the
/// caller. The store supplies id and timestamps.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub isbn: String,
    pub genre: Vec<String>,
    pub tags: Vec<String>,
    pub date_published: Option<String>,
    pub pages: Option<u32>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub rating: f64,
    pub review_count: u32,
    pub in_stock: bool,
    pub featured: bool,
}

/// Partial update for a book; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub date_published: Option<String>,
    pub pages: Option<u32>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
}

/// Catalog filter shared by the page and count queries so totals are
/// computed over the same match set.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive membership test against the book's genre set.
    pub genre: Option<String>,
    /// Case-insensitive substring over title, author, or any tag.
    pub search: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        let genre_ok = match &self.genre {
            None => true,
            Some(wanted) => {
                let wanted = wanted.to_lowercase();
                book.genre.iter().any(|g| g.to_lowercase() == wanted)
            }
        };
        let search_ok = match &self.search {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                book.title.to_lowercase().contains(&needle)
                    || book.author.to_lowercase().contains(&needle)
                    || book.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            }
        };
        genre_ok && search_ok
    }
}

/// A reader review, referencing exactly one book. The reference is
/// application-level only; deleting the book orphans the review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user: String,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub comment: String,
    pub date: String,
    pub verified: bool,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: String,
    pub user: String,
    pub rating: f64,
    pub title: Option<String>,
    pub comment: String,
    pub date: String,
    pub verified: bool,
}

/// One cart line for an anonymous session. At most one line exists per
/// (session, book) pair; the store's add path enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub session_id: String,
    pub book_id: String,
    pub quantity: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn book(title: &str, author: &str, genre: &[&str], tags: &[&str]) -> Book {
        Book {
            id: "b-1".into(),
            title: title.into(),
            author: author.into(),
            description: "d".into(),
            price: 9.99,
            image: "/images/default.jpg".into(),
            isbn: "isbn-1".into(),
            genre: genre.iter().map(|s| s.to_string()).collect(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            date_published: None,
            pages: None,
            language: None,
            publisher: None,
            rating: 0.0,
            review_count: 0,
            in_stock: true,
            featured: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = BookFilter::default();
        assert!(filter.matches(&book("Dune", "Frank Herbert", &[], &[])));
    }

    #[test]
    fn genre_membership_is_case_insensitive() {
        let filter = BookFilter {
            genre: Some("fiction".into()),
            ..Default::default()
        };
        assert!(filter.matches(&book("Dune", "Frank Herbert", &["Fiction", "Sci-Fi"], &[])));
        assert!(!filter.matches(&book("Dune", "Frank Herbert", &["Non-Fiction"], &[])));
    }

    #[test]
    fn search_spans_title_author_and_tags() {
        let filter = BookFilter {
            search: Some("HERB".into()),
            ..Default::default()
        };
        assert!(filter.matches(&book("Dune", "Frank Herbert", &[], &[])));

        let filter = BookFilter {
            search: Some("space opera".into()),
            ..Default::default()
        };
        assert!(filter.matches(&book("Dune", "Frank Herbert", &[], &["Space Opera", "epic"])));
        assert!(!filter.matches(&book("Dune", "Frank Herbert", &[], &["epic"])));
    }

    #[test]
    fn genre_and_search_combine_with_and() {
        let filter = BookFilter {
            genre: Some("Fiction".into()),
            search: Some("dune".into()),
        };
        assert!(filter.matches(&book("Dune", "Frank Herbert", &["Fiction"], &[])));
        assert!(!filter.matches(&book("Dune", "Frank Herbert", &["History"], &[])));
        assert!(!filter.matches(&book("Emma", "Jane Austen", &["Fiction"], &[])));
    }
}
