use serde::{Deserialize, Serialize};

use bookmart_store::{Book, Review};

/// Query parameters for the catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub genre: Option<String>,
    pub search: Option<String>,
}

/// Pagination envelope computed over the full match set, not the page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookListResponse {
    pub data: Vec<Book>,
    pub pagination: Pagination,
}

/// A single book with its reviews embedded.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookDetailResponse {
    pub success: bool,
    pub data: BookDetail,
}

/// Incoming create payload. Everything is optional at the wire level so
/// missing required fields can be aggregated into one validation error
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
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

/// Incoming update payload; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
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

/// Response for a delete, echoing the removed record.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteBookResponse {
    pub message: String,
    pub book: Book,
}
