//! Catalog query service: filtered, paginated views over the book
//! collection, plus the admin-facing CRUD operations.

use std::sync::Arc;

use serde_json::json;

use bookmart_http::{validate_record_id, AppError};
use bookmart_store::{Book, BookFilter, BookPatch, BookStore, NewBook, ReviewStore};

use super::models::{
    BookDetail, BookListResponse, CreateBookRequest, ListParams, Pagination, UpdateBookRequest,
};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;
const DEFAULT_IMAGE: &str = "/images/default.jpg";

#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BookStore>,
    reviews: Arc<dyn ReviewStore>,
}

impl CatalogService {
    pub fn new(books: Arc<dyn BookStore>, reviews: Arc<dyn ReviewStore>) -> Self {
        Self { books, reviews }
    }

    /// One page of books matching the genre/search filter, with totals
    /// computed over the same filter.
    pub async fn list(&self, params: ListParams) -> Result<BookListResponse, AppError> {
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if page < 1 || limit < 1 {
            return Err(AppError::validation(
                vec![json!({"field": "page/limit", "error": "must be at least 1"})],
                "page and limit must be at least 1",
            ));
        }

        let filter = BookFilter {
            genre: params.genre,
            search: params.search,
        };

        let skip = (page - 1).saturating_mul(limit);
        let data = self.books.page(&filter, skip, limit).await?;
        let total = self.books.count(&filter).await?;

        Ok(BookListResponse {
            data,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: total.div_ceil(limit),
            },
        })
    }

    /// Single book with its reviews embedded. Malformed ids fail before
    /// any query; unknown ids are a distinct not-found.
    pub async fn detail(&self, id: &str) -> Result<BookDetail, AppError> {
        validate_record_id(id, "Invalid book ID format")?;

        let book = self
            .books
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found"))?;
        let reviews = self.reviews.for_book(id).await?;

        Ok(BookDetail { book, reviews })
    }

    pub async fn create(&self, req: CreateBookRequest) -> Result<Book, AppError> {
        let new_book = validate_create(req)?;
        Ok(self.books.insert(new_book).await?)
    }

    pub async fn update(&self, id: &str, req: UpdateBookRequest) -> Result<Book, AppError> {
        validate_record_id(id, "Invalid book ID format")?;
        let patch = validate_update(req)?;

        self.books
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found"))
    }

    pub async fn delete(&self, id: &str) -> Result<Book, AppError> {
        validate_record_id(id, "Invalid book ID format")?;

        self.books
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found"))
    }
}

fn validate_create(req: CreateBookRequest) -> Result<NewBook, AppError> {
    let mut problems: Vec<(&'static str, &'static str)> = Vec::new();

    require_text(&req.title, "title", &mut problems);
    require_text(&req.author, "author", &mut problems);
    require_text(&req.description, "description", &mut problems);
    require_text(&req.isbn, "isbn", &mut problems);

    match req.price {
        None => problems.push(("price", "is required")),
        Some(price) if price < 0.0 || price.is_nan() => {
            problems.push(("price", "must be a non-negative number"))
        }
        Some(_) => {}
    }
    check_ranges(req.pages, req.rating, &mut problems);

    fail_on_problems(problems)?;

    Ok(NewBook {
        title: req.title.unwrap_or_default(),
        author: req.author.unwrap_or_default(),
        description: req.description.unwrap_or_default(),
        price: req.price.unwrap_or_default(),
        image: req.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        isbn: req.isbn.unwrap_or_default(),
        genre: req.genre.unwrap_or_default(),
        tags: req.tags.unwrap_or_default(),
        date_published: req.date_published,
        pages: req.pages,
        language: req.language,
        publisher: req.publisher,
        rating: req.rating.unwrap_or(0.0),
        review_count: req.review_count.unwrap_or(0),
        in_stock: req.in_stock.unwrap_or(true),
        featured: req.featured.unwrap_or(false),
    })
}

fn validate_update(req: UpdateBookRequest) -> Result<BookPatch, AppError> {
    let mut problems: Vec<(&'static str, &'static str)> = Vec::new();

    reject_blank(&req.title, "title", &mut problems);
    reject_blank(&req.author, "author", &mut problems);
    reject_blank(&req.description, "description", &mut problems);
    reject_blank(&req.isbn, "isbn", &mut problems);
    if let Some(price) = req.price {
        if price < 0.0 || price.is_nan() {
            problems.push(("price", "must be a non-negative number"));
        }
    }
    check_ranges(req.pages, req.rating, &mut problems);

    fail_on_problems(problems)?;

    Ok(BookPatch {
        title: req.title,
        author: req.author,
        description: req.description,
        price: req.price,
        image: req.image,
        isbn: req.isbn,
        genre: req.genre,
        tags: req.tags,
        date_published: req.date_published,
        pages: req.pages,
        language: req.language,
        publisher: req.publisher,
        rating: req.rating,
        review_count: req.review_count,
        in_stock: req.in_stock,
        featured: req.featured,
    })
}

fn require_text(
    value: &Option<String>,
    field: &'static str,
    problems: &mut Vec<(&'static str, &'static str)>,
) {
    if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
        problems.push((field, "is required"));
    }
}

fn reject_blank(
    value: &Option<String>,
    field: &'static str,
    problems: &mut Vec<(&'static str, &'static str)>,
) {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        problems.push((field, "must not be empty"));
    }
}

fn check_ranges(
    pages: Option<u32>,
    rating: Option<f64>,
    problems: &mut Vec<(&'static str, &'static str)>,
) {
    if pages.is_some_and(|p| p < 1) {
        problems.push(("pages", "must be at least 1"));
    }
    if rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
        problems.push(("rating", "must be between 0 and 5"));
    }
}

/// Aggregate every field problem into one validation error.
fn fail_on_problems(problems: Vec<(&'static str, &'static str)>) -> Result<(), AppError> {
    if problems.is_empty() {
        return Ok(());
    }
    let details = problems
        .iter()
        .map(|(field, error)| json!({"field": field, "error": error}))
        .collect();
    let message = problems
        .iter()
        .map(|(field, error)| format!("{field} {error}"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::validation(
        details,
        format!("validation failed: {message}"),
    ))
}
