//! Cart service: session-scoped line management with referential
//! checks against the catalog.
//!
//! The existence/stock check and the cart write are separate store
//! calls, so a book can go out of stock between them; there is no
//! cross-collection transaction to close that window. The
//! per-(session, book) upsert itself is atomic inside the store.

use std::sync::Arc;

use serde_json::json;

use bookmart_http::{validate_record_id, AppError};
use bookmart_store::{Book, BookStore, CartStore};

use super::models::{AddToCartRequest, CartItemView, UpdateCartRequest, DEFAULT_SESSION};

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    books: Arc<dyn BookStore>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, books: Arc<dyn BookStore>) -> Self {
        Self { carts, books }
    }

    /// Add a book to the session's cart, accumulating quantity onto the
    /// existing line if there is one. The book must exist and be in
    /// stock; nothing is written otherwise.
    pub async fn add(&self, req: AddToCartRequest) -> Result<CartItemView, AppError> {
        let book_id = req
            .book_id
            .ok_or_else(|| AppError::bad_request("Missing book id"))?;
        validate_record_id(&book_id, "Invalid book ID format")?;
        require_quantity(req.quantity)?;

        let book = self.purchasable_book(&book_id).await?;
        let line = self
            .carts
            .add_or_increment(&req.session_id, &book_id, req.quantity)
            .await?;

        tracing::debug!(
            session_id = %line.session_id,
            book_id = %line.book_id,
            quantity = line.quantity,
            "cart line upserted"
        );
        Ok(CartItemView::resolve(line, book))
    }

    /// Set a line's quantity to an absolute value. Lines owned by other
    /// sessions surface as not-found.
    pub async fn update(&self, req: UpdateCartRequest) -> Result<CartItemView, AppError> {
        let item_id = req
            .item_id
            .ok_or_else(|| AppError::bad_request("Missing cart item id"))?;
        validate_record_id(&item_id, "Invalid cart item ID format")?;
        let quantity = req.quantity.ok_or_else(|| {
            AppError::validation(
                vec![json!({"field": "quantity", "error": "is required"})],
                "Quantity is required",
            )
        })?;
        require_quantity(quantity)?;

        let line = self
            .carts
            .get(&item_id, &req.session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cart item not found"))?;

        // A line can outlive its book; treat that as gone, matching the
        // listing filter. Checked before the write so a not-found reply
        // implies the line was not touched.
        let book = self
            .books
            .get(&line.book_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cart item not found"))?;

        let line = self
            .carts
            .set_quantity(&item_id, &req.session_id, quantity)
            .await?
            .ok_or_else(|| AppError::not_found("Cart item not found"))?;

        Ok(CartItemView::resolve(line, book))
    }

    /// Remove one line, scoped to the owning session.
    pub async fn remove(&self, item_id: &str, session_id: &str) -> Result<(), AppError> {
        validate_record_id(item_id, "Invalid cart item ID format")?;

        self.carts
            .remove(item_id, session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cart item not found"))?;
        Ok(())
    }

    /// Every line for the session joined with its book. Lines whose
    /// book no longer exists are dropped from the result.
    pub async fn list(&self, session_id: &str) -> Result<(Vec<CartItemView>, u64), AppError> {
        let lines = self.carts.for_session(session_id).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            match self.books.get(&line.book_id).await? {
                Some(book) => items.push(CartItemView::resolve(line, book)),
                None => {
                    tracing::debug!(
                        item_id = %line.id,
                        book_id = %line.book_id,
                        "dropping cart line whose book is gone"
                    );
                }
            }
        }

        let count = items.iter().map(|i| u64::from(i.quantity)).sum();
        Ok((items, count))
    }

    /// Empty the session's cart in one bulk store operation.
    pub async fn clear(&self, session_id: &str) -> Result<u64, AppError> {
        Ok(self.carts.clear_session(session_id).await?)
    }

    async fn purchasable_book(&self, book_id: &str) -> Result<Book, AppError> {
        let book = self
            .books
            .get(book_id)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found"))?;
        if !book.in_stock {
            return Err(AppError::not_found("Book is out of stock"));
        }
        Ok(book)
    }
}

pub(super) fn session_or_default(session_id: Option<String>) -> String {
    session_id.unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

fn require_quantity(quantity: u32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation(
            vec![json!({"field": "quantity", "error": "must be at least 1"})],
            "Quantity must be at least 1",
        ));
    }
    Ok(())
}
