use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use bookmart_store::{Book, CartLine};

pub const DEFAULT_SESSION: &str = "default-session";

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

fn default_quantity() -> u32 {
    1
}

/// Add-to-cart payload. Quantity defaults to 1 and the session falls
/// back to the anonymous default, mirroring the storefront client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub book_id: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_session")]
    pub session_id: String,
}

/// Absolute quantity update for one cart line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub item_id: Option<String>,
    pub quantity: Option<u32>,
    #[serde(default = "default_session")]
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveQuery {
    pub item_id: Option<String>,
    pub session_id: Option<String>,
}

/// A cart line with its book reference already resolved. Lines whose
/// book has been deleted never reach this type; they are filtered out
/// during resolution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: String,
    pub session_id: String,
    pub book_id: String,
    pub quantity: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
    pub book: Book,
}

impl CartItemView {
    pub fn resolve(line: CartLine, book: Book) -> Self {
        Self {
            id: line.id,
            session_id: line.session_id,
            book_id: line.book_id,
            quantity: line.quantity,
            added_at: line.added_at,
            book,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartListResponse {
    pub success: bool,
    pub data: Vec<CartItemView>,
    /// Sum of quantities across the session's lines; the number the
    /// client mirrors into its navbar badge.
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartMutationResponse {
    pub success: bool,
    pub message: String,
    pub data: CartItemView,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartRemovalResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartClearResponse {
    pub success: bool,
    pub message: String,
    pub removed: u64,
}
