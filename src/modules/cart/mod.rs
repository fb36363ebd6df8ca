pub mod models;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;

use bookmart_http::AppError;
use bookmart_kernel::{InitCtx, Module};
use bookmart_store::StoreHandle;

use models::{
    AddToCartRequest, CartClearResponse, CartListResponse, CartMutationResponse,
    CartRemovalResponse, RemoveQuery, SessionQuery, UpdateCartRequest,
};
use service::{session_or_default, CartService};

/// Cart module: session-scoped cart lines over the injected store.
pub struct CartModule {
    service: CartService,
}

impl CartModule {
    pub fn new(service: CartService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for CartModule {
    fn name(&self) -> &'static str {
        "cart"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "cart module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(get_cart)
                    .post(add_to_cart)
                    .put(update_cart)
                    .delete(remove_from_cart),
            )
            .route("/clear", delete(clear_cart))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List the session's cart, joined with book details",
                        "tags": ["Cart"],
                        "parameters": [
                            {"name": "sessionId", "in": "query", "schema": {"type": "string", "default": "default-session"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Cart lines plus total item count",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "success": {"type": "boolean"},
                                                "data": {
                                                    "type": "array",
                                                    "items": {"$ref": "#/components/schemas/CartItem"}
                                                },
                                                "count": {"type": "integer"}
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Add a book to the cart, accumulating quantity",
                        "tags": ["Cart"],
                        "responses": {
                            "200": {
                                "description": "The resulting cart line",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/CartItem"}
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing book id or quantity below 1",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Book missing or out of stock",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Set a cart line's quantity",
                        "tags": ["Cart"],
                        "responses": {
                            "200": {
                                "description": "The updated cart line",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/CartItem"}
                                    }
                                }
                            },
                            "400": {
                                "description": "Quantity below 1",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Cart item not found (or owned by another session)",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Remove one cart line",
                        "tags": ["Cart"],
                        "parameters": [
                            {"name": "itemId", "in": "query", "required": true, "schema": {"type": "string"}},
                            {"name": "sessionId", "in": "query", "schema": {"type": "string", "default": "default-session"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Removed",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "success": {"type": "boolean"},
                                                "message": {"type": "string"}
                                            }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing item id",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Cart item not found (or owned by another session)",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                },
                "/clear": {
                    "delete": {
                        "summary": "Empty the session's cart in one bulk delete",
                        "tags": ["Cart"],
                        "parameters": [
                            {"name": "sessionId", "in": "query", "schema": {"type": "string", "default": "default-session"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Number of removed lines",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "success": {"type": "boolean"},
                                                "message": {"type": "string"},
                                                "removed": {"type": "integer"}
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CartItem": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "sessionId": {"type": "string"},
                            "bookId": {"type": "string"},
                            "quantity": {"type": "integer", "minimum": 1},
                            "addedAt": {"type": "string", "format": "date-time"},
                            "book": {"$ref": "#/components/schemas/Book"}
                        },
                        "required": ["id", "sessionId", "bookId", "quantity", "addedAt", "book"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "cart module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "cart module stopped");
        Ok(())
    }
}

async fn get_cart(
    State(service): State<CartService>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<CartListResponse>, AppError> {
    let session_id = session_or_default(query.session_id);
    let (data, count) = service.list(&session_id).await?;
    Ok(Json(CartListResponse {
        success: true,
        data,
        count,
    }))
}

async fn add_to_cart(
    State(service): State<CartService>,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartMutationResponse>, AppError> {
    let data = service.add(req).await?;
    Ok(Json(CartMutationResponse {
        success: true,
        message: "Item added to cart successfully".to_string(),
        data,
    }))
}

async fn update_cart(
    State(service): State<CartService>,
    Json(req): Json<UpdateCartRequest>,
) -> Result<Json<CartMutationResponse>, AppError> {
    let data = service.update(req).await?;
    Ok(Json(CartMutationResponse {
        success: true,
        message: "Cart item updated successfully".to_string(),
        data,
    }))
}

async fn remove_from_cart(
    State(service): State<CartService>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<CartRemovalResponse>, AppError> {
    let item_id = query
        .item_id
        .ok_or_else(|| AppError::bad_request("Cart item ID is required"))?;
    let session_id = session_or_default(query.session_id);

    service.remove(&item_id, &session_id).await?;
    Ok(Json(CartRemovalResponse {
        success: true,
        message: "Item removed from cart successfully".to_string(),
    }))
}

async fn clear_cart(
    State(service): State<CartService>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<CartClearResponse>, AppError> {
    let session_id = session_or_default(query.session_id);
    let removed = service.clear(&session_id).await?;
    Ok(Json(CartClearResponse {
        success: true,
        message: "Cart cleared successfully".to_string(),
        removed,
    }))
}

/// Create the cart module wired to the injected store.
pub fn create_module(store: &StoreHandle) -> Arc<dyn Module> {
    Arc::new(CartModule::new(CartService::new(
        store.carts.clone(),
        store.books.clone(),
    )))
}
