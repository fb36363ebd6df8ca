pub mod models;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use bookmart_authz::require_admin;
use bookmart_http::AppError;
use bookmart_kernel::settings::{AuthSettings, Settings};
use bookmart_kernel::{InitCtx, Module};
use bookmart_store::{Book, StoreHandle};

use models::{
    BookDetailResponse, BookListResponse, CreateBookRequest, DeleteBookResponse, ListParams,
    UpdateBookRequest,
};
use service::CatalogService;

/// Catalog module: public browse/search/detail plus token-gated
/// management endpoints.
pub struct BooksModule {
    state: BooksState,
}

#[derive(Clone)]
struct BooksState {
    service: CatalogService,
    auth: AuthSettings,
}

impl BooksModule {
    pub fn new(service: CatalogService, auth: AuthSettings) -> Self {
        Self {
            state: BooksState { service, auth },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.auth.admin_token.is_none() {
            tracing::warn!(
                module = self.name(),
                "no admin token configured; catalog mutations will be refused"
            );
        }
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/",
                get(list_books)
                    .post(create_book)
                    .put(update_book)
                    .delete(delete_book),
            )
            .route("/{id}", get(get_book))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books with pagination, genre filter, and search",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "page", "in": "query", "schema": {"type": "integer", "minimum": 1, "default": 1}},
                            {"name": "limit", "in": "query", "schema": {"type": "integer", "minimum": 1, "default": 10}},
                            {"name": "genre", "in": "query", "schema": {"type": "string"}},
                            {"name": "search", "in": "query", "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of books plus pagination totals",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "data": {
                                                    "type": "array",
                                                    "items": {"$ref": "#/components/schemas/Book"}
                                                },
                                                "pagination": {"$ref": "#/components/schemas/Pagination"}
                                            }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Invalid pagination parameters",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book (admin token required)",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Book"}
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation failure or duplicate ISBN",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or invalid admin token",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Update a book by id (admin token required)",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "parameters": [
                            {"name": "id", "in": "query", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Updated book",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Book"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book by id (admin token required)",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "parameters": [
                            {"name": "id", "in": "query", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Deleted book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "message": {"type": "string"},
                                                "book": {"$ref": "#/components/schemas/Book"}
                                            }
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get one book with its reviews embedded",
                        "tags": ["Books"],
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {
                            "200": {
                                "description": "Book with reviews",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "success": {"type": "boolean"},
                                                "data": {"$ref": "#/components/schemas/Book"}
                                            }
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Malformed book id",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "title": {"type": "string"},
                            "author": {"type": "string"},
                            "description": {"type": "string"},
                            "price": {"type": "number", "minimum": 0},
                            "image": {"type": "string"},
                            "isbn": {"type": "string"},
                            "genre": {"type": "array", "items": {"type": "string"}},
                            "tags": {"type": "array", "items": {"type": "string"}},
                            "datePublished": {"type": "string"},
                            "pages": {"type": "integer", "minimum": 1},
                            "language": {"type": "string"},
                            "publisher": {"type": "string"},
                            "rating": {"type": "number", "minimum": 0, "maximum": 5},
                            "reviewCount": {"type": "integer", "minimum": 0},
                            "inStock": {"type": "boolean"},
                            "featured": {"type": "boolean"}
                        },
                        "required": ["id", "title", "author", "description", "price", "isbn"]
                    },
                    "Pagination": {
                        "type": "object",
                        "properties": {
                            "page": {"type": "integer"},
                            "limit": {"type": "integer"},
                            "total": {"type": "integer"},
                            "totalPages": {"type": "integer"}
                        },
                        "required": ["page", "limit", "total", "totalPages"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct IdParam {
    id: Option<String>,
}

async fn list_books(
    State(state): State<BooksState>,
    Query(params): Query<ListParams>,
) -> Result<Json<BookListResponse>, AppError> {
    Ok(Json(state.service.list(params).await?))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<BookDetailResponse>, AppError> {
    let data = state.service.detail(&id).await?;
    Ok(Json(BookDetailResponse {
        success: true,
        data,
    }))
}

async fn create_book(
    State(state): State<BooksState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    require_admin(&headers, &state.auth).map_err(|e| AppError::unauthorized(e.to_string()))?;

    let book = state.service.create(req).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<BooksState>,
    headers: HeaderMap,
    Query(param): Query<IdParam>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<Book>, AppError> {
    require_admin(&headers, &state.auth).map_err(|e| AppError::unauthorized(e.to_string()))?;

    let id = param
        .id
        .ok_or_else(|| AppError::bad_request("Missing book id"))?;
    Ok(Json(state.service.update(&id, req).await?))
}

async fn delete_book(
    State(state): State<BooksState>,
    headers: HeaderMap,
    Query(param): Query<IdParam>,
) -> Result<Json<DeleteBookResponse>, AppError> {
    require_admin(&headers, &state.auth).map_err(|e| AppError::unauthorized(e.to_string()))?;

    let id = param
        .id
        .ok_or_else(|| AppError::bad_request("Missing book id"))?;
    let book = state.service.delete(&id).await?;
    Ok(Json(DeleteBookResponse {
        message: "Book deleted successfully".to_string(),
        book,
    }))
}

/// Create the books module wired to the injected store.
pub fn create_module(settings: &Settings, store: &StoreHandle) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(
        CatalogService::new(store.books.clone(), store.reviews.clone()),
        settings.auth.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use bookmart_store::{NewReview, ReviewStore};
    use tower::ServiceExt;

    const TOKEN: &str = "test-admin-token";

    fn test_router() -> (Router, StoreHandle) {
        let store = StoreHandle::memory();
        let auth = AuthSettings {
            admin_token: Some(TOKEN.to_string()),
        };
        let module = BooksModule::new(
            CatalogService::new(store.books.clone(), store.reviews.clone()),
            auth,
        );
        (module.routes(), store)
    }

    fn request(method: &str, uri: &str, body: Option<serde_json::Value>, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn sample_book(title: &str, isbn: &str) -> serde_json::Value {
        json!({
            "title": title,
            "author": "B",
            "description": "d",
            "price": 9.99,
            "isbn": isbn
        })
    }

    #[tokio::test]
    async fn create_then_fetch_round_trip() {
        let (router, _store) = test_router();

        let (status, created) = send(
            &router,
            request("POST", "/", Some(sample_book("A", "111")), Some(TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "A");
        assert_eq!(created["isbn"], "111");
        assert_eq!(created["price"], 9.99);
        assert_eq!(created["image"], "/images/default.jpg");
        assert_eq!(created["inStock"], true);

        let id = created["id"].as_str().unwrap();
        let (status, body) = send(&router, request("GET", &format!("/{id}"), None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["title"], "A");
        assert_eq!(body["data"]["reviews"], json!([]));
    }

    #[tokio::test]
    async fn duplicate_isbn_is_a_400_with_unique_message() {
        let (router, _store) = test_router();

        send(
            &router,
            request("POST", "/", Some(sample_book("A", "111")), Some(TOKEN)),
        )
        .await;
        let (status, body) = send(
            &router,
            request("POST", "/", Some(sample_book("B", "111")), Some(TOKEN)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("unique"));
    }

    #[tokio::test]
    async fn missing_fields_are_aggregated() {
        let (router, _store) = test_router();

        let (status, body) = send(
            &router,
            request("POST", "/", Some(json!({})), Some(TOKEN)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 5);
        assert!(body["error"].as_str().unwrap().contains("isbn is required"));
    }

    #[tokio::test]
    async fn mutations_require_the_admin_token() {
        let (router, _store) = test_router();

        let (status, _) = send(
            &router,
            request("POST", "/", Some(sample_book("A", "111")), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &router,
            request("POST", "/", Some(sample_book("A", "111")), Some("wrong")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Reads stay public.
        let (status, _) = send(&router, request("GET", "/", None, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn genre_page_two_of_twelve_matches() {
        let (router, _store) = test_router();

        for i in 1..=12 {
            let mut book = sample_book(&format!("Fiction {i}"), &format!("f-{i}"));
            book["genre"] = json!(["Fiction"]);
            send(&router, request("POST", "/", Some(book), Some(TOKEN))).await;
        }
        for i in 1..=3 {
            let mut book = sample_book(&format!("History {i}"), &format!("h-{i}"));
            book["genre"] = json!(["History"]);
            send(&router, request("POST", "/", Some(book), Some(TOKEN))).await;
        }

        let (status, body) = send(
            &router,
            request("GET", "/?genre=Fiction&page=2&limit=5", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let titles: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            titles,
            ["Fiction 6", "Fiction 7", "Fiction 8", "Fiction 9", "Fiction 10"]
        );
        assert_eq!(body["pagination"]["total"], 12);
        assert_eq!(body["pagination"]["totalPages"], 3);
        assert_eq!(body["pagination"]["page"], 2);
    }

    #[tokio::test]
    async fn search_spans_title_author_and_tags() {
        let (router, _store) = test_router();

        let mut dune = sample_book("Dune", "d-1");
        dune["author"] = json!("Frank Herbert");
        dune["tags"] = json!(["Space Opera"]);
        send(&router, request("POST", "/", Some(dune), Some(TOKEN))).await;
        send(
            &router,
            request("POST", "/", Some(sample_book("Emma", "e-1")), Some(TOKEN)),
        )
        .await;

        for term in ["dune", "HERBERT", "space opera"] {
            let uri = format!("/?search={}", term.replace(' ', "%20"));
            let (_, body) = send(&router, request("GET", &uri, None, None)).await;
            let data = body["data"].as_array().unwrap();
            assert_eq!(data.len(), 1, "term {term:?} should match Dune only");
            assert_eq!(data[0]["title"], "Dune");
        }
    }

    #[tokio::test]
    async fn zero_page_is_rejected() {
        let (router, _store) = test_router();
        let (status, _) = send(&router, request("GET", "/?page=0", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_distinct() {
        let (router, _store) = test_router();

        let (status, _) = send(&router, request("GET", "/not-a-uuid", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &router,
            request(
                "GET",
                "/0191f9b2-95d8-7c31-b7a8-2f4d1c1a9b11",
                None,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn detail_embeds_reviews() {
        let (router, store) = test_router();

        let (_, created) = send(
            &router,
            request("POST", "/", Some(sample_book("A", "111")), Some(TOKEN)),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        store
            .reviews
            .insert(NewReview {
                book_id: id.clone(),
                user: "alice".into(),
                rating: 5.0,
                title: Some("Loved it".into()),
                comment: "great".into(),
                date: "2024-01-01".into(),
                verified: true,
            })
            .await
            .unwrap();

        let (_, body) = send(&router, request("GET", &format!("/{id}"), None, None)).await;
        let reviews = body["data"]["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0]["user"], "alice");
    }

    #[tokio::test]
    async fn update_and_delete_by_query_id() {
        let (router, _store) = test_router();

        let (_, created) = send(
            &router,
            request("POST", "/", Some(sample_book("A", "111")), Some(TOKEN)),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        // Missing id is a 400, not a 404.
        let (status, _) = send(
            &router,
            request("PUT", "/", Some(json!({"price": 19.99})), Some(TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, updated) = send(
            &router,
            request(
                "PUT",
                &format!("/?id={id}"),
                Some(json!({"price": 19.99})),
                Some(TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price"], 19.99);
        assert_eq!(updated["title"], "A");

        let (status, body) = send(
            &router,
            request("DELETE", &format!("/?id={id}"), None, Some(TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["book"]["id"], id.as_str());

        let (status, _) = send(&router, request("GET", &format!("/{id}"), None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
