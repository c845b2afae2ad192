pub mod catalog;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;

use folio_kernel::{InitCtx, Module};

use crate::state::AppState;

/// Books module: the catalog routes and their lifecycle hooks.
pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "page",
                                "in": "query",
                                "schema": { "type": "integer", "default": 1 }
                            },
                            {
                                "name": "limit",
                                "in": "query",
                                "schema": { "type": "integer", "default": 10 }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "A page of books with pagination metadata",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "content": {
                                "multipart/form-data": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Book created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation failure",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "401": { "description": "Missing or invalid token" },
                            "403": { "description": "Caller is not an admin" }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": { "type": "string", "format": "uuid" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "404": { "description": "Book not found" }
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "content": {
                                "multipart/form-data": {
                                    "schema": { "$ref": "#/components/schemas/UpdateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Book updated" },
                            "400": { "description": "Validation failure" },
                            "404": { "description": "Book not found" }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": { "description": "Book and cover removed" },
                            "404": { "description": "Book not found" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "format": "uuid",
                                "description": "Unique identifier for the book"
                            },
                            "title": {
                                "type": "string",
                                "description": "Title of the book"
                            },
                            "author": {
                                "type": "string",
                                "description": "Author of the book"
                            },
                            "description": {
                                "type": "string",
                                "description": "Description of the book"
                            },
                            "image": {
                                "type": "string",
                                "nullable": true,
                                "description": "Cover image handle, null when absent"
                            },
                            "created_at": {
                                "type": "string",
                                "format": "date-time"
                            }
                        },
                        "required": ["id", "title", "author", "description", "created_at"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "description": { "type": "string" },
                            "image": { "type": "string", "format": "binary" }
                        },
                        "required": ["title", "author", "description"]
                    },
                    "UpdateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "description": { "type": "string" },
                            "image": { "type": "string", "format": "binary" }
                        }
                    },
                    "Pagination": {
                        "type": "object",
                        "properties": {
                            "currentPage": { "type": "integer" },
                            "totalPages": { "type": "integer" },
                            "totalItems": { "type": "integer" },
                            "itemsPerPage": { "type": "integer" }
                        },
                        "required": ["currentPage", "totalPages", "totalItems", "itemsPerPage"]
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

/// Create a new instance of the books module
pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(state))
}
