//! HTTP surface for the books module.
//!
//! Validation happens before anything touches the asset store, so a
//! rejected request never leaves an orphaned upload behind.

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use folio_assets::AssetRef;
use folio_http::{envelope, AppError};

use crate::modules::auth::extract::RequireAdmin;
use crate::state::AppState;
use crate::utils;

use super::catalog::CatalogError;
use super::models::{BookPatch, NewBook};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_PER_PAGE: u64 = 10;

pub fn router(state: AppState) -> Router {
    // Leave headroom above the image cap for the multipart framing and
    // text fields.
    let body_limit = state.settings.assets.max_upload_bytes as usize + 64 * 1024;

    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

/// Absent, non-numeric, and zero values all fall back to the default.
fn parse_or(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|parsed| *parsed != 0)
        .unwrap_or(default)
}

fn parse_book_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::not_found("Book not found"))
}

fn catalog_error(err: CatalogError) -> AppError {
    match err {
        CatalogError::NotFound => AppError::not_found("Book not found"),
        CatalogError::Store(err) => AppError::Internal(err.into()),
    }
}

async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let page = parse_or(query.page.as_deref(), DEFAULT_PAGE);
    let per_page = parse_or(query.limit.as_deref(), DEFAULT_PER_PAGE);

    let listing = state
        .catalog
        .list(page, per_page)
        .await
        .map_err(catalog_error)?;

    Ok(envelope::ok(
        "Books retrieved successfully",
        json!({
            "books": listing.books,
            "pagination": listing.pagination,
        }),
    ))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_book_id(&id)?;
    let book = state.catalog.get(id).await.map_err(catalog_error)?;

    Ok(envelope::ok(
        "Book retrieved successfully",
        json!({ "book": book }),
    ))
}

async fn create_book(
    State(state): State<AppState>,
    RequireAdmin(_session): RequireAdmin,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = BookForm::read(multipart, state.settings.assets.max_upload_bytes).await?;

    utils::validate_payload(&CreateBookPayload {
        title: form.title.clone(),
        author: form.author.clone(),
        description: form.description.clone(),
    })?;

    let image = form.store_upload(&state).await?;

    let book = state
        .catalog
        .create(NewBook {
            title: form.title.unwrap_or_default(),
            author: form.author.unwrap_or_default(),
            description: form.description.unwrap_or_default(),
            image,
        })
        .await
        .map_err(catalog_error)?;

    Ok(envelope::created(
        "Book created successfully",
        json!({ "book": book }),
    ))
}

async fn update_book(
    State(state): State<AppState>,
    RequireAdmin(_session): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let id = parse_book_id(&id)?;
    let form = BookForm::read(multipart, state.settings.assets.max_upload_bytes).await?;

    utils::validate_payload(&UpdateBookPayload {
        title: form.title.clone(),
        author: form.author.clone(),
        description: form.description.clone(),
    })?;

    let image = form.store_upload(&state).await?;

    let patch = BookPatch {
        title: form.title,
        author: form.author,
        description: form.description,
    };

    let book = state
        .catalog
        .update(id, patch, image)
        .await
        .map_err(catalog_error)?;

    Ok(envelope::ok(
        "Book updated successfully",
        json!({ "book": book }),
    ))
}

async fn delete_book(
    State(state): State<AppState>,
    RequireAdmin(_session): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_book_id(&id)?;
    state.catalog.delete(id).await.map_err(catalog_error)?;

    Ok(envelope::ok_message("Book deleted successfully"))
}

#[derive(Debug, Validate)]
struct CreateBookPayload {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters")
    )]
    title: Option<String>,
    #[validate(
        required(message = "Author is required"),
        length(min = 1, max = 100, message = "Author name must be between 1 and 100 characters")
    )]
    author: Option<String>,
    #[validate(
        required(message = "Description is required"),
        length(
            min = 10,
            max = 2000,
            message = "Description must be between 10 and 2000 characters"
        )
    )]
    description: Option<String>,
}

#[derive(Debug, Validate)]
struct UpdateBookPayload {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    title: Option<String>,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Author name must be between 1 and 100 characters"
    ))]
    author: Option<String>,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Description must be between 10 and 2000 characters"
    ))]
    description: Option<String>,
}

/// An image part held in memory until validation passes.
#[derive(Debug)]
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Text fields and the optional image read from a multipart body.
#[derive(Debug, Default)]
struct BookForm {
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    upload: Option<Upload>,
}

impl BookForm {
    async fn read(mut multipart: Multipart, max_upload_bytes: u64) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().map(str::to_string);

            match name.as_deref() {
                Some("title") => form.title = Some(read_text(field).await?),
                Some("author") => form.author = Some(read_text(field).await?),
                Some("description") => form.description = Some(read_text(field).await?),
                Some("image") => {
                    let file_name = field.file_name().map(str::to_string).unwrap_or_default();
                    // Browsers submit an empty part when no file is chosen.
                    if file_name.is_empty() {
                        continue;
                    }

                    let is_image = field
                        .content_type()
                        .is_some_and(|content_type| content_type.starts_with("image/"));
                    if !is_image {
                        return Err(AppError::validation(
                            vec!["Only image files are allowed".to_string()],
                            "Validation failed",
                        ));
                    }

                    let bytes = field.bytes().await.map_err(bad_multipart)?;
                    if bytes.len() as u64 > max_upload_bytes {
                        return Err(AppError::validation(
                            vec!["Image must not exceed 5 MiB".to_string()],
                            "Validation failed",
                        ));
                    }

                    form.upload = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Write the validated upload, if any, to the asset store.
    async fn store_upload(&self, state: &AppState) -> Result<Option<AssetRef>, AppError> {
        match &self.upload {
            Some(upload) => {
                let asset = state
                    .assets
                    .save(&upload.file_name, &upload.bytes)
                    .await
                    .map_err(|err| AppError::Internal(err.into()))?;
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    Ok(field.text().await.map_err(bad_multipart)?.trim().to_string())
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::bad_request(format!("Invalid multipart payload: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_values_parse_leniently() {
        assert_eq!(parse_or(None, DEFAULT_PAGE), 1);
        assert_eq!(parse_or(Some("3"), DEFAULT_PAGE), 3);
        assert_eq!(parse_or(Some("abc"), DEFAULT_PER_PAGE), 10);
        assert_eq!(parse_or(Some("-2"), DEFAULT_PER_PAGE), 10);
        assert_eq!(parse_or(Some("0"), DEFAULT_PER_PAGE), 10);
    }

    #[test]
    fn malformed_book_id_reports_not_found() {
        let err = parse_book_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        assert!(parse_book_id(&Uuid::now_v7().to_string()).is_ok());
    }

    #[test]
    fn create_payload_requires_every_field() {
        let payload = CreateBookPayload {
            title: None,
            author: None,
            description: None,
        };

        let err = utils::validate_payload(&payload).unwrap_err();
        match err {
            AppError::Validation { errors, .. } => {
                assert!(errors.contains(&"Title is required".to_string()));
                assert!(errors.contains(&"Author is required".to_string()));
                assert!(errors.contains(&"Description is required".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_payload_enforces_description_length() {
        let payload = CreateBookPayload {
            title: Some("Title".to_string()),
            author: Some("Author".to_string()),
            description: Some("too short".to_string()),
        };

        let err = utils::validate_payload(&payload).unwrap_err();
        match err {
            AppError::Validation { errors, .. } => {
                assert_eq!(
                    errors,
                    vec!["Description must be between 10 and 2000 characters".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_payload_accepts_sparse_fields() {
        let payload = UpdateBookPayload {
            title: Some("Only the title".to_string()),
            author: None,
            description: None,
        };

        assert!(utils::validate_payload(&payload).is_ok());
    }

    #[test]
    fn update_payload_rejects_empty_title() {
        let payload = UpdateBookPayload {
            title: Some(String::new()),
            author: None,
            description: None,
        };

        assert!(utils::validate_payload(&payload).is_err());
    }
}
