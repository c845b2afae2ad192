pub mod extract;
pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use validator::{Validate, ValidationError};

use folio_auth::Role;
use folio_http::{envelope, AppError};
use folio_kernel::{InitCtx, Module};

use crate::state::AppState;
use crate::utils;

use extract::AuthSession;
use models::UserResponse;
use store::UserStoreError;

/// Auth module: registration, login, and the current-user endpoint.
pub struct AuthModule {
    state: AppState,
}

impl AuthModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/me", get(me))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a new user",
                        "tags": ["Auth"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Register" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "User registered, session token issued",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "400": { "description": "Validation failure or email in use" }
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Login with email and password",
                        "tags": ["Auth"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Login" }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Session token issued" },
                            "401": { "description": "Invalid credentials" }
                        }
                    }
                },
                "/me": {
                    "get": {
                        "summary": "Get the current user",
                        "tags": ["Auth"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "The authenticated user",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Envelope" }
                                    }
                                }
                            },
                            "401": { "description": "Missing or invalid token" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "role": { "type": "string", "enum": ["user", "admin"] },
                            "created_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "name", "email", "role", "created_at"]
                    },
                    "Register": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "format": "password" },
                            "role": { "type": "string", "enum": ["user", "admin"] }
                        },
                        "required": ["name", "email", "password"]
                    },
                    "Login": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["email", "password"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterPayload {
    #[validate(
        required(message = "Name is required"),
        length(min = 2, max = 50, message = "Name must be between 2 and 50 characters")
    )]
    name: Option<String>,
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email")
    )]
    email: Option<String>,
    #[validate(
        required(message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    password: Option<String>,
    #[validate(custom(function = validate_role, message = "Role must be either user or admin"))]
    role: Option<String>,
}

impl RegisterPayload {
    fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self.email = self
            .email
            .map(|email| email.trim().to_lowercase());
        self
    }
}

#[derive(Debug, Deserialize, Validate)]
struct LoginPayload {
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email")
    )]
    email: Option<String>,
    #[validate(required(message = "Password is required"))]
    password: Option<String>,
}

impl LoginPayload {
    fn normalized(mut self) -> Self {
        self.email = self
            .email
            .map(|email| email.trim().to_lowercase());
        self
    }
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<Role>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("role"))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials")
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Response, AppError> {
    let payload = payload.normalized();
    utils::validate_payload(&payload)?;

    let role = match payload.role.as_deref() {
        Some(raw) => raw.parse::<Role>().map_err(|_| {
            AppError::validation(
                vec!["Role must be either user or admin".to_string()],
                "Validation failed",
            )
        })?,
        None => Role::default(),
    };

    let password_hash = folio_auth::hash_password(&payload.password.unwrap_or_default())
        .map_err(|err| AppError::Internal(err.into()))?;

    let user = match state.users.create(
        payload.name.unwrap_or_default(),
        payload.email.unwrap_or_default(),
        password_hash,
        role,
    ) {
        Ok(user) => user,
        Err(UserStoreError::DuplicateEmail) => {
            return Err(AppError::bad_request("User already exists"));
        }
        Err(UserStoreError::Db(err)) => return Err(utils::db_internal(err)),
    };

    let token = state.sessions.issue(user.id, user.role);

    Ok(envelope::created(
        "User registered successfully",
        json!({
            "user": UserResponse::from(&user),
            "token": token,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, AppError> {
    let payload = payload.normalized();
    utils::validate_payload(&payload)?;

    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    // A missing account and a wrong password are indistinguishable.
    let user = state
        .users
        .find_by_email(&email)
        .map_err(utils::db_internal)?
        .ok_or_else(invalid_credentials)?;

    let valid = folio_auth::verify_password(&password, &user.password_hash)
        .map_err(|err| AppError::Internal(err.into()))?;
    if !valid {
        return Err(invalid_credentials());
    }

    let token = state.sessions.issue(user.id, user.role);

    Ok(envelope::ok(
        "Login successful",
        json!({
            "user": UserResponse::from(&user),
            "token": token,
        }),
    ))
}

async fn me(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Response, AppError> {
    let user = state
        .users
        .get(session.user_id)
        .map_err(utils::db_internal)?
        .ok_or_else(|| AppError::unauthorized("Not authorized, user no longer exists"))?;

    Ok(envelope::ok(
        "User retrieved successfully",
        json!({ "user": UserResponse::from(&user) }),
    ))
}

/// Create a new instance of the auth module
pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(AuthModule::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use folio_kernel::settings::Settings;

    async fn test_state(dir: &tempfile::TempDir) -> AppState {
        let mut settings = Settings::default();
        settings.assets.upload_dir = dir.path().to_string_lossy().into_owned();
        AppState::build(settings).await.unwrap()
    }

    fn register_payload(email: &str) -> RegisterPayload {
        RegisterPayload {
            name: Some("Ada Lovelace".to_string()),
            email: Some(email.to_string()),
            password: Some("secret123".to_string()),
            role: None,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn register_payload_collects_all_violations() {
        let payload = RegisterPayload {
            name: Some("A".to_string()),
            email: Some("not-an-email".to_string()),
            password: Some("short".to_string()),
            role: Some("root".to_string()),
        };

        let err = utils::validate_payload(&payload).unwrap_err();
        match err {
            AppError::Validation { errors, .. } => {
                assert_eq!(errors.len(), 4);
                assert!(errors.contains(&"Role must be either user or admin".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn normalization_lowercases_the_email() {
        let payload = RegisterPayload {
            name: Some("  Ada  ".to_string()),
            email: Some("  Ada@Example.COM ".to_string()),
            password: Some("secret123".to_string()),
            role: None,
        }
        .normalized();

        assert_eq!(payload.name.as_deref(), Some("Ada"));
        assert_eq!(payload.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn register_login_me_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let response = register(
            State(state.clone()),
            Json(register_payload("ada@example.com")),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = login(
            State(state.clone()),
            Json(LoginPayload {
                email: Some("ada@example.com".to_string()),
                password: Some("secret123".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let session = state.sessions.verify(&token).unwrap();
        let response = me(State(state.clone()), AuthSession(session)).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["user"]["email"], "ada@example.com");
        assert!(body["data"]["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        register(
            State(state.clone()),
            Json(register_payload("ada@example.com")),
        )
        .await
        .unwrap();

        let err = register(
            State(state.clone()),
            Json(register_payload("ada@example.com")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        register(
            State(state.clone()),
            Json(register_payload("ada@example.com")),
        )
        .await
        .unwrap();

        let err = login(
            State(state.clone()),
            Json(LoginPayload {
                email: Some("ada@example.com".to_string()),
                password: Some("wrong-password".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));

        let err = login(
            State(state),
            Json(LoginPayload {
                email: Some("ghost@example.com".to_string()),
                password: Some("secret123".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn registration_may_grant_the_admin_role() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let mut payload = register_payload("root@example.com");
        payload.role = Some("admin".to_string());

        let response = register(State(state.clone()), Json(payload)).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["user"]["role"], "admin");

        let token = body["data"]["token"].as_str().unwrap();
        assert!(state.sessions.verify(token).unwrap().role.is_admin());
    }
}
