use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use trek_core::Masked;

use crate::{error::AppError, extract::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<Masked<String>>,
}

impl CredentialsRequest {
    fn parts(&self) -> (&str, &str) {
        (
            self.username.as_deref().unwrap_or_default(),
            self.password.as_ref().map(|p| p.expose().as_str()).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    user_id: i64,
    token: String,
    message: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/register", post(register))
        .route("/v1/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let (username, password) = req.parts();
    state.credentials.register(username, password).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse { message: "User registered successfully" }),
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (username, password) = req.parts();
    let user = state.credentials.authenticate(username, password).await?;
    let token = state.tokens.issue(&user.username)?;

    tracing::info!("User {} logged in", user.username);

    Ok(Json(LoginResponse {
        user_id: user.id,
        token,
        message: "Login successful",
    }))
}
