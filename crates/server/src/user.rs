//! Registration, login and profile endpoints

use api_types::user::{AuthResponse, Login, Register, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{NewUser, User};

use crate::{JsonBody, ServerError, required, server::ServerState};

pub(crate) fn view(user: User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        role: user.role,
        created_at: user.created_at,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<Register>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let input = NewUser {
        first_name: required(payload.first_name, "firstName")?,
        last_name: required(payload.last_name, "lastName")?,
        email: required(payload.email, "email")?,
        phone: payload.phone,
        password: required(payload.password, "password")?,
        role: required(payload.role, "role")?,
    };

    let (user, token) = state.engine.register_user(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: view(user),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<Login>,
) -> Result<Json<AuthResponse>, ServerError> {
    let email = required(payload.email, "email")?;
    let password = required(payload.password, "password")?;

    let (user, token) = state.engine.login(&email, &password).await?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: view(user),
    }))
}

pub async fn profile(Extension(user): Extension<User>) -> Json<UserView> {
    Json(view(user))
}
