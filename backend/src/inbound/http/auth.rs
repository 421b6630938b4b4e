//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"ada","email":"ada@example.org","password":"analytical"}
//! POST /api/v1/auth/login {"username":"ada","password":"analytical"}
//! POST /api/v1/auth/logout
//! GET /api/v1/auth/profile
//! ```
//!
//! Register and login answer with a bearer token and also start a cookie
//! session, so browser and API clients share one flow.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, IssuedToken, LoginCredentials, Registration, User};

use super::ApiResult;
use super::identity::{Identity, bearer_token};
use super::payload::JsonOrForm;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{FieldName, map_login_validation_error, required};

/// Registration body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Account plus a freshly issued bearer token.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    /// Bearer token for the `Authorization` header. Shown only once.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthResponse {
    fn new(user: User, issued: IssuedToken) -> Self {
        Self {
            user,
            token: issued.token.expose().to_owned(),
            expires_at: issued.expires_at,
        }
    }
}

async fn start_session(
    state: &HttpState,
    session: &SessionContext,
    user: User,
) -> ApiResult<AuthResponse> {
    let issued = state.accounts.issue_token(&user.id).await?;
    session.persist_user(&user.id)?;
    Ok(AuthResponse::new(user, issued))
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email taken", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: JsonOrForm<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let username = required(username, FieldName::new("username"))?;
    let password = required(password, FieldName::new("password"))?;
    let registration = Registration::try_from_parts(&username, email.as_deref(), &password)
        .map_err(map_login_validation_error)?;
    let user = state.accounts.register(registration).await?;
    let body = start_session(&state, &session, user).await?;
    Ok(HttpResponse::Created().json(body))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: JsonOrForm<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        &required(username, FieldName::new("username"))?,
        &required(password, FieldName::new("password"))?,
    )
    .map_err(map_login_validation_error)?;
    let user = state.accounts.login(&credentials).await?;
    let body = start_session(&state, &session, user).await?;
    Ok(web::Json(body))
}

/// End the session and revoke the presented bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(token) = bearer_token(&req) {
        state.accounts.revoke_token(&token).await?;
        info!("bearer token revoked");
    }
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// Current account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "profile"
)]
#[get("/auth/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<User>> {
    let user = state.accounts.profile(identity.actor()).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{api_app, memory_state, register_request, with_bearer};
    use crate::test_support::MutableClock;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    fn clock() -> std::sync::Arc<MutableClock> {
        MutableClock::at(2024, 1, 10, 8).shared()
    }

    #[actix_web::test]
    async fn register_issues_token_and_session() {
        let app = test::init_service(api_app(memory_state(clock()))).await;

        let res = test::call_service(&app, register_request("ada").to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie");
        let body: AuthResponse = test::read_body_json(res).await;
        assert_eq!(body.user.username.as_ref(), "ada");
        assert!(!body.user.is_admin);

        let by_token = test::call_service(
            &app,
            with_bearer(test::TestRequest::get().uri("/api/v1/auth/profile"), &body.token)
                .to_request(),
        )
        .await;
        assert_eq!(by_token.status(), StatusCode::OK);

        let by_cookie = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/auth/profile")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(by_cookie.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn taken_usernames_conflict() {
        let app = test::init_service(api_app(memory_state(clock()))).await;
        test::call_service(&app, register_request("ada").to_request()).await;

        let res = test::call_service(&app, register_request("ada").to_request()).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn login_accepts_forms_and_rejects_bad_passwords() {
        let app = test::init_service(api_app(memory_state(clock()))).await;
        test::call_service(&app, register_request("ada").to_request()).await;

        let ok = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_form([("username", "ada"), ("password", "correct horse")])
                .to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let bad = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({"username": "ada", "password": "battery staple"}))
                .to_request(),
        )
        .await;
        assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn missing_password_names_the_field() {
        let app = test::init_service(api_app(memory_state(clock()))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({"username": "ada"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "password");
        assert_eq!(body["details"]["code"], "missing_field");
    }

    #[actix_web::test]
    async fn logout_revokes_the_bearer_token() {
        let app = test::init_service(api_app(memory_state(clock()))).await;
        let auth: AuthResponse =
            test::call_and_read_body_json(&app, register_request("ada").to_request()).await;

        let res = test::call_service(
            &app,
            with_bearer(test::TestRequest::post().uri("/api/v1/auth/logout"), &auth.token)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let after = test::call_service(
            &app,
            with_bearer(test::TestRequest::get().uri("/api/v1/auth/profile"), &auth.token)
                .to_request(),
        )
        .await;
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn anonymous_profile_requests_are_unauthorised() {
        let app = test::init_service(api_app(memory_state(clock()))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/auth/profile").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key(crate::domain::TRACE_ID_HEADER));
    }
}
