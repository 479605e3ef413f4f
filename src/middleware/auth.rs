use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    config::AppConfig,
    dto::auth::Claims,
    error::AppError,
    models::Role,
    services::auth_service,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "session";

/// The signed-in user, resolved from the session cookie or a bearer token.
/// The user record is re-read on every request so deactivation takes effect
/// immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub csrf: String,
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn csrf_ok(user: &AuthUser, token: &str) -> bool {
    !user.csrf.is_empty() && user.csrf == token
}

/// Post-login redirect targets are honored only when they are same-origin
/// relative paths.
pub fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

pub fn decode_claims(secret: &str, token: &str) -> Result<Claims, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;
    Ok(decoded.claims)
}

pub fn session_cookie(config: &AppConfig, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.cookie_secure);
    cookie.set_max_age(time::Duration::seconds(config.session_ttl_secs));
    cookie
}

pub fn remove_session_cookie(jar: CookieJar) -> CookieJar {
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    jar.remove(removal)
}

async fn user_from_token(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = decode_claims(&state.config.secret, token)?;
    let user = auth_service::fetch_user(&state.pool, &claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !user.is_active {
        return Err(AppError::Unauthorized);
    }
    let role = user.role.parse::<Role>().map_err(AppError::Internal)?;
    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
        full_name: user.full_name,
        role,
        csrf: claims.csrf,
    })
}

/// Resolve the current user from a cookie jar, for pages that only change
/// behavior when someone is already signed in.
pub async fn user_from_jar(state: &AppState, jar: &CookieJar) -> Option<AuthUser> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();
    user_from_token(state, &token).await.ok()
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    let auth_header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(AppError::Unauthorized)?;
        user_from_token(state, &token).await
    }
}

/// Page-side variant of [`AuthUser`]: anonymous requests are redirected to
/// the login page with the original path as the `next` target.
pub struct PageUser(pub AuthUser);

impl FromRequestParts<AppState> for PageUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(PageUser(user)),
            Err(_) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| "/".to_string());
                Err(Redirect::to(&format!("/login?next={next}")))
            }
        }
    }
}
