use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    dto::auth::{LoginForm, RegisterForm},
    error::PageResult,
    flash::{self, Flash},
    middleware::auth::{
        self, PageUser, csrf_ok, ensure_admin, remove_session_cookie, sanitize_next,
        session_cookie,
    },
    services::auth_service::{self, LoginOutcome, RegisterOutcome},
    state::AppState,
    validate::FieldError,
    views::{self, LoginPage, PageCtx, RegisterFormView, RegisterPage, render},
};

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn login_view(
    state: &AppState,
    flash: Option<Flash>,
    username: String,
    next: String,
    errors: Vec<FieldError>,
) -> LoginPage {
    LoginPage {
        ctx: PageCtx::new(state.variant, None, flash),
        username,
        next,
        errors,
    }
}

pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
) -> PageResult<Response> {
    if auth::user_from_jar(&state, &jar).await.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let (jar, flash) = flash::take_flash(jar);
    let page = login_view(
        &state,
        flash,
        String::new(),
        query.next.unwrap_or_default(),
        Vec::new(),
    );
    Ok((jar, render(&page)?).into_response())
}

pub async fn login_submit(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> PageResult<Response> {
    let next = query.next.clone().unwrap_or_default();

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = login_view(&state, None, form.username.trim().to_string(), next, errors);
            return Ok(render(&page)?.into_response());
        }
    };

    match auth_service::authenticate(&state.pool, &input.username, &input.password).await? {
        LoginOutcome::Success(user) => {
            let token = auth_service::issue_session(&state.config, &user)?;
            let jar = jar.add(session_cookie(&state.config, token));
            let jar = flash::set_flash(
                jar,
                &Flash::success(format!("Welcome back, {}!", user.full_name)),
            );
            let target = sanitize_next(query.next.as_deref());
            Ok((jar, Redirect::to(&target)).into_response())
        }
        LoginOutcome::Disabled => {
            let flash = Flash::error("Account is disabled. Please contact administrator.");
            let page = login_view(&state, Some(flash), input.username, next, Vec::new());
            Ok(render(&page)?.into_response())
        }
        LoginOutcome::InvalidCredentials => {
            let flash = Flash::error("Invalid username or password.");
            let page = login_view(&state, Some(flash), input.username, next, Vec::new());
            Ok(render(&page)?.into_response())
        }
    }
}

pub async fn logout(PageUser(_user): PageUser, jar: CookieJar) -> Response {
    let jar = remove_session_cookie(jar);
    let jar = flash::set_flash(jar, &Flash::info("You have been logged out successfully."));
    (jar, Redirect::to("/login")).into_response()
}

fn register_view(
    state: &AppState,
    user: &auth::AuthUser,
    flash: Option<Flash>,
    form: &RegisterForm,
    errors: Vec<FieldError>,
) -> RegisterPage {
    RegisterPage {
        ctx: PageCtx::new(state.variant, Some(user), flash),
        form: RegisterFormView {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            full_name: form.full_name.trim().to_string(),
            role_options: views::options_from(views::ROLE_CHOICES, form.role.trim()),
            csrf_token: user.csrf.clone(),
        },
        errors,
    }
}

pub async fn register_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
) -> PageResult<Response> {
    if ensure_admin(&user).is_err() {
        let jar = flash::set_flash(
            jar,
            &Flash::error("Access denied. Admin privileges required."),
        );
        return Ok((jar, Redirect::to("/")).into_response());
    }
    let (jar, flash) = flash::take_flash(jar);
    let empty = RegisterForm {
        role: "employee".to_string(),
        ..RegisterForm::default()
    };
    let page = register_view(&state, &user, flash, &empty, Vec::new());
    Ok((jar, render(&page)?).into_response())
}

pub async fn register_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> PageResult<Response> {
    if ensure_admin(&user).is_err() {
        let jar = flash::set_flash(
            jar,
            &Flash::error("Access denied. Admin privileges required."),
        );
        return Ok((jar, Redirect::to("/")).into_response());
    }
    if !csrf_ok(&user, &form.csrf_token) {
        let jar = flash::set_flash(jar, &Flash::error("Invalid CSRF token."));
        return Ok((jar, Redirect::to("/register")).into_response());
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = register_view(&state, &user, None, &form, errors);
            return Ok(render(&page)?.into_response());
        }
    };

    match auth_service::register_user(&state.pool, input).await? {
        RegisterOutcome::Created(created) => {
            let jar = flash::set_flash(
                jar,
                &Flash::success(format!("User {} created successfully!", created.username)),
            );
            Ok((jar, Redirect::to("/")).into_response())
        }
        RegisterOutcome::UsernameTaken => {
            let flash = Flash::error("Username already exists.");
            let page = register_view(&state, &user, Some(flash), &form, Vec::new());
            Ok(render(&page)?.into_response())
        }
        RegisterOutcome::EmailTaken => {
            let flash = Flash::error("Email already registered.");
            let page = register_view(&state, &user, Some(flash), &form, Vec::new());
            Ok(render(&page)?.into_response())
        }
    }
}
