use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    error::AppError,
    middleware::rate_limit::{self, LimitCategory},
    state::AppState,
    views,
};

pub mod auth;
pub mod doc;
pub mod dogs;
pub mod employees;
pub mod events;
pub mod health;

fn limited(
    state: &AppState,
    category: LimitCategory,
    router: Router<AppState>,
) -> Router<AppState> {
    router.route_layer(from_fn_with_state(
        (state.clone(), category),
        rate_limit::enforce,
    ))
}

pub fn dog_app(state: AppState) -> Router {
    let default_routes = Router::new()
        .route("/", get(dogs::home))
        .route("/logout", get(auth::logout))
        .route("/view/{id}", get(dogs::view));
    let login_routes =
        Router::new().route("/login", get(auth::login_page).post(auth::login_submit));
    let register_routes = Router::new().route(
        "/register",
        get(auth::register_page).post(auth::register_submit),
    );
    let add_edit_routes = Router::new()
        .route("/add", get(dogs::add_page).post(dogs::add_submit))
        .route("/edit/{id}", get(dogs::edit_page).post(dogs::edit_submit))
        .route("/add-event", get(events::add_page).post(events::add_submit))
        .route(
            "/edit-event/{id}",
            get(events::edit_page).post(events::edit_submit),
        );
    let delete_routes = Router::new()
        .route("/delete/{id}", post(dogs::delete_submit))
        .route("/delete-event/{id}", post(events::delete_submit));
    let api_routes = Router::new()
        .route("/api/dogs", get(dogs::api_list))
        .route("/api/dogs/{id}", get(dogs::api_get))
        .route("/api/dogs/{id}/events", get(events::api_list_for_dog));

    Router::new()
        .merge(limited(&state, LimitCategory::Default, default_routes))
        .merge(limited(&state, LimitCategory::Login, login_routes))
        .merge(limited(&state, LimitCategory::Register, register_routes))
        .merge(limited(&state, LimitCategory::AddEdit, add_edit_routes))
        .merge(limited(&state, LimitCategory::Delete, delete_routes))
        .merge(limited(&state, LimitCategory::Api, api_routes))
        .route("/health", get(health::health_check))
        .merge(doc::dog_docs())
        .fallback(not_found)
        .with_state(state)
}

pub fn employee_app(state: AppState) -> Router {
    let default_routes = Router::new()
        .route("/", get(employees::home))
        .route("/logout", get(auth::logout))
        .route("/view/{id}", get(employees::view));
    let login_routes =
        Router::new().route("/login", get(auth::login_page).post(auth::login_submit));
    let register_routes = Router::new().route(
        "/register",
        get(auth::register_page).post(auth::register_submit),
    );
    let add_edit_routes = Router::new()
        .route("/add", get(employees::add_page).post(employees::add_submit))
        .route(
            "/edit/{id}",
            get(employees::edit_page).post(employees::edit_submit),
        );
    let delete_routes = Router::new().route("/delete/{id}", post(employees::delete_submit));
    let api_routes = Router::new()
        .route("/api/employees", get(employees::api_list))
        .route("/api/employees/{id}", get(employees::api_get));

    Router::new()
        .merge(limited(&state, LimitCategory::Default, default_routes))
        .merge(limited(&state, LimitCategory::Login, login_routes))
        .merge(limited(&state, LimitCategory::Register, register_routes))
        .merge(limited(&state, LimitCategory::AddEdit, add_edit_routes))
        .merge(limited(&state, LimitCategory::Delete, delete_routes))
        .merge(limited(&state, LimitCategory::Api, api_routes))
        .route("/health", get(health::health_check))
        .merge(doc::employee_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(request: Request) -> Response {
    if request.uri().path().starts_with("/api") {
        return AppError::NotFound("Not Found").into_response();
    }
    views::error_response(StatusCode::NOT_FOUND, "Page not found")
}
