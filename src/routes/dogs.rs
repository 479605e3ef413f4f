use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::{auth::CsrfForm, dogs::DogForm},
    error::{AppError, AppResult, PageResult},
    flash::{self, Flash},
    middleware::auth::{AuthUser, PageUser, csrf_ok, ensure_admin},
    models::Dog,
    response::ApiResponse,
    services::{dog_service, event_service},
    state::AppState,
    views::{self, DogFormPage, DogFormView, DogHomePage, DogViewPage, PageCtx, render},
};

pub async fn home(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let dogs = dog_service::list_dogs(&state).await?;
    let page = DogHomePage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        dogs: dogs.iter().map(views::dog_card).collect(),
        csrf_token: user.csrf.clone(),
    };
    Ok((jar, render(&page)?).into_response())
}

fn form_view(user: &AuthUser, form: &DogForm) -> DogFormView {
    DogFormView {
        name: form.name.trim().to_string(),
        approx_age: form.approx_age.trim().to_string(),
        size_options: views::options_from(views::SIZE_CHOICES, form.size.trim()),
        breed_type: form.breed_type.trim().to_string(),
        csrf_token: user.csrf.clone(),
    }
}

pub async fn add_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let page = DogFormPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        title: "Add Dog",
        action: "/add".to_string(),
        form: form_view(&user, &DogForm::default()),
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub async fn add_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
    Form(form): Form<DogForm>,
) -> PageResult<Response> {
    if !csrf_ok(&user, &form.csrf_token) {
        let jar = flash::set_flash(jar, &Flash::error("Invalid CSRF token."));
        return Ok((jar, Redirect::to("/add")).into_response());
    }
    match form.validate() {
        Ok(input) => {
            dog_service::create_dog(&state, input).await?;
            let jar = flash::set_flash(jar, &Flash::success("Dog added successfully!"));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(errors) => {
            let page = DogFormPage {
                ctx: PageCtx::new(state.variant, Some(&user), None),
                title: "Add Dog",
                action: "/add".to_string(),
                form: form_view(&user, &form),
                errors,
            };
            Ok(render(&page)?.into_response())
        }
    }
}

pub async fn view(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let dog = match dog_service::get_dog(&state, &id).await? {
        Some(dog) => dog,
        None => {
            let jar = flash::set_flash(jar, &Flash::error("Dog not found"));
            return Ok((jar, Redirect::to("/")).into_response());
        }
    };
    let events = event_service::list_events_for_dog(
        &state,
        &dog.id,
        Some(event_service::RECENT_EVENTS_LIMIT),
    )
    .await?;
    let page = DogViewPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        dog: views::dog_card(&dog),
        events: views::event_rows(&events),
        csrf_token: user.csrf.clone(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub async fn edit_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let dog = match dog_service::get_dog(&state, &id).await? {
        Some(dog) => dog,
        None => {
            let jar = flash::set_flash(jar, &Flash::error("Dog not found"));
            return Ok((jar, Redirect::to("/")).into_response());
        }
    };
    let page = DogFormPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        title: "Edit Dog",
        action: format!("/edit/{}", dog.id),
        form: DogFormView {
            name: dog.name,
            approx_age: dog.approx_age,
            size_options: views::options_from(views::SIZE_CHOICES, &dog.size),
            breed_type: dog.breed_type,
            csrf_token: user.csrf.clone(),
        },
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub async fn edit_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<DogForm>,
) -> PageResult<Response> {
    if !csrf_ok(&user, &form.csrf_token) {
        let jar = flash::set_flash(jar, &Flash::error("Invalid CSRF token."));
        return Ok((jar, Redirect::to(&format!("/edit/{id}"))).into_response());
    }
    match form.validate() {
        Ok(input) => match dog_service::update_dog(&state, &id, input).await? {
            Some(dog) => {
                let jar = flash::set_flash(jar, &Flash::success("Dog updated successfully!"));
                Ok((jar, Redirect::to(&format!("/view/{}", dog.id))).into_response())
            }
            None => {
                let jar = flash::set_flash(jar, &Flash::error("Dog not found"));
                Ok((jar, Redirect::to("/")).into_response())
            }
        },
        Err(errors) => {
            let page = DogFormPage {
                ctx: PageCtx::new(state.variant, Some(&user), None),
                title: "Edit Dog",
                action: format!("/edit/{id}"),
                form: form_view(&user, &form),
                errors,
            };
            Ok(render(&page)?.into_response())
        }
    }
}

pub async fn delete_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<CsrfForm>,
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
        return Ok((jar, Redirect::to("/")).into_response());
    }
    let jar = if dog_service::delete_dog(&state, &user, &id).await? {
        flash::set_flash(jar, &Flash::success("Dog deleted successfully!"))
    } else {
        flash::set_flash(jar, &Flash::error("Dog not found"))
    };
    Ok((jar, Redirect::to("/")).into_response())
}

#[utoipa::path(
    get,
    path = "/api/dogs",
    responses(
        (status = 200, description = "List dogs", body = ApiResponse<Vec<Dog>>),
        (status = 401, description = "Authentication required"),
    ),
    tag = "Dogs"
)]
pub async fn api_list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Dog>>>> {
    let dogs = dog_service::list_dogs(&state).await?;
    let total = dogs.len() as i64;
    Ok(Json(ApiResponse::with_total(dogs, total)))
}

#[utoipa::path(
    get,
    path = "/api/dogs/{id}",
    params(
        ("id" = String, Path, description = "Dog ID")
    ),
    responses(
        (status = 200, description = "Get dog", body = ApiResponse<Dog>),
        (status = 404, description = "Dog not found"),
    ),
    tag = "Dogs"
)]
pub async fn api_get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Dog>>> {
    let dog = match dog_service::get_dog(&state, &id).await? {
        Some(dog) => dog,
        None => return Err(AppError::NotFound("Dog not found")),
    };
    Ok(Json(ApiResponse::success(dog)))
}
