use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::{auth::CsrfForm, events::EventForm},
    error::{AppResult, PageResult},
    flash::{self, Flash},
    middleware::auth::{AuthUser, PageUser, csrf_ok, ensure_admin},
    models::{Dog, Event},
    response::ApiResponse,
    services::{dog_service, event_service},
    state::AppState,
    validate::FieldError,
    views::{self, EventFormPage, EventFormView, PageCtx, render},
};

fn form_view(user: &AuthUser, dogs: &[Dog], form: &EventForm) -> EventFormView {
    EventFormView {
        dog_options: views::dog_options(dogs, form.dog_id.trim()),
        event_type_options: views::options_from(views::EVENT_TYPE_CHOICES, form.event_type.trim()),
        timestamp: form.timestamp.trim().to_string(),
        end_timestamp: form.end_timestamp.trim().to_string(),
        location: form.location.trim().to_string(),
        notes: form.notes.trim().to_string(),
        bristol_options: views::options_from(
            views::BRISTOL_CHOICES,
            form.bristol_stool_scale.trim(),
        ),
        csrf_token: user.csrf.clone(),
    }
}

fn form_from_event(event: &Event) -> EventForm {
    EventForm {
        dog_id: event.dog_id.clone(),
        event_type: event.event_type.clone(),
        timestamp: event.timestamp.format("%Y-%m-%dT%H:%M").to_string(),
        end_timestamp: event
            .end_timestamp
            .map(|end| end.format("%Y-%m-%dT%H:%M").to_string())
            .unwrap_or_default(),
        location: event.location.clone().unwrap_or_default(),
        notes: event.notes.clone().unwrap_or_default(),
        bristol_stool_scale: event
            .bristol_stool_scale
            .map(|scale| scale.to_string())
            .unwrap_or_default(),
        csrf_token: String::new(),
    }
}

pub async fn add_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let dogs = dog_service::list_dogs(&state).await?;
    let page = EventFormPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        title: "Add Event",
        action: "/add-event".to_string(),
        form: form_view(&user, &dogs, &EventForm::default()),
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub async fn add_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
    Form(form): Form<EventForm>,
) -> PageResult<Response> {
    if !csrf_ok(&user, &form.csrf_token) {
        let jar = flash::set_flash(jar, &Flash::error("Invalid CSRF token."));
        return Ok((jar, Redirect::to("/add-event")).into_response());
    }

    // The dog select is populated from the database, so a submitted id that
    // is not there is treated like any other bad choice.
    let dog_missing = {
        let id = form.dog_id.trim();
        !id.is_empty() && !dog_service::dog_exists(&state, id).await?
    };

    match form.validate() {
        Ok(input) if !dog_missing => {
            let event = event_service::create_event(&state, input).await?;
            let jar = flash::set_flash(jar, &Flash::success("Event added successfully!"));
            Ok((jar, Redirect::to(&format!("/view/{}", event.dog_id))).into_response())
        }
        result => {
            let mut errors = result.err().unwrap_or_default();
            if dog_missing {
                errors.push(FieldError::new("dog_id", "Not a valid choice."));
            }
            let dogs = dog_service::list_dogs(&state).await?;
            let page = EventFormPage {
                ctx: PageCtx::new(state.variant, Some(&user), None),
                title: "Add Event",
                action: "/add-event".to_string(),
                form: form_view(&user, &dogs, &form),
                errors,
            };
            Ok(render(&page)?.into_response())
        }
    }
}

pub async fn edit_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let event = match event_service::get_event(&state, &id).await? {
        Some(event) => event,
        None => {
            let jar = flash::set_flash(jar, &Flash::error("Event not found"));
            return Ok((jar, Redirect::to("/")).into_response());
        }
    };
    let dogs = dog_service::list_dogs(&state).await?;
    let page = EventFormPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        title: "Edit Event",
        action: format!("/edit-event/{}", event.id),
        form: form_view(&user, &dogs, &form_from_event(&event)),
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub async fn edit_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<EventForm>,
) -> PageResult<Response> {
    if !csrf_ok(&user, &form.csrf_token) {
        let jar = flash::set_flash(jar, &Flash::error("Invalid CSRF token."));
        return Ok((jar, Redirect::to(&format!("/edit-event/{id}"))).into_response());
    }

    let dog_missing = {
        let dog_id = form.dog_id.trim();
        !dog_id.is_empty() && !dog_service::dog_exists(&state, dog_id).await?
    };

    match form.validate() {
        Ok(input) if !dog_missing => match event_service::update_event(&state, &id, input).await? {
            Some(event) => {
                let jar = flash::set_flash(jar, &Flash::success("Event updated successfully!"));
                Ok((jar, Redirect::to(&format!("/view/{}", event.dog_id))).into_response())
            }
            None => {
                let jar = flash::set_flash(jar, &Flash::error("Event not found"));
                Ok((jar, Redirect::to("/")).into_response())
            }
        },
        result => {
            let mut errors = result.err().unwrap_or_default();
            if dog_missing {
                errors.push(FieldError::new("dog_id", "Not a valid choice."));
            }
            let dogs = dog_service::list_dogs(&state).await?;
            let page = EventFormPage {
                ctx: PageCtx::new(state.variant, Some(&user), None),
                title: "Edit Event",
                action: format!("/edit-event/{id}"),
                form: form_view(&user, &dogs, &form),
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
    match event_service::delete_event(&state, &user, &id).await? {
        Some(dog_id) => {
            let jar = flash::set_flash(jar, &Flash::success("Event deleted successfully!"));
            Ok((jar, Redirect::to(&format!("/view/{dog_id}"))).into_response())
        }
        None => {
            let jar = flash::set_flash(jar, &Flash::error("Event not found"));
            Ok((jar, Redirect::to("/")).into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/dogs/{id}/events",
    params(
        ("id" = String, Path, description = "Dog ID")
    ),
    responses(
        (status = 200, description = "List events for a dog, newest first", body = ApiResponse<Vec<Event>>),
        (status = 401, description = "Authentication required"),
    ),
    tag = "Events"
)]
pub async fn api_list_for_dog(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Event>>>> {
    let events = event_service::list_events_for_dog(&state, &id, None).await?;
    let total = events.len() as i64;
    Ok(Json(ApiResponse::with_total(events, total)))
}
