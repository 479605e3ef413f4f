use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::AppError,
    flash::Flash,
    middleware::auth::AuthUser,
    models::{Dog, Employee, Event, Role},
    state::AppVariant,
    validate::FieldError,
};

pub const SIZE_CHOICES: &[(&str, &str)] = &[
    ("small", "Small"),
    ("medium", "Medium"),
    ("large", "Large"),
];

pub const EVENT_TYPE_CHOICES: &[(&str, &str)] = &[
    ("walk", "Walk"),
    ("poop", "Poop"),
    ("pee", "Pee"),
    ("vomit", "Vomit"),
    ("nap", "Nap"),
];

pub const ROLE_CHOICES: &[(&str, &str)] = &[
    ("admin", "Admin"),
    ("manager", "Manager"),
    ("employee", "Employee"),
];

pub const BRISTOL_CHOICES: &[(&str, &str)] = &[
    ("", "Not applicable"),
    ("1", "1 - Separate hard lumps (constipation)"),
    ("2", "2 - Sausage-like but lumpy"),
    ("3", "3 - Sausage-like with cracks"),
    ("4", "4 - Sausage-like, smooth and soft"),
    ("5", "5 - Soft blobs with clear-cut edges"),
    ("6", "6 - Mushy consistency, ragged edges"),
    ("7", "7 - Entirely liquid (diarrhea)"),
];

pub const BADGE_CHOICES: &[(&str, &str)] = &[
    ("apple", "Mac User"),
    ("windows", "Windows User"),
    ("linux", "Linux User"),
    ("video-camera", "Digital Content Star"),
    ("trophy", "Employee of the Month"),
    ("camera", "Photographer"),
    ("plane", "Frequent Flier"),
    ("paperclip", "Paperclip Afficionado"),
    ("coffee", "Coffee Snob"),
    ("gamepad", "Gamer"),
    ("bug", "Bugfixer"),
    ("umbrella", "Seattle Fan"),
];

/// Shared chrome for every page: brand, nav state and the pending flash.
pub struct PageCtx {
    pub brand: &'static str,
    pub add_label: &'static str,
    pub logged_in: bool,
    pub username: String,
    pub is_admin: bool,
    pub show_event_nav: bool,
    pub flash_set: bool,
    pub flash_class: &'static str,
    pub flash_message: String,
}

impl PageCtx {
    pub fn new(variant: AppVariant, user: Option<&AuthUser>, flash: Option<Flash>) -> Self {
        let (brand, add_label, show_event_nav) = match variant {
            AppVariant::DogEvents => ("Dog Events Tracker", "Add Dog", true),
            AppVariant::EmployeeDirectory => ("Employee Directory", "Add Employee", false),
        };
        let (flash_set, flash_class, flash_message) = match flash {
            Some(flash) => {
                let class = match flash.category.as_str() {
                    "success" => "success",
                    "error" => "danger",
                    _ => "info",
                };
                (true, class, flash.message)
            }
            None => (false, "info", String::new()),
        };
        PageCtx {
            brand,
            add_label,
            logged_in: user.is_some(),
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            is_admin: user.map(|u| u.role == Role::Admin).unwrap_or(false),
            show_event_nav,
            flash_set,
            flash_class,
            flash_message,
        }
    }
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub fn options_from(catalog: &[(&str, &str)], current: &str) -> Vec<SelectOption> {
    catalog
        .iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: *value == current,
        })
        .collect()
}

pub fn dog_options(dogs: &[Dog], current: &str) -> Vec<SelectOption> {
    dogs.iter()
        .map(|dog| SelectOption {
            value: dog.id.clone(),
            label: dog.name.clone(),
            selected: dog.id == current,
        })
        .collect()
}

pub fn catalog_label(catalog: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    catalog
        .iter()
        .find(|(value, _)| *value == key)
        .map(|(_, label)| *label)
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub ctx: PageCtx,
    pub username: String,
    pub next: String,
    pub errors: Vec<FieldError>,
}

pub struct RegisterFormView {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role_options: Vec<SelectOption>,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub ctx: PageCtx,
    pub form: RegisterFormView,
    pub errors: Vec<FieldError>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub message: String,
}

pub struct DogCard {
    pub id: String,
    pub name: String,
    pub approx_age: String,
    pub size_label: String,
    pub breed_type: String,
}

#[derive(Template)]
#[template(path = "dogs/home.html")]
pub struct DogHomePage {
    pub ctx: PageCtx,
    pub dogs: Vec<DogCard>,
    pub csrf_token: String,
}

pub struct DogFormView {
    pub name: String,
    pub approx_age: String,
    pub size_options: Vec<SelectOption>,
    pub breed_type: String,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "dogs/form.html")]
pub struct DogFormPage {
    pub ctx: PageCtx,
    pub title: &'static str,
    pub action: String,
    pub form: DogFormView,
    pub errors: Vec<FieldError>,
}

pub struct EventRow {
    pub id: String,
    pub type_label: String,
    pub timestamp: String,
    pub end_timestamp: String,
    pub duration: String,
    pub location: String,
    pub notes: String,
    pub bristol: String,
}

#[derive(Template)]
#[template(path = "dogs/view.html")]
pub struct DogViewPage {
    pub ctx: PageCtx,
    pub dog: DogCard,
    pub events: Vec<EventRow>,
    pub csrf_token: String,
}

pub struct EventFormView {
    pub dog_options: Vec<SelectOption>,
    pub event_type_options: Vec<SelectOption>,
    pub timestamp: String,
    pub end_timestamp: String,
    pub location: String,
    pub notes: String,
    pub bristol_options: Vec<SelectOption>,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "events/form.html")]
pub struct EventFormPage {
    pub ctx: PageCtx,
    pub title: &'static str,
    pub action: String,
    pub form: EventFormView,
    pub errors: Vec<FieldError>,
}

pub struct BadgeView {
    pub key: String,
    pub label: String,
}

pub struct EmployeeCard {
    pub id: String,
    pub fullname: String,
    pub location: String,
    pub job_title: String,
    pub badges: Vec<BadgeView>,
}

#[derive(Template)]
#[template(path = "employees/home.html")]
pub struct EmployeeHomePage {
    pub ctx: PageCtx,
    pub employees: Vec<EmployeeCard>,
    pub csrf_token: String,
}

pub struct EmployeeFormView {
    pub fullname: String,
    pub location: String,
    pub job_title: String,
    pub badges: String,
    pub catalog: Vec<BadgeView>,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "employees/form.html")]
pub struct EmployeeFormPage {
    pub ctx: PageCtx,
    pub title: &'static str,
    pub action: String,
    pub form: EmployeeFormView,
    pub errors: Vec<FieldError>,
}

#[derive(Template)]
#[template(path = "employees/view.html")]
pub struct EmployeeViewPage {
    pub ctx: PageCtx,
    pub employee: EmployeeCard,
    pub csrf_token: String,
}

pub fn dog_card(dog: &Dog) -> DogCard {
    let size_label = catalog_label(SIZE_CHOICES, &dog.size)
        .map(|label| label.to_string())
        .unwrap_or_else(|| dog.size.clone());
    DogCard {
        id: dog.id.clone(),
        name: dog.name.clone(),
        approx_age: dog.approx_age.clone(),
        size_label,
        breed_type: dog.breed_type.clone(),
    }
}

fn bristol_label(scale: i32) -> String {
    catalog_label(BRISTOL_CHOICES, &scale.to_string())
        .map(|label| label.to_string())
        .unwrap_or_else(|| scale.to_string())
}

fn format_duration(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{} min", minutes as i64)
    } else {
        format!("{minutes:.1} min")
    }
}

pub fn event_rows(events: &[Event]) -> Vec<EventRow> {
    events
        .iter()
        .map(|event| EventRow {
            id: event.id.clone(),
            type_label: catalog_label(EVENT_TYPE_CHOICES, &event.event_type)
                .map(|label| label.to_string())
                .unwrap_or_else(|| event.event_type.clone()),
            timestamp: event.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            end_timestamp: event
                .end_timestamp
                .map(|end| end.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            duration: event.duration.map(format_duration).unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
            notes: event.notes.clone().unwrap_or_default(),
            bristol: event
                .bristol_stool_scale
                .map(bristol_label)
                .unwrap_or_default(),
        })
        .collect()
}

pub fn badge_views(keys: &[String]) -> Vec<BadgeView> {
    keys.iter()
        .map(|key| BadgeView {
            key: key.clone(),
            label: catalog_label(BADGE_CHOICES, key)
                .map(|label| label.to_string())
                .unwrap_or_else(|| key.clone()),
        })
        .collect()
}

pub fn employee_card(employee: &Employee) -> EmployeeCard {
    EmployeeCard {
        id: employee.id.clone(),
        fullname: employee.fullname.clone(),
        location: employee.location.clone(),
        job_title: employee.job_title.clone(),
        badges: badge_views(&employee.badges),
    }
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// Renders the generic error page, falling back to plain text when even the
/// template fails.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    let page = ErrorPage {
        message: message.to_string(),
    };
    match page.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "error page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats_whole_and_fractional_minutes() {
        assert_eq!(format_duration(30.0), "30 min");
        assert_eq!(format_duration(12.5), "12.5 min");
    }

    #[test]
    fn options_mark_the_current_value() {
        let options = options_from(SIZE_CHOICES, "medium");
        assert_eq!(options.len(), 3);
        assert!(options[1].selected);
        assert!(!options[0].selected);
        assert_eq!(options[1].label, "Medium");
    }

    #[test]
    fn unknown_badge_keys_fall_back_to_the_key() {
        let views = badge_views(&["coffee".to_string(), "mystery".to_string()]);
        assert_eq!(views[0].label, "Coffee Snob");
        assert_eq!(views[1].label, "mystery");
    }
}
