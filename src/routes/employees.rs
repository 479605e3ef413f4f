use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::{auth::CsrfForm, employees::EmployeeForm},
    error::{AppError, AppResult, PageResult},
    flash::{self, Flash},
    middleware::auth::{AuthUser, PageUser, csrf_ok, ensure_admin},
    models::Employee,
    response::ApiResponse,
    services::employee_service,
    state::AppState,
    views::{
        self, EmployeeFormPage, EmployeeFormView, EmployeeHomePage, EmployeeViewPage, PageCtx,
        render,
    },
};

pub async fn home(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let employees = employee_service::list_employees(&state).await?;
    let page = EmployeeHomePage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        employees: employees.iter().map(views::employee_card).collect(),
        csrf_token: user.csrf.clone(),
    };
    Ok((jar, render(&page)?).into_response())
}

fn badge_catalog() -> Vec<views::BadgeView> {
    views::BADGE_CHOICES
        .iter()
        .map(|(key, label)| views::BadgeView {
            key: key.to_string(),
            label: label.to_string(),
        })
        .collect()
}

fn form_view(user: &AuthUser, form: &EmployeeForm) -> EmployeeFormView {
    EmployeeFormView {
        fullname: form.fullname.trim().to_string(),
        location: form.location.trim().to_string(),
        job_title: form.job_title.trim().to_string(),
        badges: form.badges.trim().to_string(),
        catalog: badge_catalog(),
        csrf_token: user.csrf.clone(),
    }
}

pub async fn add_page(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
) -> PageResult<Response> {
    let (jar, flash) = flash::take_flash(jar);
    let page = EmployeeFormPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        title: "Add Employee",
        action: "/add".to_string(),
        form: form_view(&user, &EmployeeForm::default()),
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub async fn add_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    jar: CookieJar,
    Form(form): Form<EmployeeForm>,
) -> PageResult<Response> {
    if !csrf_ok(&user, &form.csrf_token) {
        let jar = flash::set_flash(jar, &Flash::error("Invalid CSRF token."));
        return Ok((jar, Redirect::to("/add")).into_response());
    }
    match form.validate() {
        Ok(input) => {
            employee_service::create_employee(&state, input).await?;
            let jar = flash::set_flash(jar, &Flash::success("Employee added successfully!"));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(errors) => {
            let page = EmployeeFormPage {
                ctx: PageCtx::new(state.variant, Some(&user), None),
                title: "Add Employee",
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
    let employee = match employee_service::get_employee(&state, &id).await? {
        Some(employee) => employee,
        None => {
            let jar = flash::set_flash(jar, &Flash::error("Employee not found"));
            return Ok((jar, Redirect::to("/")).into_response());
        }
    };
    let page = EmployeeViewPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        employee: views::employee_card(&employee),
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
    let employee = match employee_service::get_employee(&state, &id).await? {
        Some(employee) => employee,
        None => {
            let jar = flash::set_flash(jar, &Flash::error("Employee not found"));
            return Ok((jar, Redirect::to("/")).into_response());
        }
    };
    let page = EmployeeFormPage {
        ctx: PageCtx::new(state.variant, Some(&user), flash),
        title: "Edit Employee",
        action: format!("/edit/{}", employee.id),
        form: EmployeeFormView {
            fullname: employee.fullname,
            location: employee.location,
            job_title: employee.job_title,
            badges: employee.badges.join(","),
            catalog: badge_catalog(),
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
    Form(form): Form<EmployeeForm>,
) -> PageResult<Response> {
    if !csrf_ok(&user, &form.csrf_token) {
        let jar = flash::set_flash(jar, &Flash::error("Invalid CSRF token."));
        return Ok((jar, Redirect::to(&format!("/edit/{id}"))).into_response());
    }
    match form.validate() {
        Ok(input) => match employee_service::update_employee(&state, &id, input).await? {
            Some(employee) => {
                let jar = flash::set_flash(jar, &Flash::success("Employee updated successfully!"));
                Ok((jar, Redirect::to(&format!("/view/{}", employee.id))).into_response())
            }
            None => {
                let jar = flash::set_flash(jar, &Flash::error("Employee not found"));
                Ok((jar, Redirect::to("/")).into_response())
            }
        },
        Err(errors) => {
            let page = EmployeeFormPage {
                ctx: PageCtx::new(state.variant, Some(&user), None),
                title: "Edit Employee",
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
    let jar = if employee_service::delete_employee(&state, &user, &id).await? {
        flash::set_flash(jar, &Flash::success("Employee deleted successfully!"))
    } else {
        flash::set_flash(jar, &Flash::error("Employee not found"))
    };
    Ok((jar, Redirect::to("/")).into_response())
}

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "List employees", body = ApiResponse<Vec<Employee>>),
        (status = 401, description = "Authentication required"),
    ),
    tag = "Employees"
)]
pub async fn api_list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Employee>>>> {
    let employees = employee_service::list_employees(&state).await?;
    let total = employees.len() as i64;
    Ok(Json(ApiResponse::with_total(employees, total)))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Get employee", body = ApiResponse<Employee>),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Employees"
)]
pub async fn api_get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let employee = match employee_service::get_employee(&state, &id).await? {
        Some(employee) => employee,
        None => return Err(AppError::NotFound("Employee not found")),
    };
    Ok(Json(ApiResponse::success(employee)))
}
