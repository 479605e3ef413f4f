use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};

use crate::{
    dto::employees::EmployeeInput,
    entity::{
        Employees,
        employees::{ActiveModel, Column, Model as EmployeeModel},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Employee, prefixed_id},
    state::AppState,
};

pub async fn list_employees(state: &AppState) -> AppResult<Vec<Employee>> {
    let employees = Employees::find()
        .order_by_asc(Column::Fullname)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(employee_from_entity)
        .collect();
    Ok(employees)
}

pub async fn get_employee(state: &AppState, id: &str) -> AppResult<Option<Employee>> {
    let employee = Employees::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(employee_from_entity);
    Ok(employee)
}

pub async fn create_employee(state: &AppState, input: EmployeeInput) -> AppResult<Employee> {
    let active = ActiveModel {
        id: Set(prefixed_id("emp")),
        fullname: Set(input.fullname),
        location: Set(input.location),
        job_title: Set(input.job_title),
        badges: Set(serde_json::json!(input.badges)),
    };
    let employee = active.insert(&state.orm).await?;
    Ok(employee_from_entity(employee))
}

pub async fn update_employee(
    state: &AppState,
    id: &str,
    input: EmployeeInput,
) -> AppResult<Option<Employee>> {
    let existing = match Employees::find_by_id(id).one(&state.orm).await? {
        Some(e) => e,
        None => return Ok(None),
    };

    let mut active: ActiveModel = existing.into();
    active.fullname = Set(input.fullname);
    active.location = Set(input.location);
    active.job_title = Set(input.job_title);
    active.badges = Set(serde_json::json!(input.badges));

    let employee = active.update(&state.orm).await?;
    Ok(Some(employee_from_entity(employee)))
}

pub async fn delete_employee(state: &AppState, user: &AuthUser, id: &str) -> AppResult<bool> {
    ensure_admin(user)?;
    let employee = match Employees::find_by_id(id).one(&state.orm).await? {
        Some(e) => e,
        None => return Ok(false),
    };
    employee.delete(&state.orm).await?;
    Ok(true)
}

fn badges_from_json(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn employee_from_entity(model: EmployeeModel) -> Employee {
    let badges = badges_from_json(&model.badges);
    Employee {
        id: model.id,
        fullname: model.fullname,
        location: model.location,
        job_title: model.job_title,
        badges,
    }
}
