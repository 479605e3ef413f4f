use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(anyhow::anyhow!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dog {
    pub id: String,
    pub name: String,
    pub approx_age: String,
    pub size: String,
    pub breed_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: String,
    pub dog_id: String,
    pub event_type: String,
    pub timestamp: NaiveDateTime,
    pub end_timestamp: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub bristol_stool_scale: Option<i32>,
    /// Minutes between start and end, present only when the event has ended.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    pub id: String,
    pub fullname: String,
    pub location: String,
    pub job_title: String,
    pub badges: Vec<String>,
}

pub fn duration_minutes(start: NaiveDateTime, end: Option<NaiveDateTime>) -> Option<f64> {
    end.map(|end| (end - start).num_seconds() as f64 / 60.0)
}

/// Record ids look like `dog-1a2b3c4d`: a short prefix plus the first eight
/// hex digits of a fresh UUID.
pub fn prefixed_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &uuid[..8])
}
