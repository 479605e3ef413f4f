use chrono::NaiveDateTime;
use sea_orm::{EntityTrait, PaginatorTrait, Set};

use crate::{
    db::DbPool,
    entity::{Dogs, Employees, Events, dogs, employees, events},
    models::prefixed_id,
    services::auth_service,
    state::AppState,
};

/// Seeds the dog tracker with sample data on first start. Every step is
/// guarded by a count check so restarts leave existing data alone.
pub async fn seed_dog_app(state: &AppState) -> anyhow::Result<()> {
    ensure_default_users(&state.pool).await?;

    if Dogs::find().count(&state.orm).await? > 0 {
        return Ok(());
    }

    let dog_rows = [
        ("dog-001", "Max", "3 years", "medium", "Golden Retriever"),
        ("dog-002", "Bella", "1 year", "small", "Chihuahua"),
    ];
    let dog_models = dog_rows
        .iter()
        .map(|(id, name, approx_age, size, breed_type)| dogs::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
            approx_age: Set(approx_age.to_string()),
            size: Set(size.to_string()),
            breed_type: Set(breed_type.to_string()),
        })
        .collect::<Vec<_>>();
    Dogs::insert_many(dog_models).exec(&state.orm).await?;

    let event_models = vec![
        events::ActiveModel {
            id: Set("evt-001".to_string()),
            dog_id: Set("dog-001".to_string()),
            event_type: Set("walk".to_string()),
            timestamp: Set(ts("2024-01-15T08:00")?),
            end_timestamp: Set(Some(ts("2024-01-15T08:30")?)),
            location: Set(Some("Neighborhood Park".to_string())),
            notes: Set(Some("Good energy, met other dogs".to_string())),
            bristol_stool_scale: Set(None),
        },
        events::ActiveModel {
            id: Set("evt-002".to_string()),
            dog_id: Set("dog-001".to_string()),
            event_type: Set("poop".to_string()),
            timestamp: Set(ts("2024-01-15T08:15")?),
            end_timestamp: Set(None),
            location: Set(Some("Backyard".to_string())),
            notes: Set(Some("Normal consistency".to_string())),
            bristol_stool_scale: Set(Some(4)),
        },
        events::ActiveModel {
            id: Set("evt-003".to_string()),
            dog_id: Set("dog-002".to_string()),
            event_type: Set("nap".to_string()),
            timestamp: Set(ts("2024-01-15T10:00")?),
            end_timestamp: Set(Some(ts("2024-01-15T11:30")?)),
            location: Set(Some("Living Room".to_string())),
            notes: Set(Some("Slept soundly on favorite blanket".to_string())),
            bristol_stool_scale: Set(None),
        },
    ];
    Events::insert_many(event_models).exec(&state.orm).await?;

    tracing::info!("Seeded sample dogs and events");
    Ok(())
}

pub async fn seed_employee_app(state: &AppState) -> anyhow::Result<()> {
    ensure_default_users(&state.pool).await?;

    if Employees::find().count(&state.orm).await? > 0 {
        return Ok(());
    }

    let employee_rows = [
        (
            "emp-001",
            "John Doe",
            "Seattle, WA",
            "Software Engineer",
            vec!["apple", "coffee", "bug"],
        ),
        (
            "emp-002",
            "Jane Smith",
            "Austin, TX",
            "Product Manager",
            vec!["trophy", "plane", "camera"],
        ),
    ];
    let employee_models = employee_rows
        .into_iter()
        .map(|(id, fullname, location, job_title, badges)| employees::ActiveModel {
            id: Set(id.to_string()),
            fullname: Set(fullname.to_string()),
            location: Set(location.to_string()),
            job_title: Set(job_title.to_string()),
            badges: Set(serde_json::json!(badges)),
        })
        .collect::<Vec<_>>();
    Employees::insert_many(employee_models)
        .exec(&state.orm)
        .await?;

    tracing::info!("Seeded sample employees");
    Ok(())
}

async fn ensure_default_users(pool: &DbPool) -> anyhow::Result<()> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let accounts = [
        (
            "admin",
            "admin@company.com",
            "Admin123!",
            "System Administrator",
            "admin",
        ),
        (
            "employee",
            "employee@company.com",
            "Employee123!",
            "Sample Employee",
            "employee",
        ),
    ];

    for (username, email, password, full_name, role) in accounts {
        let password_hash = auth_service::hash_password(password)?;
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, full_name, role) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(prefixed_id("user"))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .execute(pool)
        .await?;
    }

    tracing::info!("Seeded default accounts. Admin credentials: admin / Admin123!");
    Ok(())
}

fn ts(raw: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|e| anyhow::anyhow!("bad seed timestamp '{raw}': {e}"))
}
