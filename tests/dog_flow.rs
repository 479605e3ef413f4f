use std::sync::Arc;

use chrono::NaiveDateTime;
use directory_tracker::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_dog_migrations},
    dto::{auth::RegisterInput, dogs::DogInput, events::EventInput},
    error::AppError,
    middleware::{
        auth::AuthUser,
        rate_limit::{RateLimitQuota, RateLimiter, RateLimits},
    },
    models::{Role, User},
    services::{
        auth_service::{self, LoginOutcome, RegisterOutcome},
        dog_service, event_service,
    },
    state::{AppState, AppVariant},
};

// Integration flow: admin registers and signs in, manages a dog and its
// events, and finally deletes the dog together with its history.
#[tokio::test]
async fn dog_and_event_crud_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin = match auth_service::register_user(
        &state.pool,
        register_input("admin", "admin@company.com", Role::Admin),
    )
    .await?
    {
        RegisterOutcome::Created(user) => user,
        _ => anyhow::bail!("expected admin registration to succeed"),
    };
    match auth_service::register_user(
        &state.pool,
        register_input("admin", "other@company.com", Role::Admin),
    )
    .await?
    {
        RegisterOutcome::UsernameTaken => {}
        _ => anyhow::bail!("expected duplicate username to be rejected"),
    }
    match auth_service::register_user(
        &state.pool,
        register_input("admin2", "admin@company.com", Role::Admin),
    )
    .await?
    {
        RegisterOutcome::EmailTaken => {}
        _ => anyhow::bail!("expected duplicate email to be rejected"),
    }
    let staff = match auth_service::register_user(
        &state.pool,
        register_input("staff", "staff@company.com", Role::Employee),
    )
    .await?
    {
        RegisterOutcome::Created(user) => user,
        _ => anyhow::bail!("expected employee registration to succeed"),
    };

    match auth_service::authenticate(&state.pool, "admin", "Admin123!").await? {
        LoginOutcome::Success(user) => assert_eq!(user.id, admin.id),
        _ => anyhow::bail!("expected login to succeed"),
    }
    match auth_service::authenticate(&state.pool, "admin", "WrongPass1!").await? {
        LoginOutcome::InvalidCredentials => {}
        _ => anyhow::bail!("expected a bad password to be rejected"),
    }
    match auth_service::authenticate(&state.pool, "nobody", "Admin123!").await? {
        LoginOutcome::InvalidCredentials => {}
        _ => anyhow::bail!("expected an unknown username to be rejected"),
    }

    let auth_admin = auth_user(&admin, Role::Admin);
    let auth_staff = auth_user(&staff, Role::Employee);

    // Dog CRUD.
    let dog = dog_service::create_dog(&state, dog_input("Rex")).await?;
    assert!(dog.id.starts_with("dog-"));
    assert!(dog_service::dog_exists(&state, &dog.id).await?);

    let updated = dog_service::update_dog(&state, &dog.id, dog_input("Rexy"))
        .await?
        .ok_or_else(|| anyhow::anyhow!("expected the dog to still exist"))?;
    assert_eq!(updated.name, "Rexy");
    assert!(
        dog_service::update_dog(&state, "dog-missing", dog_input("Ghost"))
            .await?
            .is_none()
    );

    dog_service::create_dog(&state, dog_input("Apollo")).await?;
    let names: Vec<String> = dog_service::list_dogs(&state)
        .await?
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Apollo", "Rexy"]);

    // Events for the dog, newest first.
    let morning = event_service::create_event(
        &state,
        event_input(&dog.id, "walk", "2024-01-15T08:00", Some("2024-01-15T08:30")),
    )
    .await?;
    assert!(morning.id.starts_with("evt-"));
    assert_eq!(morning.duration, Some(30.0));

    let evening = event_service::create_event(
        &state,
        event_input(&dog.id, "nap", "2024-01-15T19:00", None),
    )
    .await?;
    assert_eq!(evening.duration, None);

    let events = event_service::list_events_for_dog(&state, &dog.id, None).await?;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, evening.id);
    assert_eq!(events[1].id, morning.id);

    let limited = event_service::list_events_for_dog(&state, &dog.id, Some(1)).await?;
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, evening.id);

    let tweaked = event_service::update_event(
        &state,
        &morning.id,
        event_input(&dog.id, "walk", "2024-01-15T08:00", Some("2024-01-15T09:00")),
    )
    .await?
    .ok_or_else(|| anyhow::anyhow!("expected the event to still exist"))?;
    assert_eq!(tweaked.duration, Some(60.0));

    // Deletion is admin-only and leaves the data untouched otherwise.
    let err = dog_service::delete_dog(&state, &auth_staff, &dog.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    assert!(dog_service::dog_exists(&state, &dog.id).await?);

    let err = event_service::delete_event(&state, &auth_staff, &morning.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let removed_from = event_service::delete_event(&state, &auth_admin, &morning.id).await?;
    assert_eq!(removed_from.as_deref(), Some(dog.id.as_str()));
    assert!(event_service::get_event(&state, &morning.id).await?.is_none());

    // Deleting the dog removes its remaining events in the same transaction.
    assert!(dog_service::delete_dog(&state, &auth_admin, &dog.id).await?);
    assert!(!dog_service::dog_exists(&state, &dog.id).await?);
    assert!(
        event_service::list_events_for_dog(&state, &dog.id, None)
            .await?
            .is_empty()
    );
    assert!(event_service::get_event(&state, &evening.id).await?.is_none());

    assert!(!dog_service::delete_dog(&state, &auth_admin, &dog.id).await?);
    assert!(
        event_service::delete_event(&state, &auth_admin, &evening.id)
            .await?
            .is_none()
    );

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_dog_migrations(&pool).await?;

    // Clean tables between runs
    sqlx::query("TRUNCATE TABLE events, dogs, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await?;

    let config = test_config(database_url);
    let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));
    Ok(AppState {
        pool,
        orm,
        config: Arc::new(config),
        limiter,
        variant: AppVariant::DogEvents,
    })
}

fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        secret: "integration-test-secret".to_string(),
        session_ttl_secs: 3600,
        cookie_secure: false,
        rate_limits: RateLimits {
            default: RateLimitQuota::parse("200 per day, 50 per hour").unwrap(),
            login: RateLimitQuota::parse("5 per minute").unwrap(),
            register: RateLimitQuota::parse("3 per hour").unwrap(),
            add_edit: RateLimitQuota::parse("10 per minute").unwrap(),
            delete: RateLimitQuota::parse("5 per minute").unwrap(),
            api: RateLimitQuota::parse("100 per hour").unwrap(),
        },
    }
}

fn register_input(username: &str, email: &str, role: Role) -> RegisterInput {
    RegisterInput {
        username: username.to_string(),
        email: email.to_string(),
        full_name: "Test Account".to_string(),
        password: "Admin123!".to_string(),
        role,
    }
}

fn auth_user(user: &User, role: Role) -> AuthUser {
    AuthUser {
        user_id: user.id.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        role,
        csrf: "test-csrf".to_string(),
    }
}

fn dog_input(name: &str) -> DogInput {
    DogInput {
        name: name.to_string(),
        approx_age: "3 years".to_string(),
        size: "medium".to_string(),
        breed_type: "Golden Retriever".to_string(),
    }
}

fn ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").unwrap()
}

fn event_input(dog_id: &str, event_type: &str, start: &str, end: Option<&str>) -> EventInput {
    EventInput {
        dog_id: dog_id.to_string(),
        event_type: event_type.to_string(),
        timestamp: ts(start),
        end_timestamp: end.map(ts),
        location: Some("Neighborhood Park".to_string()),
        notes: None,
        bristol_stool_scale: None,
    }
}
