use std::sync::Arc;

use directory_tracker::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_employee_migrations},
    dto::{auth::RegisterInput, employees::EmployeeInput},
    error::AppError,
    middleware::{
        auth::AuthUser,
        rate_limit::{RateLimitQuota, RateLimiter, RateLimits},
    },
    models::Role,
    services::{
        auth_service::{self, LoginOutcome, RegisterOutcome},
        employee_service,
    },
    state::{AppState, AppVariant},
};

// Integration flow: employee CRUD with badge round-trips, plus the
// disabled-account login path.
#[tokio::test]
async fn employee_crud_flow() -> anyhow::Result<()> {
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

    // A deactivated account cannot sign in even with the right password.
    let dormant = match auth_service::register_user(
        &state.pool,
        RegisterInput {
            username: "dormant".to_string(),
            email: "dormant@company.com".to_string(),
            full_name: "Dormant Account".to_string(),
            password: "Admin123!".to_string(),
            role: Role::Employee,
        },
    )
    .await?
    {
        RegisterOutcome::Created(user) => user,
        _ => anyhow::bail!("expected registration to succeed"),
    };
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(&dormant.id)
        .execute(&state.pool)
        .await?;
    match auth_service::authenticate(&state.pool, "dormant", "Admin123!").await? {
        LoginOutcome::Disabled => {}
        _ => anyhow::bail!("expected the disabled account to be refused"),
    }

    let auth_admin = auth_user(Role::Admin);
    let auth_staff = auth_user(Role::Employee);

    let john = employee_service::create_employee(
        &state,
        employee_input("John Doe", "Software Engineer", &["apple", "coffee", "bug"]),
    )
    .await?;
    assert!(john.id.starts_with("emp-"));
    assert_eq!(john.badges, vec!["apple", "coffee", "bug"]);

    employee_service::create_employee(
        &state,
        employee_input("Jane Smith", "Product Manager", &["trophy"]),
    )
    .await?;

    let names: Vec<String> = employee_service::list_employees(&state)
        .await?
        .into_iter()
        .map(|e| e.fullname)
        .collect();
    assert_eq!(names, vec!["Jane Smith", "John Doe"]);

    let fetched = employee_service::get_employee(&state, &john.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("expected the employee to exist"))?;
    assert_eq!(fetched.location, "Seattle, WA");
    assert_eq!(fetched.badges, vec!["apple", "coffee", "bug"]);

    let promoted = employee_service::update_employee(
        &state,
        &john.id,
        employee_input("John Doe", "Staff Engineer", &["trophy", "bug"]),
    )
    .await?
    .ok_or_else(|| anyhow::anyhow!("expected the employee to still exist"))?;
    assert_eq!(promoted.job_title, "Staff Engineer");
    assert_eq!(promoted.badges, vec!["trophy", "bug"]);

    let unbadged = employee_service::update_employee(
        &state,
        &john.id,
        employee_input("John Doe", "Staff Engineer", &[]),
    )
    .await?
    .ok_or_else(|| anyhow::anyhow!("expected the employee to still exist"))?;
    assert!(unbadged.badges.is_empty());

    assert!(
        employee_service::update_employee(
            &state,
            "emp-missing",
            employee_input("Ghost", "Nobody", &[]),
        )
        .await?
        .is_none()
    );

    // Deletion is admin-only.
    let err = employee_service::delete_employee(&state, &auth_staff, &john.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    assert!(employee_service::get_employee(&state, &john.id).await?.is_some());

    assert!(employee_service::delete_employee(&state, &auth_admin, &john.id).await?);
    assert!(employee_service::get_employee(&state, &john.id).await?.is_none());
    assert!(!employee_service::delete_employee(&state, &auth_admin, &john.id).await?);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_employee_migrations(&pool).await?;

    // Clean tables between runs
    sqlx::query("TRUNCATE TABLE employees, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await?;

    let config = test_config(database_url);
    let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));
    Ok(AppState {
        pool,
        orm,
        config: Arc::new(config),
        limiter,
        variant: AppVariant::EmployeeDirectory,
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

fn auth_user(role: Role) -> AuthUser {
    AuthUser {
        user_id: "user-test".to_string(),
        username: "tester".to_string(),
        full_name: "Test Account".to_string(),
        role,
        csrf: "test-csrf".to_string(),
    }
}

fn employee_input(fullname: &str, job_title: &str, badges: &[&str]) -> EmployeeInput {
    EmployeeInput {
        fullname: fullname.to_string(),
        location: "Seattle, WA".to_string(),
        job_title: job_title.to_string(),
        badges: badges.iter().map(|b| b.to_string()).collect(),
    }
}
