use anyhow::Result;
use sea_orm::{Database, DatabaseConnection};
use sqlx::postgres::{PgPool, PgPoolOptions};

pub type DbPool = PgPool;
pub type OrmConn = DatabaseConnection;

/// Create an sqlx connection pool.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<OrmConn> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

// The two apps keep separate migration sets. They may share one database in
// development, so unknown applied versions are ignored rather than rejected.
pub async fn run_dog_migrations(pool: &DbPool) -> Result<()> {
    let mut migrator = sqlx::migrate!("./migrations/dog_events");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await?;
    Ok(())
}

pub async fn run_employee_migrations(pool: &DbPool) -> Result<()> {
    let mut migrator = sqlx::migrate!("./migrations/employee_directory");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await?;
    Ok(())
}
