#![allow(dead_code)]

use std::sync::Arc;

use courseboard::{
    auth::AuthService,
    config::{DatabaseConfig, Settings},
    domain::{Course, CreateCourseRequest, CreateUserRequest, Role, User},
    repository::CourseRepository,
    service::ServiceContext,
    uploads::FileStore,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

pub const PASSWORD: &str = "password123";

/// A single connection keeps every query on the same in-memory database.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// A SQLite file in a fresh temp directory behind several connections, so
/// concurrent writers really contend for the database lock.
pub async fn file_pool(max_connections: u32) -> anyhow::Result<SqlitePool> {
    let dir = std::env::temp_dir().join(format!("courseboard-db-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;

    let database = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.join("test.db").display()),
        max_connections,
        busy_timeout_secs: 5,
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(database.max_connections)
        .connect_with(database.connect_options()?)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub async fn test_context() -> anyhow::Result<Arc<ServiceContext>> {
    context_with_pool(test_pool().await?)
}

pub fn context_with_pool(pool: SqlitePool) -> anyhow::Result<Arc<ServiceContext>> {
    let settings = Settings::default();

    let upload_root = std::env::temp_dir().join(format!("courseboard-test-{}", Uuid::new_v4()));
    let auth_service = Arc::new(AuthService::new(&settings.auth));
    let file_store = Arc::new(FileStore::new(upload_root, settings.uploads.max_file_size));

    Ok(Arc::new(ServiceContext::new(auth_service, file_store, pool)))
}

pub async fn create_user(ctx: &ServiceContext, username: &str, role: Role) -> anyhow::Result<User> {
    let user = ctx.user_service.register(CreateUserRequest {
        email: format!("{}@example.com", username),
        username: username.to_string(),
        full_name: format!("{} Test", username),
        password: PASSWORD.to_string(),
        role,
    }).await?;

    Ok(user)
}

pub async fn create_course(ctx: &ServiceContext, code: &str) -> anyhow::Result<Course> {
    let course = ctx.course_repo.create(CreateCourseRequest {
        name: format!("Course {}", code),
        code: code.to_string(),
        description: None,
    }).await?;

    Ok(course)
}
