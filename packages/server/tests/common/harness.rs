//! Test harness with testcontainers for integration testing.
//!
//! Uses a shared Postgres container across all tests for dramatically
//! improved performance. The container and migrations are initialized once
//! on first test, then reused.

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::common::Role;
use server_core::domains::accounts::models::User;
use server_core::domains::accounts::JwtService;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::api::ApiClient;

const TEST_JWT_SECRET: &str = "test_secret_key";
const TEST_JWT_ISSUER: &str = "test_issuer";

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness giving each test a fresh pool and router over the shared
/// database.
pub struct TestHarness {
    pub db_pool: PgPool,
    pub jwt_service: Arc<JwtService>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Pool dropped automatically
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            db_pool,
            jwt_service: Arc::new(JwtService::new(
                TEST_JWT_SECRET,
                TEST_JWT_ISSUER.to_string(),
            )),
        })
    }

    /// Build an API client over a freshly constructed router.
    pub fn api(&self) -> ApiClient {
        let app = server_core::server::build_app(
            self.db_pool.clone(),
            self.jwt_service.clone(),
            Vec::new(),
        );
        ApiClient::new(app)
    }

    /// Issue a JWT for a persisted user, exactly as login would.
    pub fn token_for(&self, user: &User) -> String {
        let role = Role::parse(&user.role).expect("seeded user has a valid role");
        self.jwt_service
            .create_token(
                user.id.into_uuid(),
                user.username.clone(),
                role,
                user.organisation_id.map(|id| id.into_uuid()),
            )
            .expect("token creation succeeds")
    }
}
