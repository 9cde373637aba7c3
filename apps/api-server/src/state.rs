//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::domain::User;
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PasswordService,
    PostRepository, UserRepository,
};
use blogicum_infra::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "postgres")]
use blogicum_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::BootstrapStaff;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        tracing::info!("Application state initialized (postgres)");
                        return Self::postgres(Arc::new(connections));
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            if db_config.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory(InMemoryStore::new())
    }

    /// State backed by a process-local store.
    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            users: Arc::new(store.users()),
            categories: Arc::new(store.categories()),
            locations: Arc::new(store.locations()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: Arc<DatabaseConnections>) -> Self {
        let conn = connections.main.clone();
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
            db: Some(connections),
        }
    }

    /// Name of the storage backend, reported by the health check.
    pub fn storage_backend(&self) -> &'static str {
        #[cfg(feature = "postgres")]
        if self.db.is_some() {
            return "postgres";
        }
        "memory"
    }

    /// Make sure the configured staff account exists and carries the staff flag.
    ///
    /// The password of an existing account is left alone.
    pub async fn ensure_staff_account(
        &self,
        staff: &BootstrapStaff,
        password_service: &dyn PasswordService,
    ) -> Result<User, RepoError> {
        if let Some(mut user) = self.users.find_by_username(&staff.username).await? {
            if !user.is_staff {
                user.is_staff = true;
                user.updated_at = chrono::Utc::now();
                user = self.users.update(user).await?;
                tracing::info!(username = %user.username, "Promoted bootstrap account to staff");
            }
            return Ok(user);
        }

        let password_hash = password_service
            .hash(&staff.password)
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let mut user = User::new(staff.username.clone(), String::new(), password_hash);
        user.is_staff = true;

        let user = self.users.create(user).await?;
        tracing::info!(username = %user.username, "Created bootstrap staff account");
        Ok(user)
    }
}
