use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, Comment, CommentView, FeedQuery, Location, Page, PageRequest, Post, PostView, User,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// Deleting enforces the storage-level deletion policy: removing a user removes
/// their posts and comments, removing a post removes its comments, and removing a
/// category or location clears the reference on its posts.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Every category, ordered by title.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// Every location, ordered by name.
    async fn list(&self) -> Result<Vec<Location>, RepoError>;
}

/// Post repository - the two read paths over posts.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of the feed described by `query`, newest `pub_date` first.
    async fn feed(&self, query: &FeedQuery, page: PageRequest)
    -> Result<Page<PostView>, RepoError>;

    /// A single post joined with its related rows, whatever its visibility.
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;
}
