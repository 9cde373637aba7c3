//! In-memory storage - used when no database is configured, and by the test suites.
//!
//! Every repository handed out by one [`InMemoryStore`] shares the same tables, so
//! the deletion policy works across entity types exactly as the database foreign
//! keys do: users and posts cascade, categories and locations are cleared on
//! their posts. Data is lost on process restart.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, Comment, CommentView, FeedQuery, Location, Page, PageRequest, Post,
    PostView, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};

#[derive(Default)]
pub struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn remove_post(&mut self, id: Uuid) -> bool {
        let removed = self.posts.remove(&id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != id);
        }
        removed
    }

    fn post_view(&self, post: &Post) -> Result<PostView, RepoError> {
        let author = self
            .users
            .get(&post.author_id)
            .map(Author::from)
            .ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;

        Ok(PostView {
            post: post.clone(),
            author,
            category: post.category_id.and_then(|id| self.categories.get(&id).cloned()),
            location: post.location_id.and_then(|id| self.locations.get(&id).cloned()),
            comment_count: self.comments.values().filter(|c| c.post_id == post.id).count() as u64,
        })
    }
}

/// A row type stored in [`Tables`].
pub trait StoredEntity: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    fn id(&self) -> Uuid;

    fn rows(tables: &Tables) -> &HashMap<Uuid, Self>;

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Unique and foreign-key constraints, checked before every write.
    fn check_constraints(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Remove the row and apply the deletion policy to dependent rows.
    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        Self::rows_mut(tables).remove(&id).is_some()
    }
}

fn require<T>(rows: &HashMap<Uuid, T>, id: Uuid, what: &str) -> Result<(), RepoError> {
    if rows.contains_key(&id) {
        Ok(())
    } else {
        Err(RepoError::Constraint(format!("{what} {id} does not exist")))
    }
}

impl StoredEntity for User {
    const NAME: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .users
            .values()
            .any(|u| u.id != self.id && u.username == self.username);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                self.username
            )));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        if tables.users.remove(&id).is_none() {
            return false;
        }
        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        true
    }
}

impl StoredEntity for Category {
    const NAME: &'static str = "category";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .categories
            .values()
            .any(|c| c.id != self.id && c.slug == self.slug);
        if taken {
            return Err(RepoError::Constraint(format!(
                "category slug {} already exists",
                self.slug
            )));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        if tables.categories.remove(&id).is_none() {
            return false;
        }
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        true
    }
}

impl StoredEntity for Location {
    const NAME: &'static str = "location";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        if tables.locations.remove(&id).is_none() {
            return false;
        }
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        true
    }
}

impl StoredEntity for Post {
    const NAME: &'static str = "post";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        require(&tables.users, self.author_id, "author")?;
        if let Some(category_id) = self.category_id {
            require(&tables.categories, category_id, "category")?;
        }
        if let Some(location_id) = self.location_id {
            require(&tables.locations, location_id, "location")?;
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        tables.remove_post(id)
    }
}

impl StoredEntity for Comment {
    const NAME: &'static str = "comment";

    fn id(&self) -> Uuid {
        self.id
    }

    fn rows(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn rows_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }

    fn check_constraints(&self, tables: &Tables) -> Result<(), RepoError> {
        require(&tables.posts, self.post_id, "post")?;
        require(&tables.users, self.author_id, "author")
    }
}

/// Shared in-memory tables; hands out one repository per entity type.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn repository<T: StoredEntity>(&self) -> InMemoryRepository<T> {
        InMemoryRepository {
            tables: self.tables.clone(),
            _entity: PhantomData,
        }
    }

    pub fn users(&self) -> InMemoryRepository<User> {
        self.repository()
    }

    pub fn categories(&self) -> InMemoryRepository<Category> {
        self.repository()
    }

    pub fn locations(&self) -> InMemoryRepository<Location> {
        self.repository()
    }

    pub fn posts(&self) -> InMemoryRepository<Post> {
        self.repository()
    }

    pub fn comments(&self) -> InMemoryRepository<Comment> {
        self.repository()
    }
}

/// Repository over one table of an [`InMemoryStore`].
pub struct InMemoryRepository<T> {
    tables: Arc<RwLock<Tables>>,
    _entity: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: StoredEntity> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::rows(&tables).get(&id).cloned())
    }

    async fn create(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::rows(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Constraint(format!("{} already exists", T::NAME)));
        }
        entity.check_constraints(&tables)?;
        T::rows_mut(&mut tables).insert(entity.id(), entity.clone());
        tracing::debug!(entity = T::NAME, id = %entity.id(), "Row created");
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::rows(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        entity.check_constraints(&tables)?;
        T::rows_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::remove(&mut tables, id) {
            tracing::debug!(entity = T::NAME, %id, "Row deleted");
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository<Category> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl LocationRepository for InMemoryRepository<Location> {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<Location> = tables.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository<Post> {
    async fn feed(
        &self,
        query: &FeedQuery,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let tables = self.tables.read().await;

        let mut posts: Vec<&Post> = tables
            .posts
            .values()
            .filter(|p| {
                let category = p.category_id.and_then(|id| tables.categories.get(&id));
                query.matches(p, category)
            })
            .collect();
        posts.sort_by(|a, b| {
            b.pub_date
                .cmp(&a.pub_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total_items = posts.len() as u64;
        let items = posts
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .map(|p| tables.post_view(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, page, total_items))
    }

    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError> {
        let tables = self.tables.read().await;
        tables.posts.get(&id).map(|p| tables.post_view(p)).transpose()
    }
}

#[async_trait]
impl CommentRepository for InMemoryRepository<Comment> {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        comments
            .into_iter()
            .map(|c| {
                let author = tables.users.get(&c.author_id).map(Author::from).ok_or_else(|| {
                    RepoError::Query(format!("comment {} has no author", c.id))
                })?;
                Ok(CommentView {
                    comment: c.clone(),
                    author,
                })
            })
            .collect()
    }
}
