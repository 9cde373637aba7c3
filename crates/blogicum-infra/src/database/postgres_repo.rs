//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, CommentView, FeedQuery, Location, Page, PageRequest, PostView, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::policy::FeedScope;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn feed(
        &self,
        query: &FeedQuery,
        page: PageRequest,
    ) -> Result<Page<PostView>, RepoError> {
        let mut select = PostEntity::find();

        if query.scope == FeedScope::Published {
            select = select
                .inner_join(CategoryEntity)
                .filter(post::Column::IsPublished.eq(true))
                .filter(post::Column::PubDate.lte(query.now))
                .filter(category::Column::IsPublished.eq(true));
        }
        if let Some(author_id) = query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }

        let paginator = select
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, page.size);

        let total_items = paginator.num_items().await.map_err(query_error)?;
        let posts = paginator
            .fetch_page(page.number - 1)
            .await
            .map_err(query_error)?;

        let items = hydrate(&self.db, posts).await?;
        Ok(Page::new(items, page, total_items))
    }

    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        Ok(hydrate(&self.db, vec![model]).await?.pop())
    }
}

/// Join posts with their author, category and location, and count comments.
async fn hydrate(db: &DbConn, posts: Vec<post::Model>) -> Result<Vec<PostView>, RepoError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
    let category_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.category_id).collect();
    let location_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.location_id).collect();

    let authors: HashMap<Uuid, User> = UserEntity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .map_err(query_error)?
        .into_iter()
        .map(|m| (m.id, m.into()))
        .collect();

    let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect()
    };

    let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
        HashMap::new()
    } else {
        LocationEntity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(db)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect()
    };

    let comment_counts: HashMap<Uuid, i64> = CommentEntity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
        .filter(comment::Column::PostId.is_in(post_ids))
        .group_by(comment::Column::PostId)
        .into_tuple::<(Uuid, i64)>()
        .all(db)
        .await
        .map_err(query_error)?
        .into_iter()
        .collect();

    posts
        .into_iter()
        .map(|model| {
            let author = authors
                .get(&model.author_id)
                .map(Author::from)
                .ok_or_else(|| RepoError::Query(format!("post {} has no author", model.id)))?;
            let category = model.category_id.and_then(|id| categories.get(&id).cloned());
            let location = model.location_id.and_then(|id| locations.get(&id).cloned());
            let comment_count = comment_counts.get(&model.id).copied().unwrap_or(0) as u64;

            Ok(PostView {
                post: model.into(),
                author,
                category,
                location,
                comment_count,
            })
        })
        .collect()
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let rows = CommentEntity::find()
            .find_also_related(UserEntity)
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let author: User = author
                    .ok_or_else(|| {
                        RepoError::Query(format!("comment {} has no author", comment.id))
                    })?
                    .into();
                Ok(CommentView {
                    comment: comment.into(),
                    author: Author::from(&author),
                })
            })
            .collect()
    }
}
