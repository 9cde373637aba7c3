//! Mapping from domain views to response bodies.

use blogicum_core::domain::{
    Author, Category, CommentView, Location, Page, PostView, User,
};
use blogicum_shared::dto::{
    AccountResponse, AuthorResponse, CategoryResponse, CommentResponse, LocationResponse,
    PageResponse, PostResponse, ProfileResponse,
};

pub fn author(author: Author) -> AuthorResponse {
    AuthorResponse {
        username: author.username,
        first_name: author.first_name,
        last_name: author.last_name,
    }
}

pub fn category(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title,
        description: category.description,
        slug: category.slug,
        is_published: category.is_published,
        created_at: category.created_at,
    }
}

pub fn location(location: Location) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name,
        is_published: location.is_published,
        created_at: location.created_at,
    }
}

pub fn post(view: PostView) -> PostResponse {
    let PostView {
        post,
        author: post_author,
        category: post_category,
        location: post_location,
        comment_count,
    } = view;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        image: post.image,
        is_published: post.is_published,
        created_at: post.created_at,
        author: author(post_author),
        category: post_category.map(category),
        location: post_location.map(location),
        comment_count,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        post_id: view.comment.post_id,
        text: view.comment.text,
        created_at: view.comment.created_at,
        author: author(view.author),
    }
}

pub fn profile(user: &User) -> ProfileResponse {
    ProfileResponse {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: user.created_at,
    }
}

pub fn account(user: User) -> AccountResponse {
    AccountResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let total_pages = page.total_pages();
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let number = page.number;
    let size = page.size;
    let total_items = page.total_items;

    PageResponse {
        items: page.items.into_iter().map(f).collect(),
        page: number,
        page_size: size,
        total_items,
        total_pages,
        has_next,
        has_previous,
    }
}
