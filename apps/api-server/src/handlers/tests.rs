//! Route-level tests against the in-memory store.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use blogicum_core::domain::{Category, CategoryDraft, Comment, CommentDraft, Post, PostDraft, User};
use blogicum_core::ports::{BaseRepository, CommentRepository, PasswordService, TokenService};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

struct World {
    store: InMemoryStore,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl World {
    fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            tokens: Arc::new(JwtTokenService::new(JwtConfig {
                secret: "handler-tests".to_string(),
                expiration_hours: 1,
                issuer: "blogicum".to_string(),
            })),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    async fn user(&self, username: &str) -> User {
        let user = User::new(username.to_string(), String::new(), "unused".to_string());
        self.store.users().create(user).await.unwrap()
    }

    async fn staff(&self, username: &str) -> User {
        let mut user = User::new(username.to_string(), String::new(), "unused".to_string());
        user.is_staff = true;
        self.store.users().create(user).await.unwrap()
    }

    fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let token = self
            .tokens
            .generate_token(user.id, &user.username, user.roles())
            .unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    async fn category(&self, slug: &str, is_published: bool) -> Category {
        let category = Category::new(CategoryDraft {
            title: slug.to_uppercase(),
            description: format!("All about {slug}"),
            slug: slug.to_string(),
            is_published,
        });
        self.store.categories().create(category).await.unwrap()
    }

    async fn post(
        &self,
        author: &User,
        title: &str,
        category: Option<&Category>,
        is_published: bool,
        pub_date: DateTime<Utc>,
    ) -> Post {
        let post = Post::new(
            author.id,
            PostDraft {
                title: title.to_string(),
                text: format!("{title} text"),
                pub_date,
                image: None,
                category_id: category.map(|c| c.id),
                location_id: None,
                is_published,
            },
        );
        self.store.posts().create(post).await.unwrap()
    }

    async fn comment(&self, post: &Post, author: &User, text: &str, age: Duration) -> Comment {
        let mut comment = Comment::new(
            post.id,
            author.id,
            CommentDraft {
                text: text.to_string(),
            },
        );
        comment.created_at = Utc::now() - age;
        self.store.comments().create(comment).await.unwrap()
    }

    async fn stored_post(&self, id: Uuid) -> Option<Post> {
        self.store.posts().find_by_id(id).await.unwrap()
    }
}

macro_rules! app {
    ($world:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory($world.store.clone())))
                .app_data(web::Data::new($world.tokens.clone()))
                .app_data(web::Data::new($world.passwords.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

fn hour_ago() -> DateTime<Utc> {
    Utc::now() - Duration::hours(1)
}

#[actix_web::test]
async fn test_published_post_appears_in_index_and_category() {
    let world = World::new();
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    world.post(&anna, "Visible", Some(&travel), true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&index), vec!["Visible"]);
    assert_eq!(index["items"][0]["author"]["username"], "anna");
    assert_eq!(index["items"][0]["category"]["slug"], "travel");

    let req = test::TestRequest::get().uri("/category/travel/").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["category"]["slug"], "travel");
    assert_eq!(titles(&page["posts"]), vec!["Visible"]);
}

#[actix_web::test]
async fn test_index_hides_unpublished_future_and_hidden_category_posts() {
    let world = World::new();
    let anna = world.user("anna").await;
    let open = world.category("open", true).await;
    let closed = world.category("closed", false).await;
    world.post(&anna, "Shown", Some(&open), true, hour_ago()).await;
    world.post(&anna, "Draft", Some(&open), false, hour_ago()).await;
    world
        .post(&anna, "Scheduled", Some(&open), true, Utc::now() + Duration::hours(1))
        .await;
    world.post(&anna, "Closed", Some(&closed), true, hour_ago()).await;
    world.post(&anna, "Uncategorized", None, true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&index), vec!["Shown"]);
    assert_eq!(index["total_items"], 1);
}

#[actix_web::test]
async fn test_non_owner_edit_redirects_to_detail_and_keeps_post() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Original", Some(&travel), true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(world.bearer(&boris))
        .set_json(json!({
            "title": "Hijacked",
            "text": "changed",
            "pub_date": hour_ago(),
            "category_id": travel.id,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    assert_eq!(world.stored_post(post.id).await.unwrap().title, "Original");
}

#[actix_web::test]
async fn test_non_owner_edit_form_redirects_to_detail() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let post = world.post(&anna, "Original", None, true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(world.bearer(&boris))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
}

#[actix_web::test]
async fn test_non_owner_delete_redirects_to_detail_and_keeps_post() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let post = world.post(&anna, "Original", None, true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", post.id))
        .insert_header(world.bearer(&boris))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    let stored = world.stored_post(post.id).await.unwrap();
    assert_eq!(stored.title, "Original");
}

#[actix_web::test]
async fn test_anonymous_edit_redirects_to_login() {
    let world = World::new();
    let anna = world.user("anna").await;
    let post = world.post(&anna, "Original", None, true, hour_ago()).await;
    let app = app!(world);

    let path = format!("/posts/{}/edit/", post.id);
    let req = test::TestRequest::get().uri(&path).to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        location(&res),
        format!("/auth/login/?next={}", urlencoding::encode(&path))
    );
}

#[actix_web::test]
async fn test_edit_of_missing_post_is_not_found_even_for_anonymous() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", Uuid::new_v4()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_owner_edits_post() {
    let world = World::new();
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Original", Some(&travel), true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(world.bearer(&anna))
        .set_json(json!({
            "title": "  Revised  ",
            "text": "new text",
            "pub_date": hour_ago(),
            "category_id": travel.id,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    let stored = world.stored_post(post.id).await.unwrap();
    assert_eq!(stored.title, "Revised");
    assert_eq!(stored.author_id, anna.id);
}

#[actix_web::test]
async fn test_scheduled_post_visible_only_to_author() {
    let world = World::new();
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    let scheduled = world
        .post(&anna, "Tomorrow", Some(&travel), true, Utc::now() + Duration::hours(1))
        .await;
    let app = app!(world);

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    assert!(titles(&index).is_empty());

    let req = test::TestRequest::get().uri("/profile/anna/").to_request();
    let public: Value = test::call_and_read_body_json(&app, req).await;
    assert!(titles(&public["posts"]).is_empty());
    assert_eq!(public["profile"]["username"], "anna");

    let req = test::TestRequest::get()
        .uri("/profile/anna/")
        .insert_header(world.bearer(&anna))
        .to_request();
    let own: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&own["posts"]), vec!["Tomorrow"]);

    let detail = format!("/posts/{}/", scheduled.id);
    let req = test::TestRequest::get().uri(&detail).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&detail)
        .insert_header(world.bearer(&anna))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_hidden_post_detail_is_not_found_for_other_users() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let closed = world.category("closed", false).await;
    let post = world.post(&anna, "Secret", Some(&closed), true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .insert_header(world.bearer(&boris))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn test_category_feed_not_found_when_missing_or_unpublished() {
    let world = World::new();
    let anna = world.user("anna").await;
    let closed = world.category("closed", false).await;
    world.post(&anna, "Inside", Some(&closed), true, hour_ago()).await;
    let app = app!(world);

    for uri in ["/category/closed/", "/category/nowhere/"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(world.bearer(&anna))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn test_deleting_category_keeps_its_posts() {
    let world = World::new();
    let admin = world.staff("admin").await;
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::delete()
        .uri("/admin/categories/travel/")
        .insert_header(world.bearer(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let stored = world.stored_post(post.id).await.unwrap();
    assert_eq!(stored.category_id, None);
    assert_eq!(stored.title, "Trip");
}

#[actix_web::test]
async fn test_pagination_bounds() {
    let world = World::new();
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    for i in 0..11 {
        world
            .post(&anna, &format!("Post {i}"), Some(&travel), true, hour_ago() - Duration::minutes(i))
            .await;
    }
    let app = app!(world);

    let req = test::TestRequest::get().uri("/").to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first["items"].as_array().unwrap().len(), 10);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["has_next"], true);
    assert_eq!(first["items"][0]["title"], "Post 0");

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&second), vec!["Post 10"]);
    assert_eq!(second["has_previous"], true);

    let req = test::TestRequest::get().uri("/?page=last").to_request();
    let last: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(last["page"], 2);

    for uri in ["/?page=3", "/?page=0", "/?page=two"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_huge_page_number_is_not_found() {
    let world = World::new();
    let anna = world.user("anna").await;
    world.post(&anna, "Only", None, true, hour_ago()).await;
    let app = app!(world);

    for uri in [
        "/?page=18446744073709551615",
        "/?page=9223372036854775807",
        "/profile/anna/?page=18446744073709551615",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_empty_index_has_one_page() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::get().uri("/?page=1").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total_pages"], 1);
    assert!(titles(&page).is_empty());

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_post_sets_author_and_redirects_to_profile() {
    let world = World::new();
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(world.bearer(&anna))
        .set_json(json!({
            "title": "Fresh",
            "text": "Just written",
            "pub_date": hour_ago(),
            "category_id": travel.id,
            "author_id": Uuid::new_v4(),
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/anna/");

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&index), vec!["Fresh"]);
    assert_eq!(index["items"][0]["author"]["username"], "anna");
}

#[actix_web::test]
async fn test_create_post_requires_login() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .set_json(json!({"title": "x", "text": "y", "pub_date": hour_ago()}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert!(location(&res).starts_with("/auth/login/?next="));
}

#[actix_web::test]
async fn test_create_post_validation_errors() {
    let world = World::new();
    let anna = world.user("anna").await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(world.bearer(&anna))
        .set_json(json!({
            "title": "   ",
            "text": "",
            "pub_date": hour_ago(),
            "category_id": Uuid::new_v4(),
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["text"].is_array());
}

#[actix_web::test]
async fn test_unknown_category_is_a_field_error() {
    let world = World::new();
    let anna = world.user("anna").await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(world.bearer(&anna))
        .set_json(json!({
            "title": "Lost",
            "text": "Where am I",
            "pub_date": hour_ago(),
            "category_id": Uuid::new_v4(),
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["category"].is_array());
}

#[actix_web::test]
async fn test_comments_listed_oldest_first_with_count() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    world.comment(&post, &boris, "second", Duration::minutes(5)).await;
    world.comment(&post, &anna, "first", Duration::minutes(10)).await;
    let app = app!(world);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(detail["post"]["comment_count"], 2);
    let texts: Vec<&str> = detail["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(detail["comments"][1]["author"]["username"], "boris");
}

#[actix_web::test]
async fn test_add_comment_redirects_to_detail() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header(world.bearer(&boris))
        .set_json(json!({"text": "Nice trip"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));

    let comments = world.store.comments().list_for_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.text, "Nice trip");
    assert_eq!(comments[0].author.username, "boris");
}

#[actix_web::test]
async fn test_comment_with_token_of_deleted_account_redirects_to_login() {
    let world = World::new();
    let anna = world.user("anna").await;
    let post = world.post(&anna, "Trip", None, true, hour_ago()).await;
    let ghost = world.user("ghost").await;
    world.store.users().delete(ghost.id).await.unwrap();
    let app = app!(world);

    let path = format!("/posts/{}/comment/", post.id);
    let req = test::TestRequest::post()
        .uri(&path)
        .insert_header(world.bearer(&ghost))
        .set_json(json!({"text": "Still here?"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        location(&res),
        format!("/auth/login/?next={}", urlencoding::encode(&path))
    );
    let comments = world.store.comments().list_for_post(post.id).await.unwrap();
    assert!(comments.is_empty());
}

#[actix_web::test]
async fn test_comment_on_hidden_post_is_not_found() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let post = world.post(&anna, "Draft", None, false, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header(world.bearer(&boris))
        .set_json(json!({"text": "Sneaky"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header(world.bearer(&anna))
        .set_json(json!({"text": "Note to self"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_non_owner_cannot_edit_or_delete_comment() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    let comment = world.comment(&post, &boris, "mine", Duration::minutes(1)).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", post.id, comment.id))
        .insert_header(world.bearer(&anna))
        .set_json(json!({"text": "edited by post author"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header(world.bearer(&anna))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let stored = world.store.comments().find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "mine");
}

#[actix_web::test]
async fn test_owner_edits_then_deletes_comment() {
    let world = World::new();
    let anna = world.user("anna").await;
    let boris = world.user("boris").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    let comment = world.comment(&post, &boris, "typo", Duration::minutes(1)).await;
    let app = app!(world);

    let edit = format!("/posts/{}/edit_comment/{}/", post.id, comment.id);
    let req = test::TestRequest::get()
        .uri(&edit)
        .insert_header(world.bearer(&boris))
        .to_request();
    let form: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(form["text"], "typo");

    let req = test::TestRequest::post()
        .uri(&edit)
        .insert_header(world.bearer(&boris))
        .set_json(json!({"text": "fixed"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    let stored = world.store.comments().find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "fixed");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header(world.bearer(&boris))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);
    assert!(world.store.comments().find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_comment_through_wrong_post_is_not_found() {
    let world = World::new();
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    let other = world.post(&anna, "Other", Some(&travel), true, hour_ago()).await;
    let comment = world.comment(&post, &anna, "here", Duration::minutes(1)).await;
    let app = app!(world);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit_comment/{}/", other.id, comment.id))
        .insert_header(world.bearer(&anna))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_owner_deletes_post_with_comments() {
    let world = World::new();
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    let post = world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    let comment = world.comment(&post, &anna, "note", Duration::minutes(1)).await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", post.id))
        .insert_header(world.bearer(&anna))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/");
    assert!(world.stored_post(post.id).await.is_none());
    assert!(world.store.comments().find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_registration_login_and_cookie_session() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({
            "username": "vera",
            "email": "vera@example.com",
            "password": "long-enough",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({"username": "vera", "password": "long-enough"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "auth_token")
        .expect("login sets the auth cookie")
        .into_owned();
    assert!(cookie.http_only().unwrap_or(false));

    let req = test::TestRequest::get()
        .uri("/edit_profile/")
        .cookie(cookie)
        .to_request();
    let account: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(account["username"], "vera");
    assert_eq!(account["email"], "vera@example.com");
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({"username": "vera", "password": "long-enough"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({"username": "vera", "password": "wrong-password"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_registration_rejects_taken_username_and_short_password() {
    let world = World::new();
    world.user("anna").await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({"username": "anna", "password": "long-enough"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["username"].is_array());

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({"username": "newbie", "password": "short"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["password"].is_array());
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::post().uri("/auth/logout/").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "auth_token")
        .expect("logout resets the auth cookie");
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn test_edit_profile_renames_and_checks_uniqueness() {
    let world = World::new();
    let anna = world.user("anna").await;
    world.user("boris").await;
    let app = app!(world);

    let req = test::TestRequest::post()
        .uri("/edit_profile/")
        .insert_header(world.bearer(&anna))
        .set_json(json!({"username": "boris"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri("/edit_profile/")
        .insert_header(world.bearer(&anna))
        .set_json(json!({"username": "anya", "first_name": "Anna"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/anya/");

    let stored = world.store.users().find_by_id(anna.id).await.unwrap().unwrap();
    assert_eq!(stored.username, "anya");
    assert_eq!(stored.first_name, "Anna");
}

#[actix_web::test]
async fn test_edit_profile_requires_login() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::get().uri("/edit_profile/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/auth/login/?next=%2Fedit_profile%2F");
}

#[actix_web::test]
async fn test_admin_routes_need_staff() {
    let world = World::new();
    let anna = world.user("anna").await;
    let admin = world.staff("admin").await;
    let app = app!(world);

    let req = test::TestRequest::get().uri("/admin/categories/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header(world.bearer(&anna))
        .set_json(json!({"title": "Food", "description": "Eat", "slug": "food"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header(world.bearer(&admin))
        .set_json(json!({"title": "Food", "description": "Eat", "slug": "food"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["is_published"], true);

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header(world.bearer(&admin))
        .set_json(json!({"title": "Food again", "description": "Eat", "slug": "food"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_admin_unpublishes_category_and_manages_locations() {
    let world = World::new();
    let admin = world.staff("admin").await;
    let anna = world.user("anna").await;
    let travel = world.category("travel", true).await;
    world.post(&anna, "Trip", Some(&travel), true, hour_ago()).await;
    let app = app!(world);

    let req = test::TestRequest::patch()
        .uri("/admin/categories/travel/")
        .insert_header(world.bearer(&admin))
        .set_json(json!({"is_published": false}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/").to_request();
    let index: Value = test::call_and_read_body_json(&app, req).await;
    assert!(titles(&index).is_empty());

    let req = test::TestRequest::post()
        .uri("/admin/locations/")
        .insert_header(world.bearer(&admin))
        .set_json(json!({"name": "Moscow"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let location_id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/admin/locations/")
        .insert_header(world.bearer(&admin))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed[0]["name"], "Moscow");

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/locations/{location_id}/"))
        .insert_header(world.bearer(&admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_invalid_post_id_is_not_found() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::get().uri("/posts/not-a-uuid/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health() {
    let world = World::new();
    let app = app!(world);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}
