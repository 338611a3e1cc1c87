use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::page::Page;
use crate::data::post_repository::PostQuery;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppJson, AppResult};

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
}

/// Acting identity for write operations, passed as `?email=`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct IdentityQuery {
    pub(crate) email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostPageQuery {
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) size: Option<u32>,
    pub(crate) title: Option<String>,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostResponseDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) view: i32,
    pub(crate) name: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostPageDto {
    pub(crate) content: Vec<PostResponseDto>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total_count: i64,
    pub(crate) start: u32,
    pub(crate) end: u32,
    pub(crate) prev: bool,
    pub(crate) next: bool,
    pub(crate) prev_page: Option<u32>,
    pub(crate) next_page: Option<u32>,
}

impl From<Post> for PostResponseDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            view: post.view,
            name: post.author_name,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

impl From<Page<Post>> for PostPageDto {
    fn from(page: Page<Post>) -> Self {
        let page = page.map(PostResponseDto::from);
        Self {
            content: page.content,
            page: page.page,
            size: page.size,
            total_count: page.total_count,
            start: page.start,
            end: page.end,
            prev: page.prev,
            next: page.next,
            prev_page: page.prev_page,
            next_page: page.next_page,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    params(
        ("email" = String, Query, description = "Acting identity")
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    Query(identity): Query<IdentityQuery>,
    AppJson(dto): AppJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostResponseDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
    };

    let post = state.post_service.create_post(&identity.email, req).await?;
    Ok((StatusCode::CREATED, Json(PostResponseDto::from(post))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostResponseDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostResponseDto>)> {
    let post = state.post_service.find_post_by_id(id).await?;

    Ok((StatusCode::OK, Json(PostResponseDto::from(post))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("size" = Option<u32>, Query, description = "Items per page (1..=100)"),
        ("title" = Option<String>, Query, description = "Filter by title substring"),
        ("name" = Option<String>, Query, description = "Filter by author substring")
    ),
    responses(
        (status = 200, description = "Posts listed", body = PostPageDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostPageQuery>,
) -> AppResult<(StatusCode, Json<PostPageDto>)> {
    query.validate()?;
    let post_query = PostQuery {
        page: query.page.unwrap_or(1),
        size: query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        title: query.title,
        author_name: query.name,
    };

    let page = state.post_service.find_posts(post_query).await?;

    Ok((StatusCode::OK, Json(PostPageDto::from(page))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id"),
        ("email" = String, Query, description = "Acting identity")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostResponseDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(identity): Query<IdentityQuery>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostResponseDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
    };

    let post = state
        .post_service
        .update_post(id, &identity.email, req)
        .await?;
    Ok((StatusCode::OK, Json(PostResponseDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id"),
        ("email" = String, Query, description = "Acting identity")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(identity): Query<IdentityQuery>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(id, &identity.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts",
    tag = "posts",
    responses(
        (status = 204, description = "All posts deleted"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_all_posts(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.post_service.delete_all_posts().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicI64, Ordering},
    };

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::post_service::PostService;
    use crate::data::post_repository::{NewPost, PostPatch, PostQuery, PostRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::Post;
    use crate::presentation::AppState;
    use crate::server::build_router;

    /// Stand-in for the Postgres store so handlers can be exercised
    /// end to end through the router.
    #[derive(Default)]
    struct InMemoryPostRepo {
        posts: Mutex<Vec<Post>>,
        next_id: AtomicI64,
    }

    impl InMemoryPostRepo {
        fn new() -> Self {
            Self {
                posts: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
            }
        }

        fn seed(&self, title: &str, content: &str, author: &str) -> i64 {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            let post = Post::new(id, title, content, 0, author, now, now)
                .expect("seed post must be valid");
            self.posts.lock().expect("posts mutex poisoned").push(post);
            id
        }

        fn matches(post: &Post, query: &PostQuery) -> bool {
            let title_ok = query.title.as_deref().is_none_or(|needle| {
                post.title.to_lowercase().contains(&needle.to_lowercase())
            });
            let author_ok = query.author_name.as_deref().is_none_or(|needle| {
                post.author_name
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            });
            title_ok && author_ok
        }
    }

    #[async_trait]
    impl PostRepository for InMemoryPostRepo {
        async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            let post = Post::new(id, input.title, input.content, 0, input.author_name, now, now)?;
            self.posts
                .lock()
                .expect("posts mutex poisoned")
                .push(post.clone());
            Ok(post)
        }

        async fn read_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
            let mut posts = self.posts.lock().expect("posts mutex poisoned");
            Ok(posts.iter_mut().find(|post| post.id == id).map(|post| {
                post.view += 1;
                post.clone()
            }))
        }

        async fn update_post(
            &self,
            id: i64,
            patch: PostPatch,
        ) -> Result<Option<Post>, DomainError> {
            let mut posts = self.posts.lock().expect("posts mutex poisoned");
            Ok(posts.iter_mut().find(|post| post.id == id).map(|post| {
                post.title = patch.title.clone();
                post.content = patch.content.clone();
                post.updated_at = Utc::now();
                post.clone()
            }))
        }

        async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
            let mut posts = self.posts.lock().expect("posts mutex poisoned");
            let before = posts.len();
            posts.retain(|post| post.id != id);
            Ok(posts.len() < before)
        }

        async fn delete_all_posts(&self) -> Result<u64, DomainError> {
            let mut posts = self.posts.lock().expect("posts mutex poisoned");
            let deleted = posts.len() as u64;
            posts.clear();
            Ok(deleted)
        }

        async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError> {
            let posts = self.posts.lock().expect("posts mutex poisoned");
            let mut matched: Vec<Post> = posts
                .iter()
                .filter(|post| Self::matches(post, query))
                .cloned()
                .collect();
            matched.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });

            let offset = (query.page.saturating_sub(1) as usize) * query.size as usize;
            Ok(matched
                .into_iter()
                .skip(offset)
                .take(query.size as usize)
                .collect())
        }

        async fn count_posts(&self, query: &PostQuery) -> Result<i64, DomainError> {
            let posts = self.posts.lock().expect("posts mutex poisoned");
            Ok(posts.iter().filter(|post| Self::matches(post, query)).count() as i64)
        }
    }

    fn test_app() -> (Arc<InMemoryPostRepo>, Router) {
        let repo = Arc::new(InMemoryPostRepo::new());
        let service = Arc::new(PostService::new(repo.clone()));
        let router = build_router(AppState::new(service));
        (repo, router)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("request must not fail");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body must collect")
            .to_bytes();
        // Extractor rejections are plain text; keep them inspectable.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("body must serialize")))
            .expect("request must build")
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request must build")
    }

    #[tokio::test]
    async fn create_post_returns_created_with_zero_views() {
        let (_repo, router) = test_app();

        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/posts?email=test@gmail.com",
                json!({"title": "title1", "content": "content1"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["title"], "title1");
        assert_eq!(body["content"], "content1");
        assert_eq!(body["view"], 0);
        assert_eq!(body["name"], "test");
        assert!(body["createdAt"].is_string());
        assert!(body["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn create_post_with_blank_title_is_bad_request() {
        let (_repo, router) = test_app();

        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/posts?email=test@gmail.com",
                json!({"title": "   ", "content": "content1"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn create_post_with_missing_content_is_bad_request() {
        let (_repo, router) = test_app();

        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/posts?email=test@gmail.com",
                json!({"title": "only title"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn create_post_with_overlong_title_is_bad_request() {
        let (_repo, router) = test_app();

        let (status, _body) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/posts?email=test@gmail.com",
                json!({"title": "a".repeat(256), "content": "content1"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_post_without_email_is_bad_request() {
        let (_repo, router) = test_app();

        let (status, _body) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/posts",
                json!({"title": "title1", "content": "content1"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_post_counts_each_read() {
        let (repo, router) = test_app();
        let id = repo.seed("title1", "content1", "gildong");

        let (status, body) = send(&router, empty_request("GET", &format!("/api/v1/posts/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
        assert_eq!(body["view"], 1);

        let (_status, body) = send(&router, empty_request("GET", &format!("/api/v1/posts/{id}"))).await;
        assert_eq!(body["view"], 2);
    }

    #[tokio::test]
    async fn get_missing_post_returns_not_found() {
        let (_repo, router) = test_app();

        let (status, body) = send(&router, empty_request("GET", "/api/v1/posts/999")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn list_posts_returns_consistent_page_metadata() {
        let (repo, router) = test_app();
        for i in 0..12 {
            repo.seed(&format!("title{i}"), "content", "gildong");
        }

        let (status, body) =
            send(&router, empty_request("GET", "/api/v1/posts?page=1&size=10")).await;

        assert_eq!(status, StatusCode::OK);
        let content = body["content"].as_array().expect("content must be array");
        assert_eq!(content.len(), 10);
        assert_eq!(body["page"], 1);
        assert_eq!(body["size"], 10);
        assert_eq!(body["totalCount"], 12);
        assert_eq!(body["start"], 1);
        assert_eq!(body["end"], 2);
        assert_eq!(body["prev"], false);
        assert_eq!(body["next"], false);
        assert_eq!(body["prev"].as_bool(), Some(!body["prevPage"].is_null()));
        assert_eq!(body["next"].as_bool(), Some(!body["nextPage"].is_null()));
    }

    #[tokio::test]
    async fn list_posts_filters_by_author_name() {
        let (repo, router) = test_app();
        repo.seed("first", "content", "alice");
        repo.seed("second", "content", "bob");

        let (status, body) = send(&router, empty_request("GET", "/api/v1/posts?name=alice")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 1);
        assert_eq!(body["content"][0]["name"], "alice");
    }

    #[tokio::test]
    async fn list_posts_rejects_zero_size() {
        let (_repo, router) = test_app();

        let (status, _body) = send(&router, empty_request("GET", "/api/v1/posts?size=0")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_post_replaces_fields_and_keeps_id() {
        let (repo, router) = test_app();
        let id = repo.seed("title1", "content1", "gildong");

        let (status, body) = send(
            &router,
            json_request(
                "PATCH",
                &format!("/api/v1/posts/{id}?email=test@gmail.com"),
                json!({"title": "edited title", "content": "edited content"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
        assert_eq!(body["title"], "edited title");
        assert_eq!(body["content"], "edited content");
    }

    #[tokio::test]
    async fn update_post_with_missing_title_is_bad_request() {
        let (repo, router) = test_app();
        let id = repo.seed("title1", "content1", "gildong");

        let (status, body) = send(
            &router,
            json_request(
                "PATCH",
                &format!("/api/v1/posts/{id}?email=test@gmail.com"),
                json!({"content": "edited content"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn update_missing_post_returns_not_found() {
        let (_repo, router) = test_app();

        let (status, _body) = send(
            &router,
            json_request(
                "PATCH",
                "/api/v1/posts/999?email=test@gmail.com",
                json!({"title": "edited", "content": "edited"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_post_returns_no_content_with_empty_body() {
        let (repo, router) = test_app();
        let id = repo.seed("title1", "content1", "gildong");

        let (status, body) = send(
            &router,
            empty_request("DELETE", &format!("/api/v1/posts/{id}?email=test@gmail.com")),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, _body) = send(&router, empty_request("GET", &format!("/api/v1/posts/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_all_posts_returns_no_content() {
        let (repo, router) = test_app();
        repo.seed("title1", "content1", "gildong");
        repo.seed("title2", "content2", "gildong");

        let (status, body) = send(&router, empty_request("DELETE", "/api/v1/posts")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (_status, body) = send(&router, empty_request("GET", "/api/v1/posts")).await;
        assert_eq!(body["totalCount"], 0);
    }

    #[tokio::test]
    async fn create_then_get_round_trips_fields() {
        let (_repo, router) = test_app();

        let (_status, created) = send(
            &router,
            json_request(
                "POST",
                "/api/v1/posts?email=writer@example.com",
                json!({"title": "round trip", "content": "body"}),
            ),
        )
        .await;
        let id = created["id"].as_i64().expect("id must be a number");

        let (status, fetched) =
            send(&router, empty_request("GET", &format!("/api/v1/posts/{id}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], created["title"]);
        assert_eq!(fetched["content"], created["content"]);
        assert_eq!(fetched["name"], created["name"]);
    }
}
