use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
}

/// Filters and paging for list queries. `page` is 1-based.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostQuery {
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) title: Option<String>,
    pub(crate) author_name: Option<String>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;

    /// Bumps the view counter and returns the post as of that read.
    async fn read_post(&self, id: i64) -> Result<Option<Post>, DomainError>;

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn delete_all_posts(&self) -> Result<u64, DomainError>;

    /// Page slice matching the query filters. Does not bump views.
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, query: &PostQuery) -> Result<i64, DomainError>;
}
