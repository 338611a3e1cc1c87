use std::sync::Arc;

use crate::application::page::Page;
use crate::data::post_repository::{NewPost, PostPatch, PostQuery, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest, author_name_from_email};

pub(crate) struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub(crate) fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        email: &str,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let author_name = author_name_from_email(email)?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            author_name,
        };
        self.repo.create_post(new_post).await
    }

    /// Lookup by id, counting the read.
    pub(crate) async fn find_post_by_id(&self, id: i64) -> Result<Post, DomainError> {
        self.repo
            .read_post(id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn find_posts(&self, query: PostQuery) -> Result<Page<Post>, DomainError> {
        let posts = self.repo.list_posts(&query).await?;
        let total = self.repo.count_posts(&query).await?;

        Ok(Page::new(posts, query.page, query.size, total))
    }

    /// The caller's email names the acting identity; matching it
    /// against the stored author is the authorization subsystem's job,
    /// not ours.
    pub(crate) async fn update_post(
        &self,
        id: i64,
        _email: &str,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let patch = PostPatch {
            title: req.title,
            content: req.content,
        };
        self.repo
            .update_post(id, patch)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn delete_post(&self, id: i64, _email: &str) -> Result<(), DomainError> {
        let deleted = self.repo.delete_post(id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {id}")));
        }
        Ok(())
    }

    pub(crate) async fn delete_all_posts(&self) -> Result<(), DomainError> {
        let deleted = self.repo.delete_all_posts().await?;
        tracing::debug!(deleted, "deleted all posts");
        Ok(())
    }
}
