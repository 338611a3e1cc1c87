use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) view: i32,
    pub(crate) author_name: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
        })
    }
}

/// Full replacement of title and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
        })
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        view: i32,
        author_name: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        if view < 0 {
            return Err(DomainError::Validation {
                field: "view",
                message: "must be >= 0",
            });
        }
        let title = normalize_title(&title.into())?;
        let content = normalize_content(&content.into())?;
        let author_name = author_name.into().trim().to_string();
        if author_name.is_empty() {
            return Err(DomainError::Validation {
                field: "author_name",
                message: "must not be empty",
            });
        }

        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            title,
            content,
            view,
            author_name,
            created_at,
            updated_at,
        })
    }
}

/// Display name of the acting identity. Writes carry the caller's
/// email as a query parameter; the stored author name is its local
/// part.
pub(crate) fn author_name_from_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim();
    let (local, domain) = email.split_once('@').ok_or(DomainError::Validation {
        field: "email",
        message: "must contain '@'",
    })?;
    if local.is_empty() || domain.is_empty() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must have a local part and a domain",
        });
    }
    Ok(local.to_string())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.len() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
