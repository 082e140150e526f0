use serde::{Deserialize, Serialize};

use crate::dtos::post_dtos::{AuthorOut, CommentOut, PostOut};
use crate::models::Group;
use crate::services::pagination::Page;

/// `?page=N`; anything unparsable falls back to the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFeedOut {
    pub group: Group,
    pub page: Page<PostOut>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorFeedOut {
    pub author: AuthorOut,
    pub post_count: u64,
    /// Whether the requesting user follows this author.
    pub following: bool,
    pub page: Page<PostOut>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailOut {
    pub post: PostOut,
    pub author_post_count: u64,
    pub comments: Vec<CommentOut>,
}
