use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BlogError, BlogResult};

/// Number of characters shown by `preview`.
pub const PREVIEW_CHARS: usize = 15;
const MAX_IMAGE_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl Post {
    pub fn preview(&self) -> String {
        preview(&self.text)
    }
}

/// Validated insert payload; `pub_date` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Mutable columns of a post. Author and `pub_date` never change.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Selection criteria for feed queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by anyone the given user follows.
    FollowedBy(i64),
}

pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Image references are stored as a path of at most 100 characters.
pub fn check_image(image: Option<&str>) -> BlogResult<()> {
    match image {
        Some(path) if path.chars().count() > MAX_IMAGE_LEN => Err(BlogError::constraint(format!(
            "image path must be at most {} characters",
            MAX_IMAGE_LEN
        ))),
        _ => Ok(()),
    }
}
