use chrono::{DateTime, Utc};
use serde::Serialize;

use super::post::preview;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author_id: i64,
    pub post_id: i64,
}

impl Comment {
    pub fn preview(&self) -> String {
        preview(&self.text)
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}
