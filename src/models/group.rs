use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BlogError, BlogResult};

const MAX_TITLE_LEN: usize = 200;
const MAX_SLUG_LEN: usize = 50;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern compiles"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

impl NewGroup {
    pub fn new(title: &str, slug: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        }
    }

    pub fn validate(&self) -> BlogResult<()> {
        if self.title.trim().is_empty() {
            return Err(BlogError::constraint("group title is required"));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(BlogError::constraint(format!(
                "group title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        if !is_valid_slug(&self.slug) {
            return Err(BlogError::constraint(format!(
                "invalid slug {:?}: use letters, digits, '-' or '_'",
                self.slug
            )));
        }
        if self.slug.len() > MAX_SLUG_LEN {
            return Err(BlogError::constraint(format!(
                "slug must be at most {} characters",
                MAX_SLUG_LEN
            )));
        }
        Ok(())
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}
