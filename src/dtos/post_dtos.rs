use serde::{Deserialize, Serialize};

use crate::error::{BlogError, BlogResult};
use crate::models::post::check_image;
use crate::models::{Comment, Group, Post, User};

/// Submitted post fields, used for both create and edit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    pub group: Option<i64>,
    pub image: Option<String>,
}

impl PostForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group = Some(group_id);
        self
    }

    pub fn validate(&self) -> BlogResult<()> {
        validate_post_text(&self.text)?;
        check_image(self.image.as_deref())
    }
}

/// Blank post text is rejected; anything else is returned untouched.
pub fn validate_post_text(text: &str) -> BlogResult<&str> {
    if text.trim().is_empty() {
        return Err(BlogError::EmptyText);
    }
    Ok(text)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Comment text is a required field, nothing more.
    pub fn validate(&self) -> BlogResult<()> {
        if self.text.trim().is_empty() {
            return Err(BlogError::constraint("comment text is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorOut {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}

impl From<&User> for AuthorOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.display_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

impl From<&Group> for GroupRef {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            title: group.title.clone(),
            slug: group.slug.clone(),
        }
    }
}

/// Post as shown in feeds, with author and group resolved.
#[derive(Debug, Clone, Serialize)]
pub struct PostOut {
    pub id: i64,
    pub text: String,
    pub pub_date: String,
    pub image: Option<String>,
    pub author: AuthorOut,
    pub group: Option<GroupRef>,
}

impl PostOut {
    pub fn build(post: &Post, author: &User, group: Option<&Group>) -> Self {
        Self {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date.to_rfc3339(),
            image: post.image.clone(),
            author: AuthorOut::from(author),
            group: group.map(GroupRef::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentOut {
    pub id: i64,
    pub text: String,
    pub created: String,
    pub author: AuthorOut,
}

impl CommentOut {
    pub fn build(comment: &Comment, author: &User) -> Self {
        Self {
            id: comment.id,
            text: comment.text.clone(),
            created: comment.created.to_rfc3339(),
            author: AuthorOut::from(author),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_text_passes_through_unchanged() {
        assert_eq!(validate_post_text("  padded  ").unwrap(), "  padded  ");
    }

    #[test]
    fn blank_post_text_is_empty_text_error() {
        for text in ["", "   ", "\n\t"] {
            assert!(matches!(validate_post_text(text), Err(BlogError::EmptyText)));
            assert!(matches!(PostForm::new(text).validate(), Err(BlogError::EmptyText)));
        }
    }

    #[test]
    fn overlong_image_path_is_a_constraint_violation() {
        let mut form = PostForm::new("with picture");
        form.image = Some(format!("posts/{}.gif", "i".repeat(120)));
        assert!(matches!(form.validate(), Err(BlogError::ConstraintViolation(_))));

        form.image = Some("posts/small.gif".into());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn blank_comment_is_missing_required_field() {
        assert!(matches!(
            CommentForm::new(" ").validate(),
            Err(BlogError::ConstraintViolation(_))
        ));
        assert!(CommentForm::new("atyatya").validate().is_ok());
    }
}
