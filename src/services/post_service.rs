// src/services/post_service.rs - post and comment writes

use std::sync::Arc;

use log::{info, warn};

use crate::dtos::post::{CommentForm, PostForm};
use crate::error::{BlogError, BlogResult};
use crate::models::{Comment, NewComment, NewPost, Post, PostChanges};
use crate::repositories::BlogStore;
use crate::services::feed_cache::FeedCache;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn BlogStore>,
    cache: Arc<FeedCache>,
}

impl PostService {
    pub fn new(store: Arc<dyn BlogStore>, cache: Arc<FeedCache>) -> Self {
        Self { store, cache }
    }

    pub async fn create_post(&self, author_id: i64, form: PostForm) -> BlogResult<Post> {
        form.validate()?;
        self.require_user(author_id).await?;
        self.require_group(form.group).await?;

        let post = self
            .store
            .create_post(NewPost {
                author_id,
                text: form.text,
                group_id: form.group,
                image: form.image,
            })
            .await?;
        self.cache.invalidate().await;
        info!("post {} created by user {}", post.id, author_id);
        Ok(post)
    }

    /// Replaces text and group. The image is kept unless a new one is given.
    pub async fn edit_post(&self, post_id: i64, editor_id: i64, form: PostForm) -> BlogResult<Post> {
        let current = self.owned_post(post_id, editor_id).await?;
        form.validate()?;
        self.require_group(form.group).await?;

        let changes = PostChanges {
            text: form.text,
            group_id: form.group,
            image: form.image.or(current.image),
        };
        let post = self
            .store
            .update_post(post_id, changes)
            .await?
            .ok_or_else(|| BlogError::not_found(format!("post {}", post_id)))?;
        self.cache.invalidate().await;
        info!("post {} edited", post_id);
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: i64, editor_id: i64) -> BlogResult<()> {
        self.owned_post(post_id, editor_id).await?;
        self.store.delete_post(post_id).await?;
        self.cache.invalidate().await;
        info!("post {} deleted", post_id);
        Ok(())
    }

    pub async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        form: CommentForm,
    ) -> BlogResult<Comment> {
        form.validate()?;
        if self.store.post_by_id(post_id).await?.is_none() {
            return Err(BlogError::not_found(format!("post {}", post_id)));
        }
        self.require_user(author_id).await?;
        self.store
            .create_comment(NewComment {
                post_id,
                author_id,
                text: form.text,
            })
            .await
    }

    async fn owned_post(&self, post_id: i64, editor_id: i64) -> BlogResult<Post> {
        let post = self
            .store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| BlogError::not_found(format!("post {}", post_id)))?;
        if post.author_id != editor_id {
            warn!("user {} tried to modify post {} of user {}", editor_id, post_id, post.author_id);
            return Err(BlogError::Forbidden(format!(
                "only the author can change post {}",
                post_id
            )));
        }
        Ok(post)
    }

    async fn require_user(&self, id: i64) -> BlogResult<()> {
        match self.store.user_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(BlogError::not_found(format!("user {}", id))),
        }
    }

    async fn require_group(&self, id: Option<i64>) -> BlogResult<()> {
        let Some(id) = id else { return Ok(()) };
        match self.store.group_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(BlogError::not_found(format!("group {}", id))),
        }
    }
}
