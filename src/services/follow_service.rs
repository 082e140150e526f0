use std::sync::Arc;

use log::info;

use crate::error::{BlogError, BlogResult};
use crate::models::{Follow, User};
use crate::repositories::BlogStore;

#[derive(Clone)]
pub struct FollowService {
    store: Arc<dyn BlogStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Fails on self-follow and on an already existing follow.
    pub async fn follow(&self, user_id: i64, username: &str) -> BlogResult<Follow> {
        let author = self.author(username).await?;
        let follow = self.store.create_follow(Follow::new(user_id, author.id)).await?;
        info!("user {} now follows {}", user_id, author.username);
        Ok(follow)
    }

    /// Returns whether a follow existed.
    pub async fn unfollow(&self, user_id: i64, username: &str) -> BlogResult<bool> {
        let author = self.author(username).await?;
        let removed = self.store.delete_follow(Follow::new(user_id, author.id)).await?;
        if removed {
            info!("user {} unfollowed {}", user_id, author.username);
        }
        Ok(removed)
    }

    pub async fn is_following(&self, user_id: i64, username: &str) -> BlogResult<bool> {
        let author = self.author(username).await?;
        self.store.is_following(user_id, author.id).await
    }

    async fn author(&self, username: &str) -> BlogResult<User> {
        self.store
            .user_by_username(username)
            .await?
            .ok_or_else(|| BlogError::not_found(format!("user {:?}", username)))
    }
}
