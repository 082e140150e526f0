pub mod memory_repository;
pub mod postgres_repository;

use async_trait::async_trait;

use crate::error::BlogResult;
use crate::models::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges,
    PostFilter, User,
};

pub use memory_repository::MemoryStore;
pub use postgres_repository::PgStore;

/// Persistence boundary for every entity.
///
/// Implementations enforce the relational invariants themselves: unique
/// usernames and slugs, one follow per (user, author) pair, no self-follow,
/// and existing targets for every foreign key. Breaches fail with
/// `BlogError::ConstraintViolation` and leave nothing written.
///
/// Deletes cascade: a user takes their posts, comments and follows along; a
/// post takes its comments; a group only detaches its posts.
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> BlogResult<User>;
    async fn user_by_id(&self, id: i64) -> BlogResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> BlogResult<Option<User>>;
    async fn update_user(&self, id: i64, first_name: &str, last_name: &str) -> BlogResult<Option<User>>;
    /// Returns false when no such user existed.
    async fn delete_user(&self, id: i64) -> BlogResult<bool>;

    async fn create_group(&self, group: NewGroup) -> BlogResult<Group>;
    async fn group_by_id(&self, id: i64) -> BlogResult<Option<Group>>;
    async fn group_by_slug(&self, slug: &str) -> BlogResult<Option<Group>>;
    async fn list_groups(&self) -> BlogResult<Vec<Group>>;
    async fn update_group(&self, id: i64, group: NewGroup) -> BlogResult<Option<Group>>;
    async fn delete_group(&self, id: i64) -> BlogResult<bool>;

    async fn create_post(&self, post: NewPost) -> BlogResult<Post>;
    async fn post_by_id(&self, id: i64) -> BlogResult<Option<Post>>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> BlogResult<Option<Post>>;
    async fn delete_post(&self, id: i64) -> BlogResult<bool>;
    /// Newest first, ties broken by descending id.
    async fn list_posts(&self, filter: PostFilter, limit: u64, offset: u64) -> BlogResult<Vec<Post>>;
    async fn count_posts(&self, filter: PostFilter) -> BlogResult<u64>;

    async fn create_comment(&self, comment: NewComment) -> BlogResult<Comment>;
    /// Newest first.
    async fn comments_for_post(&self, post_id: i64) -> BlogResult<Vec<Comment>>;
    async fn delete_comment(&self, id: i64) -> BlogResult<bool>;

    async fn create_follow(&self, follow: Follow) -> BlogResult<Follow>;
    /// Returns whether a row was removed.
    async fn delete_follow(&self, follow: Follow) -> BlogResult<bool>;
    async fn is_following(&self, user_id: i64, author_id: i64) -> BlogResult<bool>;
}
