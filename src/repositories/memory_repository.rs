// src/repositories/memory_repository.rs - in-process store with the same rules as the SQL schema

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::sync::RwLock;

use super::BlogStore;
use crate::error::{BlogError, BlogResult};
use crate::models::post::check_image;
use crate::models::user::check_names;
use crate::models::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges,
    PostFilter, User,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: HashSet<Follow>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_user(&self, id: i64) -> BlogResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(BlogError::constraint(format!("user {} does not exist", id)))
        }
    }

    fn require_group(&self, id: Option<i64>) -> BlogResult<()> {
        match id {
            Some(id) if !self.groups.contains_key(&id) => {
                Err(BlogError::constraint(format!("group {} does not exist", id)))
            }
            _ => Ok(()),
        }
    }

    fn slug_taken(&self, slug: &str, except: Option<i64>) -> bool {
        self.groups
            .values()
            .any(|g| g.slug == slug && Some(g.id) != except)
    }

    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(id) => post.group_id == Some(id),
            PostFilter::Author(id) => post.author_id == id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .contains(&Follow::new(user_id, post.author_id)),
        }
    }

    fn remove_post(&mut self, id: i64) -> bool {
        let removed = self.posts.remove(&id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != id);
        }
        removed
    }
}

/// Keeps every table behind one lock, so each call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> BlogResult<User> {
        user.validate()?;
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(BlogError::constraint(format!(
                "username {:?} is taken",
                user.username
            )));
        }
        let id = t.allocate_id();
        let row = User {
            id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        };
        t.users.insert(id, row.clone());
        Ok(row)
    }

    async fn user_by_id(&self, id: i64) -> BlogResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> BlogResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, id: i64, first_name: &str, last_name: &str) -> BlogResult<Option<User>> {
        check_names(first_name, last_name)?;
        let mut t = self.tables.write().await;
        Ok(t.users.get_mut(&id).map(|u| {
            u.first_name = first_name.to_string();
            u.last_name = last_name.to_string();
            u.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> BlogResult<bool> {
        let mut t = self.tables.write().await;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i64> = t
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            t.remove_post(post_id);
        }
        t.comments.retain(|_, c| c.author_id != id);
        t.follows.retain(|f| f.user_id != id && f.author_id != id);
        debug!("memory store: deleted user {} with dependents", id);
        Ok(true)
    }

    async fn create_group(&self, group: NewGroup) -> BlogResult<Group> {
        group.validate()?;
        let mut t = self.tables.write().await;
        if t.slug_taken(&group.slug, None) {
            return Err(BlogError::constraint(format!("slug {:?} is taken", group.slug)));
        }
        let id = t.allocate_id();
        let row = Group {
            id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        t.groups.insert(id, row.clone());
        Ok(row)
    }

    async fn group_by_id(&self, id: i64) -> BlogResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn group_by_slug(&self, slug: &str) -> BlogResult<Option<Group>> {
        let t = self.tables.read().await;
        Ok(t.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list_groups(&self) -> BlogResult<Vec<Group>> {
        let t = self.tables.read().await;
        let mut groups: Vec<Group> = t.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn update_group(&self, id: i64, group: NewGroup) -> BlogResult<Option<Group>> {
        group.validate()?;
        let mut t = self.tables.write().await;
        if !t.groups.contains_key(&id) {
            return Ok(None);
        }
        if t.slug_taken(&group.slug, Some(id)) {
            return Err(BlogError::constraint(format!("slug {:?} is taken", group.slug)));
        }
        Ok(t.groups.get_mut(&id).map(|g| {
            g.title = group.title;
            g.slug = group.slug;
            g.description = group.description;
            g.clone()
        }))
    }

    async fn delete_group(&self, id: i64) -> BlogResult<bool> {
        let mut t = self.tables.write().await;
        if t.groups.remove(&id).is_none() {
            return Ok(false);
        }
        for post in t.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(true)
    }

    async fn create_post(&self, post: NewPost) -> BlogResult<Post> {
        check_image(post.image.as_deref())?;
        let mut t = self.tables.write().await;
        t.require_user(post.author_id)?;
        t.require_group(post.group_id)?;
        let id = t.allocate_id();
        let row = Post {
            id,
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        t.posts.insert(id, row.clone());
        Ok(row)
    }

    async fn post_by_id(&self, id: i64) -> BlogResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> BlogResult<Option<Post>> {
        check_image(changes.image.as_deref())?;
        let mut t = self.tables.write().await;
        if !t.posts.contains_key(&id) {
            return Ok(None);
        }
        t.require_group(changes.group_id)?;
        Ok(t.posts.get_mut(&id).map(|p| {
            p.text = changes.text;
            p.group_id = changes.group_id;
            p.image = changes.image;
            p.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> BlogResult<bool> {
        Ok(self.tables.write().await.remove_post(id))
    }

    async fn list_posts(&self, filter: PostFilter, limit: u64, offset: u64) -> BlogResult<Vec<Post>> {
        let t = self.tables.read().await;
        let mut posts: Vec<&Post> = t.posts.values().filter(|p| t.matches(p, filter)).collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> BlogResult<u64> {
        let t = self.tables.read().await;
        Ok(t.posts.values().filter(|p| t.matches(p, filter)).count() as u64)
    }

    async fn create_comment(&self, comment: NewComment) -> BlogResult<Comment> {
        let mut t = self.tables.write().await;
        t.require_user(comment.author_id)?;
        if !t.posts.contains_key(&comment.post_id) {
            return Err(BlogError::constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        let id = t.allocate_id();
        let row = Comment {
            id,
            text: comment.text,
            created: Utc::now(),
            author_id: comment.author_id,
            post_id: comment.post_id,
        };
        t.comments.insert(id, row.clone());
        Ok(row)
    }

    async fn comments_for_post(&self, post_id: i64) -> BlogResult<Vec<Comment>> {
        let t = self.tables.read().await;
        let mut comments: Vec<Comment> = t
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn delete_comment(&self, id: i64) -> BlogResult<bool> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }

    async fn create_follow(&self, follow: Follow) -> BlogResult<Follow> {
        if follow.is_self_follow() {
            return Err(BlogError::constraint("do not selffollow"));
        }
        let mut t = self.tables.write().await;
        t.require_user(follow.user_id)?;
        t.require_user(follow.author_id)?;
        if !t.follows.insert(follow) {
            return Err(BlogError::constraint("unique followers"));
        }
        Ok(follow)
    }

    async fn delete_follow(&self, follow: Follow) -> BlogResult<bool> {
        Ok(self.tables.write().await.follows.remove(&follow))
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> BlogResult<bool> {
        let t = self.tables.read().await;
        Ok(t.follows.contains(&Follow::new(user_id, author_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, User, User) {
        let store = MemoryStore::new();
        let a = store.create_user(NewUser::new("UserTest")).await.unwrap();
        let b = store.create_user(NewUser::new("UserTest_2")).await.unwrap();
        (store, a, b)
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (store, _, _) = seeded().await;
        let err = store.create_user(NewUser::new("UserTest")).await.unwrap_err();
        assert!(matches!(err, BlogError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let store = MemoryStore::new();
        store
            .create_group(NewGroup::new("t", "any-slug", "d"))
            .await
            .unwrap();
        let err = store
            .create_group(NewGroup::new("t2", "any-slug", "d2"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn post_with_unknown_author_or_group_is_not_written() {
        let (store, a, _) = seeded().await;
        let missing_author = NewPost {
            author_id: 999,
            text: "text".into(),
            group_id: None,
            image: None,
        };
        assert!(store.create_post(missing_author).await.is_err());

        let missing_group = NewPost {
            author_id: a.id,
            text: "text".into(),
            group_id: Some(999),
            image: None,
        };
        assert!(store.create_post(missing_group).await.is_err());
        assert_eq!(store.count_posts(PostFilter::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_post_removes_its_comments() {
        let (store, a, b) = seeded().await;
        let post = store
            .create_post(NewPost {
                author_id: a.id,
                text: "text".into(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        store
            .create_comment(NewComment {
                post_id: post.id,
                author_id: b.id,
                text: "nice".into(),
            })
            .await
            .unwrap();

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(store.comments_for_post(post.id).await.unwrap().is_empty());
        assert!(!store.delete_post(post.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_user_drops_follow_edges_both_ways() {
        let (store, a, b) = seeded().await;
        store.create_follow(Follow::new(a.id, b.id)).await.unwrap();
        store.create_follow(Follow::new(b.id, a.id)).await.unwrap();

        store.delete_user(b.id).await.unwrap();
        assert!(!store.is_following(a.id, b.id).await.unwrap());
        assert!(!store.is_following(b.id, a.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_commenter_keeps_the_post_but_drops_their_comments() {
        let (store, a, b) = seeded().await;
        let post = store
            .create_post(NewPost {
                author_id: a.id,
                text: "text".into(),
                group_id: None,
                image: None,
            })
            .await
            .unwrap();
        store
            .create_comment(NewComment {
                post_id: post.id,
                author_id: b.id,
                text: "from b".into(),
            })
            .await
            .unwrap();

        assert!(store.delete_user(b.id).await.unwrap());
        assert!(store.comments_for_post(post.id).await.unwrap().is_empty());
        assert_eq!(store.post_by_id(post.id).await.unwrap(), Some(post));
    }

    #[tokio::test]
    async fn overlong_columns_are_rejected() {
        let (store, a, _) = seeded().await;
        let err = store
            .update_user(a.id, &"n".repeat(151), "")
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::ConstraintViolation(_)));

        let err = store
            .create_post(NewPost {
                author_id: a.id,
                text: "text".into(),
                group_id: None,
                image: Some("i".repeat(101)),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::ConstraintViolation(_)));
        assert_eq!(store.count_posts(PostFilter::All).await.unwrap(), 0);
    }
}
