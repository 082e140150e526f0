// src/services/feed_service.rs - paginated post listings

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::dtos::feed::{AuthorFeedOut, GroupFeedOut, PostDetailOut};
use crate::dtos::post::{AuthorOut, CommentOut, PostOut};
use crate::error::{BlogError, BlogResult};
use crate::models::{Group, Post, PostFilter, User};
use crate::repositories::BlogStore;
use crate::services::feed_cache::FeedCache;
use crate::services::pagination::{Page, PageRequest};

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn BlogStore>,
    cache: Arc<FeedCache>,
}

impl FeedService {
    pub fn new(store: Arc<dyn BlogStore>, cache: Arc<FeedCache>) -> Self {
        Self { store, cache }
    }

    /// Every post, newest first. Pages are served from the feed cache.
    pub async fn global_feed(&self, page: i64) -> BlogResult<Page<PostOut>> {
        let request = PageRequest::new(page);
        if let Some(cached) = self.cache.get(request.number).await {
            debug!("global feed page {} served from cache", request.number);
            return Ok(cached);
        }
        let generation = self.cache.generation().await;
        let page = self.paginate(PostFilter::All, request).await?;
        self.cache.put(request.number, page.clone(), generation).await;
        Ok(page)
    }

    pub async fn group_feed(&self, slug: &str, page: i64) -> BlogResult<GroupFeedOut> {
        let group = self
            .store
            .group_by_slug(slug)
            .await?
            .ok_or_else(|| BlogError::not_found(format!("group {:?}", slug)))?;
        let page = self
            .paginate(PostFilter::Group(group.id), PageRequest::new(page))
            .await?;
        Ok(GroupFeedOut { group, page })
    }

    /// Posts of one author plus their total post count. `viewer` only
    /// affects the `following` flag.
    pub async fn author_feed(
        &self,
        username: &str,
        page: i64,
        viewer: Option<i64>,
    ) -> BlogResult<AuthorFeedOut> {
        let author = self
            .store
            .user_by_username(username)
            .await?
            .ok_or_else(|| BlogError::not_found(format!("user {:?}", username)))?;
        let page = self
            .paginate(PostFilter::Author(author.id), PageRequest::new(page))
            .await?;
        let following = match viewer {
            Some(viewer_id) if viewer_id != author.id => {
                self.store.is_following(viewer_id, author.id).await?
            }
            _ => false,
        };
        Ok(AuthorFeedOut {
            author: AuthorOut::from(&author),
            post_count: page.total_items,
            following,
            page,
        })
    }

    /// Posts by everyone `viewer_id` follows; empty when they follow no one.
    pub async fn followed_feed(&self, viewer_id: i64, page: i64) -> BlogResult<Page<PostOut>> {
        self.paginate(PostFilter::FollowedBy(viewer_id), PageRequest::new(page))
            .await
    }

    pub async fn post_detail(&self, post_id: i64) -> BlogResult<PostDetailOut> {
        let post = self
            .store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| BlogError::not_found(format!("post {}", post_id)))?;
        let author_post_count = self
            .store
            .count_posts(PostFilter::Author(post.author_id))
            .await?;

        let mut lookup = Lookup::new(self.store.as_ref());
        let post_out = lookup.post_out(&post).await?;
        let mut comments = Vec::new();
        for comment in self.store.comments_for_post(post.id).await? {
            let author = lookup.user(comment.author_id).await?;
            comments.push(CommentOut::build(&comment, &author));
        }
        Ok(PostDetailOut {
            post: post_out,
            author_post_count,
            comments,
        })
    }

    pub async fn list_groups(&self) -> BlogResult<Vec<Group>> {
        self.store.list_groups().await
    }

    async fn paginate(&self, filter: PostFilter, request: PageRequest) -> BlogResult<Page<PostOut>> {
        let total = self.store.count_posts(filter).await?;
        let posts = if request.offset() >= total {
            Vec::new()
        } else {
            self.store
                .list_posts(filter, request.limit(), request.offset())
                .await?
        };
        let items = present_posts(self.store.as_ref(), &posts).await?;
        Ok(request.into_page(items, total))
    }
}

/// Resolves authors and groups for a batch of posts.
pub async fn present_posts(store: &dyn BlogStore, posts: &[Post]) -> BlogResult<Vec<PostOut>> {
    let mut lookup = Lookup::new(store);
    let mut out = Vec::with_capacity(posts.len());
    for post in posts {
        out.push(lookup.post_out(post).await?);
    }
    Ok(out)
}

/// Per-request memo of users and groups already fetched.
struct Lookup<'a> {
    store: &'a dyn BlogStore,
    users: HashMap<i64, User>,
    groups: HashMap<i64, Group>,
}

impl<'a> Lookup<'a> {
    fn new(store: &'a dyn BlogStore) -> Self {
        Self {
            store,
            users: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    async fn user(&mut self, id: i64) -> BlogResult<User> {
        if let Some(user) = self.users.get(&id) {
            return Ok(user.clone());
        }
        let user = self
            .store
            .user_by_id(id)
            .await?
            .ok_or_else(|| BlogError::not_found(format!("user {}", id)))?;
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn group(&mut self, id: i64) -> BlogResult<Option<Group>> {
        if let Some(group) = self.groups.get(&id) {
            return Ok(Some(group.clone()));
        }
        let group = self.store.group_by_id(id).await?;
        if let Some(ref g) = group {
            self.groups.insert(id, g.clone());
        }
        Ok(group)
    }

    async fn post_out(&mut self, post: &Post) -> BlogResult<PostOut> {
        let author = self.user(post.author_id).await?;
        let group = match post.group_id {
            Some(id) => self.group(id).await?,
            None => None,
        };
        Ok(PostOut::build(post, &author, group.as_ref()))
    }
}
