use std::sync::Arc;
use std::time::Duration;

use yatube_be::AppState;
use yatube_be::dtos::post::{CommentForm, PostForm};
use yatube_be::error::BlogError;
use yatube_be::models::{Follow, NewGroup, NewUser, PostFilter, User};
use yatube_be::repositories::{BlogStore, MemoryStore};

fn state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), "test-secret", Duration::ZERO)
}

async fn user(state: &AppState, username: &str) -> User {
    state
        .store
        .create_user(NewUser::new(username))
        .await
        .expect("create user")
}

async fn posts(state: &AppState, author: &User, n: usize) {
    for i in 0..n {
        state
            .posts
            .create_post(author.id, PostForm::new(format!("post {}", i)))
            .await
            .expect("create post");
    }
}

#[tokio::test]
async fn self_follow_is_a_constraint_violation() {
    let state = state();
    let a = user(&state, "UserTest").await;

    let err = state.follows.follow(a.id, "UserTest").await.unwrap_err();
    assert!(matches!(err, BlogError::ConstraintViolation(_)));
    assert!(!state.store.is_following(a.id, a.id).await.unwrap());
}

#[tokio::test]
async fn duplicate_follow_fails() {
    let state = state();
    let a = user(&state, "UserTest").await;
    user(&state, "UserTest_2").await;

    state.follows.follow(a.id, "UserTest_2").await.unwrap();
    let err = state.follows.follow(a.id, "UserTest_2").await.unwrap_err();
    assert!(matches!(err, BlogError::ConstraintViolation(_)));
}

#[tokio::test]
async fn follow_and_unfollow() {
    let state = state();
    let a = user(&state, "UserTest").await;
    user(&state, "UserTest_2").await;

    state.follows.follow(a.id, "UserTest_2").await.unwrap();
    assert!(state.follows.is_following(a.id, "UserTest_2").await.unwrap());

    assert!(state.follows.unfollow(a.id, "UserTest_2").await.unwrap());
    assert!(!state.follows.is_following(a.id, "UserTest_2").await.unwrap());
    assert!(!state.follows.unfollow(a.id, "UserTest_2").await.unwrap());

    let err = state.follows.follow(a.id, "nobody").await.unwrap_err();
    assert!(matches!(err, BlogError::NotFound(_)));
}

#[tokio::test]
async fn blank_post_is_not_persisted() {
    let state = state();
    let a = user(&state, "UserTest").await;

    for text in ["", "   "] {
        let err = state
            .posts
            .create_post(a.id, PostForm::new(text))
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::EmptyText));
    }
    assert_eq!(state.store.count_posts(PostFilter::All).await.unwrap(), 0);
}

#[tokio::test]
async fn post_with_unknown_group_is_not_found() {
    let state = state();
    let a = user(&state, "UserTest").await;

    let err = state
        .posts
        .create_post(a.id, PostForm::new("text").with_group(404))
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::NotFound(_)));
}

#[tokio::test]
async fn only_the_author_can_edit() {
    let state = state();
    let author = user(&state, "UserTest").await;
    let other = user(&state, "UserTest_2").await;
    let group = state
        .store
        .create_group(NewGroup::new("test-title", "any-slug", "test-desc"))
        .await
        .unwrap();
    let group_two = state
        .store
        .create_group(NewGroup::new("test-title-two", "any-slug-two", "test-desc-two"))
        .await
        .unwrap();
    let post = state
        .posts
        .create_post(author.id, PostForm::new("test-text").with_group(group.id))
        .await
        .unwrap();

    let attempt = PostForm::new("rewritten").with_group(group_two.id);
    let err = state
        .posts
        .edit_post(post.id, other.id, attempt.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::Forbidden(_)));

    let stored = state.store.post_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "test-text");
    assert_eq!(stored.group_id, Some(group.id));

    let edited = state.posts.edit_post(post.id, author.id, attempt).await.unwrap();
    assert_eq!(edited.text, "rewritten");
    assert_eq!(edited.group_id, Some(group_two.id));
    assert_eq!(edited.pub_date, post.pub_date);
}

#[tokio::test]
async fn edit_keeps_image_unless_replaced() {
    let state = state();
    let author = user(&state, "UserTest").await;
    let mut form = PostForm::new("with picture");
    form.image = Some("posts/small.gif".into());
    let post = state.posts.create_post(author.id, form).await.unwrap();

    let edited = state
        .posts
        .edit_post(post.id, author.id, PostForm::new("new text"))
        .await
        .unwrap();
    assert_eq!(edited.image.as_deref(), Some("posts/small.gif"));
    assert_eq!(edited.group_id, None);
}

#[tokio::test]
async fn author_feed_pages_newest_first() {
    let state = state();
    let a = user(&state, "A").await;
    posts(&state, &a, 12).await;

    let first = state.feed.author_feed("A", 1, None).await.unwrap();
    assert_eq!(first.post_count, 12);
    assert_eq!(first.page.len(), 10);
    assert_eq!(first.page.items[0].text, "post 11");
    assert_eq!(first.page.items[9].text, "post 2");

    let second = state.feed.author_feed("A", 2, None).await.unwrap();
    assert_eq!(second.page.len(), 2);
    assert_eq!(second.page.items[0].text, "post 1");
    assert_eq!(second.page.items[1].text, "post 0");

    let beyond = state.feed.author_feed("A", 3, None).await.unwrap();
    assert!(beyond.page.is_empty());

    let err = state.feed.author_feed("nobody", 1, None).await.unwrap_err();
    assert!(matches!(err, BlogError::NotFound(_)));
}

#[tokio::test]
async fn global_and_group_feeds_paginate() {
    let state = state();
    let a = user(&state, "UserTest").await;
    let group = state
        .store
        .create_group(NewGroup::new("test-title", "any-slug", "test-desc"))
        .await
        .unwrap();
    for _ in 0..13 {
        state
            .posts
            .create_post(a.id, PostForm::new("test-text").with_group(group.id))
            .await
            .unwrap();
    }
    posts(&state, &a, 1).await;

    assert_eq!(state.feed.global_feed(1).await.unwrap().len(), 10);
    assert_eq!(state.feed.global_feed(2).await.unwrap().len(), 4);

    let group_page = state.feed.group_feed("any-slug", 2).await.unwrap();
    assert_eq!(group_page.group.id, group.id);
    assert_eq!(group_page.page.len(), 3);
    assert_eq!(group_page.page.total_items, 13);

    let err = state.feed.group_feed("missing", 1).await.unwrap_err();
    assert!(matches!(err, BlogError::NotFound(_)));
}

#[tokio::test]
async fn followed_feed_only_shows_followed_authors() {
    let state = state();
    let viewer = user(&state, "V").await;
    let a = user(&state, "A").await;
    let b = user(&state, "B").await;
    posts(&state, &a, 2).await;
    posts(&state, &b, 3).await;

    assert!(state.feed.followed_feed(viewer.id, 1).await.unwrap().is_empty());

    state.follows.follow(viewer.id, "A").await.unwrap();
    let page = state.feed.followed_feed(viewer.id, 1).await.unwrap();
    assert_eq!(page.len(), 2);
    assert!(page.items.iter().all(|p| p.author.id == a.id));

    let profile = state.feed.author_feed("A", 1, Some(viewer.id)).await.unwrap();
    assert!(profile.following);
    let profile = state.feed.author_feed("B", 1, Some(viewer.id)).await.unwrap();
    assert!(!profile.following);
}

#[tokio::test]
async fn deleting_group_detaches_posts_and_deleting_author_removes_them() {
    let state = state();
    let a = user(&state, "UserTest").await;
    let group = state
        .store
        .create_group(NewGroup::new("test-title", "any-slug", "test-desc"))
        .await
        .unwrap();
    let post = state
        .posts
        .create_post(a.id, PostForm::new("test-text").with_group(group.id))
        .await
        .unwrap();

    assert!(state.store.delete_group(group.id).await.unwrap());
    let stored = state.store.post_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.group_id, None);

    assert!(state.store.delete_user(a.id).await.unwrap());
    assert!(state.store.post_by_id(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn comments_show_on_post_detail_newest_first() {
    let state = state();
    let author = user(&state, "UserTest").await;
    let reader = user(&state, "UserTest_2").await;
    let post = state
        .posts
        .create_post(author.id, PostForm::new("test-text"))
        .await
        .unwrap();

    state
        .posts
        .create_comment(post.id, reader.id, CommentForm::new("first"))
        .await
        .unwrap();
    state
        .posts
        .create_comment(post.id, reader.id, CommentForm::new("atyatya"))
        .await
        .unwrap();
    let err = state
        .posts
        .create_comment(post.id, reader.id, CommentForm::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::ConstraintViolation(_)));

    let detail = state.feed.post_detail(post.id).await.unwrap();
    assert_eq!(detail.author_post_count, 1);
    let texts: Vec<&str> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["atyatya", "first"]);
    assert_eq!(detail.comments[0].author.username, "UserTest_2");

    let err = state
        .posts
        .create_comment(9999, reader.id, CommentForm::new("lost"))
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::NotFound(_)));
}

#[tokio::test]
async fn global_feed_cache_serves_stale_page_until_write() {
    let store: Arc<dyn BlogStore> = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), "test-secret", Duration::from_secs(60));
    let a = user(&state, "UserTest").await;
    posts(&state, &a, 1).await;

    assert_eq!(state.feed.global_feed(1).await.unwrap().len(), 1);

    // Written behind the services' back: the cached page stays.
    store
        .create_post(yatube_be::models::NewPost {
            author_id: a.id,
            text: "direct".into(),
            group_id: None,
            image: None,
        })
        .await
        .unwrap();
    assert_eq!(state.feed.global_feed(1).await.unwrap().len(), 1);

    posts(&state, &a, 1).await;
    assert_eq!(state.feed.global_feed(1).await.unwrap().len(), 3);
}

#[tokio::test]
async fn self_follow_rejected_at_store_boundary() {
    let store = MemoryStore::new();
    let a = store.create_user(NewUser::new("solo")).await.unwrap();
    let err = store.create_follow(Follow::new(a.id, a.id)).await.unwrap_err();
    assert!(matches!(err, BlogError::ConstraintViolation(_)));
}
