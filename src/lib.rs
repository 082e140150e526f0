pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;

use crate::error::BlogError;
use crate::repositories::BlogStore;
use crate::services::{FeedCache, FeedService, FollowService, PostService};

/// Shared by every worker through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub feed: FeedService,
    pub posts: PostService,
    pub follows: FollowService,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, jwt_secret: impl Into<String>, cache_ttl: Duration) -> Self {
        let cache = Arc::new(FeedCache::new(cache_ttl));
        Self {
            feed: FeedService::new(store.clone(), cache.clone()),
            posts: PostService::new(store.clone(), cache),
            follows: FollowService::new(store.clone()),
            store,
            jwt_secret: jwt_secret.into(),
        }
    }
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use crate::handlers::{follow_handlers, group_handlers, post_handlers};

    // malformed bodies get the same JSON error envelope as every other failure
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| BlogError::InvalidInput(err.to_string()).into());

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .service(post_handlers::list_posts) // GET /api/posts
            .service(post_handlers::create_post) // POST /api/posts
            .service(post_handlers::post_detail) // GET /api/posts/{id}
            .service(post_handlers::edit_post) // PUT /api/posts/{id}
            .service(post_handlers::delete_post) // DELETE /api/posts/{id}
            .service(post_handlers::add_comment) // POST /api/posts/{id}/comments
            .service(group_handlers::list_groups) // GET /api/groups
            .service(group_handlers::group_posts) // GET /api/groups/{slug}
            .service(follow_handlers::profile) // GET /api/profile/{username}
            .service(follow_handlers::profile_follow) // POST /api/profile/{username}/follow
            .service(follow_handlers::profile_unfollow) // POST /api/profile/{username}/unfollow
            .service(follow_handlers::follow_index), // GET /api/follow
    );
}
