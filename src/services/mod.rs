pub mod feed_cache;
pub mod feed_service;
pub mod follow_service;
pub mod pagination;
pub mod post_service;

pub use feed_cache::FeedCache;
pub use feed_service::FeedService;
pub use follow_service::FollowService;
pub use post_service::PostService;
