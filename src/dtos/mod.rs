pub mod feed_dtos;
pub mod post_dtos;
// short paths: `crate::dtos::feed` and `crate::dtos::post`
pub use feed_dtos as feed;
pub use post_dtos as post;
