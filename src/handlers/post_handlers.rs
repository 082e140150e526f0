// src/handlers/post_handlers.rs - feed, post detail, post and comment writes

use actix_web::{HttpResponse, delete, get, post, put, web};
use log::debug;

use crate::AppState;
use crate::dtos::feed::PageQuery;
use crate::dtos::post::{CommentForm, CommentOut, PostForm, PostOut};
use crate::error::{BlogError, BlogResult};
use crate::handlers::{created, success};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::Post;
use crate::services::feed_service::present_posts;

#[get("/posts")]
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> BlogResult<HttpResponse> {
    let page = state.feed.global_feed(query.number()).await?;
    debug!("global feed page {}: {} posts", page.number, page.len());
    Ok(success("Posts retrieved successfully", page))
}

#[post("/posts")]
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PostForm>,
) -> BlogResult<HttpResponse> {
    let post = state.posts.create_post(user.user_id, body.into_inner()).await?;
    let out = single(&state, post).await?;
    Ok(created("Post created successfully", out))
}

#[get("/posts/{post_id}")]
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> BlogResult<HttpResponse> {
    let detail = state.feed.post_detail(path.into_inner()).await?;
    Ok(success("Post retrieved successfully", detail))
}

#[put("/posts/{post_id}")]
pub async fn edit_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<PostForm>,
) -> BlogResult<HttpResponse> {
    let post = state
        .posts
        .edit_post(path.into_inner(), user.user_id, body.into_inner())
        .await?;
    let out = single(&state, post).await?;
    Ok(success("Post updated successfully", out))
}

#[delete("/posts/{post_id}")]
pub async fn delete_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> BlogResult<HttpResponse> {
    let post_id = path.into_inner();
    state.posts.delete_post(post_id, user.user_id).await?;
    Ok(success("Post deleted successfully", post_id))
}

#[post("/posts/{post_id}/comments")]
pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<CommentForm>,
) -> BlogResult<HttpResponse> {
    let comment = state
        .posts
        .create_comment(path.into_inner(), user.user_id, body.into_inner())
        .await?;
    let author = state
        .store
        .user_by_id(comment.author_id)
        .await?
        .ok_or_else(|| BlogError::not_found(format!("user {}", comment.author_id)))?;
    Ok(created("Comment added successfully", CommentOut::build(&comment, &author)))
}

async fn single(state: &AppState, post: Post) -> BlogResult<PostOut> {
    let mut out = present_posts(state.store.as_ref(), std::slice::from_ref(&post)).await?;
    out.pop()
        .ok_or_else(|| BlogError::Storage("post could not be presented".into()))
}
