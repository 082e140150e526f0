// src/handlers/follow_handlers.rs - author profiles, follow/unfollow, followed feed

use actix_web::{HttpResponse, get, post, web};

use crate::AppState;
use crate::dtos::feed::PageQuery;
use crate::error::BlogResult;
use crate::handlers::success;
use crate::middleware::auth_extractor::AuthenticatedUser;

/// GET /api/profile/{username}?page=N
/// Author's posts with post count; `following` is set for logged-in callers.
#[get("/profile/{username}")]
pub async fn profile(
    state: web::Data<AppState>,
    user: Option<AuthenticatedUser>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> BlogResult<HttpResponse> {
    let viewer = user.map(|u| u.user_id);
    let feed = state.feed.author_feed(&path, query.number(), viewer).await?;
    Ok(success("Profile retrieved successfully", feed))
}

#[post("/profile/{username}/follow")]
pub async fn profile_follow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> BlogResult<HttpResponse> {
    let follow = state.follows.follow(user.user_id, &path).await?;
    Ok(success("Followed successfully", follow))
}

#[post("/profile/{username}/unfollow")]
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> BlogResult<HttpResponse> {
    let removed = state.follows.unfollow(user.user_id, &path).await?;
    let message = if removed {
        "Unfollowed successfully"
    } else {
        "Not following this author"
    };
    Ok(success(message, removed))
}

/// GET /api/follow?page=N
#[get("/follow")]
pub async fn follow_index(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> BlogResult<HttpResponse> {
    let page = state.feed.followed_feed(user.user_id, query.number()).await?;
    Ok(success("Followed posts retrieved successfully", page))
}
