use actix_web::{HttpResponse, get, web};

use crate::AppState;
use crate::dtos::feed::PageQuery;
use crate::error::BlogResult;
use crate::handlers::success;

#[get("/groups")]
pub async fn list_groups(state: web::Data<AppState>) -> BlogResult<HttpResponse> {
    let groups = state.feed.list_groups().await?;
    Ok(success("Groups retrieved successfully", groups))
}

/// GET /api/groups/{slug}?page=N
#[get("/groups/{slug}")]
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> BlogResult<HttpResponse> {
    let feed = state.feed.group_feed(&path, query.number()).await?;
    Ok(success("Group posts retrieved successfully", feed))
}
