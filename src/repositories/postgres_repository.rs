// src/repositories/postgres_repository.rs - BlogStore over deadpool-postgres

use async_trait::async_trait;
use deadpool_postgres::Pool;
use log::info;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use super::BlogStore;
use crate::error::BlogResult;
use crate::models::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges,
    PostFilter, User,
};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const POST_COLUMNS: &str = "id, text, pub_date, author_id, group_id, image";
const COMMENT_COLUMNS: &str = "id, text, created, author_id, post_id";

/// Constraint checks are left to the schema; driver errors are mapped by
/// SQLSTATE in `From<tokio_postgres::Error> for BlogError`.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema. Safe to run on every start.
    pub async fn migrate(&self) -> BlogResult<()> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        info!("database schema is up to date");
        Ok(())
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
    }
}

fn group_from_row(row: &Row) -> Group {
    Group {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
    }
}

fn post_from_row(row: &Row) -> Post {
    Post {
        id: row.get("id"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        author_id: row.get("author_id"),
        group_id: row.get("group_id"),
        image: row.get("image"),
    }
}

fn comment_from_row(row: &Row) -> Comment {
    Comment {
        id: row.get("id"),
        text: row.get("text"),
        created: row.get("created"),
        author_id: row.get("author_id"),
        post_id: row.get("post_id"),
    }
}

/// WHERE clause for a feed filter; `$1` is the filter's id when present.
fn filter_clause(filter: &PostFilter) -> (&'static str, Option<i64>) {
    match *filter {
        PostFilter::All => ("", None),
        PostFilter::Group(id) => ("WHERE group_id = $1", Some(id)),
        PostFilter::Author(id) => ("WHERE author_id = $1", Some(id)),
        PostFilter::FollowedBy(id) => (
            "WHERE author_id IN (SELECT author_id FROM follows WHERE user_id = $1)",
            Some(id),
        ),
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn create_user(&self, user: NewUser) -> BlogResult<User> {
        user.validate()?;
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO users (username, first_name, last_name) VALUES ($1, $2, $3)
                 RETURNING id, username, first_name, last_name",
                &[&user.username, &user.first_name, &user.last_name],
            )
            .await?;
        Ok(user_from_row(&row))
    }

    async fn user_by_id(&self, id: i64) -> BlogResult<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, username, first_name, last_name FROM users WHERE id = $1",
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn user_by_username(&self, username: &str) -> BlogResult<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, username, first_name, last_name FROM users WHERE username = $1",
                &[&username],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_user(&self, id: i64, first_name: &str, last_name: &str) -> BlogResult<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE users SET first_name = $2, last_name = $3 WHERE id = $1
                 RETURNING id, username, first_name, last_name",
                &[&id, &first_name, &last_name],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn delete_user(&self, id: i64) -> BlogResult<bool> {
        let client = self.pool.get().await?;
        let affected = client
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await?;
        Ok(affected > 0)
    }

    async fn create_group(&self, group: NewGroup) -> BlogResult<Group> {
        group.validate()?;
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO groups (title, slug, description) VALUES ($1, $2, $3)
                 RETURNING id, title, slug, description",
                &[&group.title, &group.slug, &group.description],
            )
            .await?;
        Ok(group_from_row(&row))
    }

    async fn group_by_id(&self, id: i64) -> BlogResult<Option<Group>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, title, slug, description FROM groups WHERE id = $1",
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn group_by_slug(&self, slug: &str) -> BlogResult<Option<Group>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, title, slug, description FROM groups WHERE slug = $1",
                &[&slug],
            )
            .await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn list_groups(&self) -> BlogResult<Vec<Group>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, title, slug, description FROM groups ORDER BY title, id",
                &[],
            )
            .await?;
        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn update_group(&self, id: i64, group: NewGroup) -> BlogResult<Option<Group>> {
        group.validate()?;
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE groups SET title = $2, slug = $3, description = $4 WHERE id = $1
                 RETURNING id, title, slug, description",
                &[&id, &group.title, &group.slug, &group.description],
            )
            .await?;
        Ok(row.as_ref().map(group_from_row))
    }

    async fn delete_group(&self, id: i64) -> BlogResult<bool> {
        let client = self.pool.get().await?;
        let affected = client
            .execute("DELETE FROM groups WHERE id = $1", &[&id])
            .await?;
        Ok(affected > 0)
    }

    async fn create_post(&self, post: NewPost) -> BlogResult<Post> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO posts (text, author_id, group_id, image) VALUES ($1, $2, $3, $4)
             RETURNING {}",
            POST_COLUMNS
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[&post.text, &post.author_id, &post.group_id, &post.image],
            )
            .await?;
        Ok(post_from_row(&row))
    }

    async fn post_by_id(&self, id: i64) -> BlogResult<Option<Post>> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> BlogResult<Option<Post>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE posts SET text = $2, group_id = $3, image = $4 WHERE id = $1
             RETURNING {}",
            POST_COLUMNS
        );
        let row = client
            .query_opt(
                sql.as_str(),
                &[&id, &changes.text, &changes.group_id, &changes.image],
            )
            .await?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn delete_post(&self, id: i64) -> BlogResult<bool> {
        let client = self.pool.get().await?;
        let affected = client
            .execute("DELETE FROM posts WHERE id = $1", &[&id])
            .await?;
        Ok(affected > 0)
    }

    async fn list_posts(&self, filter: PostFilter, limit: u64, offset: u64) -> BlogResult<Vec<Post>> {
        let client = self.pool.get().await?;
        let (clause, id) = filter_clause(&filter);
        let limit = limit as i64;
        let offset = offset as i64;
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(3);
        if let Some(ref id) = id {
            params.push(id);
        }
        let n = params.len();
        let sql = format!(
            "SELECT {} FROM posts {} ORDER BY pub_date DESC, id DESC LIMIT ${} OFFSET ${}",
            POST_COLUMNS,
            clause,
            n + 1,
            n + 2
        );
        params.push(&limit);
        params.push(&offset);
        let rows = client.query(sql.as_str(), &params).await?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> BlogResult<u64> {
        let client = self.pool.get().await?;
        let (clause, id) = filter_clause(&filter);
        let sql = format!("SELECT COUNT(*) FROM posts {}", clause);
        let row = match id {
            Some(id) => client.query_one(sql.as_str(), &[&id]).await?,
            None => client.query_one(sql.as_str(), &[]).await?,
        };
        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }

    async fn create_comment(&self, comment: NewComment) -> BlogResult<Comment> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO comments (text, author_id, post_id) VALUES ($1, $2, $3)
             RETURNING {}",
            COMMENT_COLUMNS
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[&comment.text, &comment.author_id, &comment.post_id],
            )
            .await?;
        Ok(comment_from_row(&row))
    }

    async fn comments_for_post(&self, post_id: i64) -> BlogResult<Vec<Comment>> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM comments WHERE post_id = $1 ORDER BY created DESC, id DESC",
            COMMENT_COLUMNS
        );
        let rows = client.query(sql.as_str(), &[&post_id]).await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn delete_comment(&self, id: i64) -> BlogResult<bool> {
        let client = self.pool.get().await?;
        let affected = client
            .execute("DELETE FROM comments WHERE id = $1", &[&id])
            .await?;
        Ok(affected > 0)
    }

    async fn create_follow(&self, follow: Follow) -> BlogResult<Follow> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO follows (user_id, author_id) VALUES ($1, $2)",
                &[&follow.user_id, &follow.author_id],
            )
            .await?;
        Ok(follow)
    }

    async fn delete_follow(&self, follow: Follow) -> BlogResult<bool> {
        let client = self.pool.get().await?;
        let affected = client
            .execute(
                "DELETE FROM follows WHERE user_id = $1 AND author_id = $2",
                &[&follow.user_id, &follow.author_id],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> BlogResult<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
                &[&user_id, &author_id],
            )
            .await?;
        Ok(row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn followed_filter_selects_through_follows() {
        let (clause, id) = filter_clause(&PostFilter::FollowedBy(7));
        assert!(clause.contains("FROM follows WHERE user_id = $1"));
        assert_eq!(id, Some(7));
        assert_eq!(filter_clause(&PostFilter::All), ("", None));
    }

    #[test]
    fn schema_declares_follow_constraints() {
        assert!(SCHEMA.contains("CONSTRAINT \"unique followers\" UNIQUE (user_id, author_id)"));
        assert!(SCHEMA.contains("CHECK (user_id <> author_id)"));
        assert!(SCHEMA.contains("REFERENCES groups (id) ON DELETE SET NULL"));
    }
}
