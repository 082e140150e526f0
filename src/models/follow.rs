use serde::Serialize;

/// Directed edge: `user_id` follows `author_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Follow {
    pub user_id: i64,
    pub author_id: i64,
}

impl Follow {
    pub fn new(user_id: i64, author_id: i64) -> Self {
        Self { user_id, author_id }
    }

    pub fn is_self_follow(&self) -> bool {
        self.user_id == self.author_id
    }
}
