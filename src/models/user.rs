use serde::{Deserialize, Serialize};

use crate::error::{BlogError, BlogResult};

const MAX_USERNAME_LEN: usize = 150;
const MAX_NAME_LEN: usize = 150;

/// Row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// "First Last", or the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Insert payload for `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn validate(&self) -> BlogResult<()> {
        let name = self.username.trim();
        if name.is_empty() {
            return Err(BlogError::constraint("username is required"));
        }
        if name.chars().count() > MAX_USERNAME_LEN {
            return Err(BlogError::constraint(format!(
                "username must be at most {} characters",
                MAX_USERNAME_LEN
            )));
        }
        check_names(&self.first_name, &self.last_name)
    }
}

/// First and last name may be blank but not longer than the column.
pub fn check_names(first_name: &str, last_name: &str) -> BlogResult<()> {
    for (field, value) in [("first_name", first_name), ("last_name", last_name)] {
        if value.chars().count() > MAX_NAME_LEN {
            return Err(BlogError::constraint(format!(
                "{} must be at most {} characters",
                field, MAX_NAME_LEN
            )));
        }
    }
    Ok(())
}

/// Claims carried by the bearer token; `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: u64,
    pub iat: Option<u64>,
    pub username: Option<String>,
}
