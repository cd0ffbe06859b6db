use std::fmt;

use serde::{Deserialize, Serialize};

pub mod api;

/// Opaque user identifier as issued by the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_string())
    }
}

/// Aggregate counts shown on a result card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
    #[serde(default)]
    pub posts: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
}

/// A user returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    pub username: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "_count", default)]
    pub counts: UserCounts,
}

impl UserSummary {
    /// Single character used when the avatar image is missing.
    pub fn avatar_initial(&self) -> char {
        self.name
            .as_deref()
            .and_then(|name| name.chars().next())
            .unwrap_or('U')
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}

/// Response body of `GET /api/users/search`
#[derive(Debug, Deserialize)]
pub struct SearchUsersResponse {
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

/// Response body of `GET /api/users/follow/check`
#[derive(Debug, Deserialize)]
pub struct FollowCheckResponse {
    #[serde(rename = "isFollowing")]
    pub is_following: bool,
}

/// Request body for follow and unfollow.
#[derive(Debug, Serialize)]
pub struct FollowRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_reads_counts_from_underscore_field() {
        let user: UserSummary = serde_json::from_value(json!({
            "id": "u1",
            "name": "Alice",
            "username": "alice1",
            "image": "https://cdn.example/a.png",
            "_count": { "posts": 4, "followers": 12, "following": 3 }
        }))
        .unwrap();

        assert_eq!(user.id, UserId::from("u1"));
        assert_eq!(user.counts.posts, 4);
        assert_eq!(user.counts.followers, 12);
        assert_eq!(user.counts.following, 3);
        assert_eq!(user.avatar_initial(), 'A');
    }

    #[test]
    fn missing_optional_fields_default() {
        let user: UserSummary =
            serde_json::from_value(json!({ "id": "u2", "username": "cleo" })).unwrap();
        assert_eq!(user.counts, UserCounts::default());
        assert_eq!(user.avatar_initial(), 'U');
        assert_eq!(user.display_name(), "cleo");
    }

    #[test]
    fn follow_request_uses_camel_case_key() {
        let id = UserId::from("u9");
        let body = serde_json::to_value(FollowRequest { user_id: &id }).unwrap();
        assert_eq!(body, json!({ "userId": "u9" }));
    }

    #[test]
    fn search_response_tolerates_missing_users() {
        let resp: SearchUsersResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.users.is_empty());
    }
}
