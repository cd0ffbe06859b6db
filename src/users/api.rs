use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::{
    config::settings::Settings,
    error::{ClientError, Result},
    session::Session,
    users::{FollowCheckResponse, FollowRequest, SearchUsersResponse, UserId, UserSummary},
};

const SEARCH_PATH: &str = "/api/users/search";
const FOLLOW_PATH: &str = "/api/users/follow";
const FOLLOW_CHECK_PATH: &str = "/api/users/follow/check";

/// The REST surface the search page consumes.
#[async_trait]
pub trait UsersApi: Send + Sync + 'static {
    /// GET /api/users/search?q=
    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>>;

    /// GET /api/users/follow/check?userId=
    async fn check_follow(&self, user_id: &UserId) -> Result<bool>;

    /// POST /api/users/follow
    async fn follow(&self, user_id: &UserId) -> Result<()>;

    /// DELETE /api/users/follow
    async fn unfollow(&self, user_id: &UserId) -> Result<()>;
}

/// `UsersApi` over HTTP.
pub struct HttpUsersApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpUsersApi {
    pub fn new(settings: &Settings, session: Option<&Session>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        reqwest::Url::parse(&settings.api_base_url)
            .map_err(|e| ClientError::Config(format!("API_BASE_URL: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: session.and_then(|s| s.token.clone()),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Maps non-2xx statuses to `ClientError::Server`.
    async fn ensure_success(resp: Response) -> Result<Response> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    async fn parse<R: DeserializeOwned>(resp: Response) -> Result<R> {
        Self::ensure_success(resp)
            .await?
            .json::<R>()
            .await
            .map_err(|e| ClientError::Decode(format!("response body: {}", e)))
    }

    async fn send_follow(&self, method: Method, user_id: &UserId) -> Result<()> {
        let resp = self
            .request(method, FOLLOW_PATH)
            .json(&FollowRequest { user_id })
            .send()
            .await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>> {
        let resp = self
            .request(Method::GET, SEARCH_PATH)
            .query(&[("q", query)])
            .send()
            .await?;
        let body: SearchUsersResponse = Self::parse(resp).await?;
        Ok(body.users)
    }

    async fn check_follow(&self, user_id: &UserId) -> Result<bool> {
        let resp = self
            .request(Method::GET, FOLLOW_CHECK_PATH)
            .query(&[("userId", user_id.as_str())])
            .send()
            .await?;
        let body: FollowCheckResponse = Self::parse(resp).await?;
        Ok(body.is_following)
    }

    async fn follow(&self, user_id: &UserId) -> Result<()> {
        self.send_follow(Method::POST, user_id).await
    }

    async fn unfollow(&self, user_id: &UserId) -> Result<()> {
        self.send_follow(Method::DELETE, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct MockState {
        following: Arc<Mutex<HashSet<String>>>,
        queries: Arc<Mutex<Vec<String>>>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "Bearer test-token")
            .unwrap_or(false)
    }

    async fn search(
        State(state): State<MockState>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let q = params.get("q").cloned().unwrap_or_default();
        state.queries.lock().unwrap().push(q.clone());
        if q == "explode" {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }
        Json(json!({
            "users": [
                { "id": "u1", "name": "Alice", "username": "alice1",
                  "_count": { "posts": 2, "followers": 5, "following": 1 } },
                { "id": "u2", "name": null, "username": "ada" }
            ]
        }))
        .into_response()
    }

    async fn check(
        State(state): State<MockState>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let id = params.get("userId").cloned().unwrap_or_default();
        let is_following = state.following.lock().unwrap().contains(&id);
        Json(json!({ "isFollowing": is_following }))
    }

    #[derive(serde::Deserialize)]
    struct Body {
        #[serde(rename = "userId")]
        user_id: String,
    }

    async fn follow(
        State(state): State<MockState>,
        headers: HeaderMap,
        Json(body): Json<Body>,
    ) -> StatusCode {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED;
        }
        state.following.lock().unwrap().insert(body.user_id);
        StatusCode::CREATED
    }

    async fn unfollow(
        State(state): State<MockState>,
        headers: HeaderMap,
        Json(body): Json<Body>,
    ) -> StatusCode {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED;
        }
        state.following.lock().unwrap().remove(&body.user_id);
        StatusCode::NO_CONTENT
    }

    async fn start_mock_server() -> (String, MockState) {
        let state = MockState::default();
        let app = Router::new()
            .route("/api/users/search", get(search))
            .route("/api/users/follow/check", get(check))
            .route(
                "/api/users/follow",
                axum::routing::post(follow).delete(unfollow),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), state)
    }

    fn api_for(base_url: &str, token: Option<&str>) -> HttpUsersApi {
        let settings = Settings {
            api_base_url: base_url.to_string(),
            ..Settings::default()
        };
        let session = Session {
            user_id: UserId::from("u0"),
            token: token.map(str::to_string),
        };
        HttpUsersApi::new(&settings, Some(&session)).unwrap()
    }

    #[tokio::test]
    async fn search_encodes_query_and_decodes_users() {
        let (base_url, state) = start_mock_server().await;
        let api = api_for(&base_url, None);

        let users = api.search_users("ada & alice").await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice1");
        assert_eq!(users[0].counts.followers, 5);
        assert_eq!(users[1].name, None);

        let seen = state.queries.lock().unwrap().clone();
        assert_eq!(seen, vec!["ada & alice".to_string()]);
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let (base_url, _state) = start_mock_server().await;
        let api = api_for(&base_url, None);

        let err = api.search_users("explode").await.unwrap_err();
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Server error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn follow_then_check_then_unfollow() {
        let (base_url, _state) = start_mock_server().await;
        let api = api_for(&base_url, Some("test-token"));
        let target = UserId::from("u1");

        assert!(!api.check_follow(&target).await.unwrap());
        api.follow(&target).await.unwrap();
        assert!(api.check_follow(&target).await.unwrap());
        api.unfollow(&target).await.unwrap();
        assert!(!api.check_follow(&target).await.unwrap());
    }

    #[tokio::test]
    async fn follow_without_token_is_rejected() {
        let (base_url, _state) = start_mock_server().await;
        let api = api_for(&base_url, None);

        let err = api.follow(&UserId::from("u1")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let api = api_for("http://127.0.0.1:9", None);
        let err = api.search_users("alice").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)), "got: {:?}", err);
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let settings = Settings {
            api_base_url: "not a url".to_string(),
            ..Settings::default()
        };
        let err = HttpUsersApi::new(&settings, None).err().unwrap();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
