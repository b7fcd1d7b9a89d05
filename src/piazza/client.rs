use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::constants::CLIENT_USER_AGENT;
use crate::piazza::models::{FeedItem, FeedResult, RawPost, RpcResponse};
use crate::piazza::{PiazzaError, PostSource};

const SESSION_COOKIE: &str = "session_id";

/// Session-holding client for one Piazza course network.
///
/// Construct one per process and pass it to whatever needs it; the session
/// cookie lives in the client's own jar.
#[derive(Debug, Clone)]
pub struct PiazzaClient {
    client: Client,
    jar: Arc<Jar>,
    api_url: Url,
    network_id: String,
}

impl PiazzaClient {
    /// Build a client from configuration. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &Config) -> Result<Self, PiazzaError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(CLIENT_USER_AGENT)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        let api_url = Url::parse(&config.base_url)?.join("/logic/api")?;

        Ok(Self {
            client,
            jar,
            api_url,
            network_id: config.network_id.clone(),
        })
    }

    #[must_use]
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Log in with account credentials and keep the session for later calls.
    ///
    /// # Errors
    ///
    /// Returns [`PiazzaError::Login`] if the platform rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), PiazzaError> {
        let response: RpcResponse<Value> = self
            .rpc("user.login", json!({ "email": email, "pass": password }))
            .await?;

        match response.into_result() {
            Ok(_) => {
                info!(email = %email, "Logged in to Piazza");
                Ok(())
            }
            Err(message) => Err(PiazzaError::Login(message)),
        }
    }

    /// Post an instructor answer to a question.
    ///
    /// `revision` is the answer revision number the platform expects next.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the platform rejects it.
    pub async fn post_instructor_answer(
        &self,
        cid: &str,
        content: &str,
        revision: u32,
    ) -> Result<Value, PiazzaError> {
        self.call(
            "content.answer",
            json!({
                "cid": cid,
                "type": "i_answer",
                "content": content,
                "revision": revision,
                "anonymous": "no",
            }),
        )
        .await
    }

    /// Call an RPC method and unwrap its `result`.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, PiazzaError> {
        let response: RpcResponse<T> = self.rpc(method, params).await?;
        response
            .into_result()
            .map_err(|message| PiazzaError::UpstreamFeed {
                method: method.to_string(),
                message,
            })
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<RpcResponse<T>, PiazzaError> {
        let mut url = self.api_url.clone();
        url.query_pairs_mut().append_pair("method", method);

        let mut request = self
            .client
            .post(url)
            .json(&json!({ "method": method, "params": params }));
        if let Some(token) = self.csrf_token() {
            request = request.header("CSRF-Token", token);
        }

        debug!(method = %method, "Calling Piazza RPC");
        let body = request.send().await?.error_for_status()?.bytes().await?;

        serde_json::from_slice(&body).map_err(|source| PiazzaError::Decode {
            method: method.to_string(),
            source,
        })
    }

    /// Session id echoed back as the CSRF token, once logged in.
    fn csrf_token(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.api_url)?;
        let cookies = cookies.to_str().ok()?;
        session_id_from_cookies(cookies)
    }
}

fn session_id_from_cookies(header: &str) -> Option<String> {
    header.split(';').find_map(|cookie| {
        cookie
            .trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .map(ToString::to_string)
    })
}

#[async_trait]
impl PostSource for PiazzaClient {
    async fn unresolved_feed(&self) -> Result<Vec<FeedItem>, PiazzaError> {
        let result: FeedResult = self
            .call(
                "network.filter_feed",
                json!({ "nid": self.network_id, "unresolved": 1 }),
            )
            .await?;
        Ok(result.feed)
    }

    async fn feed(&self, limit: u32) -> Result<Vec<FeedItem>, PiazzaError> {
        let result: FeedResult = self
            .call(
                "network.get_my_feed",
                json!({ "nid": self.network_id, "limit": limit, "offset": 0, "sort": "updated" }),
            )
            .await?;
        Ok(result.feed)
    }

    async fn fetch_post(&self, cid: &str) -> Result<RawPost, PiazzaError> {
        self.call("content.get", json!({ "cid": cid, "nid": self.network_id }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_cookies() {
        assert_eq!(
            session_id_from_cookies("last_piaz_user=x; session_id=abc123; other=1"),
            Some("abc123".to_string())
        );
        assert_eq!(
            session_id_from_cookies("session_id=only"),
            Some("only".to_string())
        );
        assert_eq!(session_id_from_cookies("session_idx=nope; a=b"), None);
        assert_eq!(session_id_from_cookies(""), None);
    }

    #[test]
    fn test_api_url_is_under_base() {
        let client = PiazzaClient::new(&Config {
            base_url: "http://127.0.0.1:9999".to_string(),
            ..Config::for_testing()
        })
        .unwrap();
        assert_eq!(client.api_url.as_str(), "http://127.0.0.1:9999/logic/api");
        assert_eq!(client.network_id(), "test-network");
    }
}
