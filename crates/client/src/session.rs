//! Homeserver client and password login.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};

use mxfixture_config::HomeserverConfig;

use crate::error::{FixtureError, FixtureResult};
use crate::messages::TxnIdGenerator;
use crate::wire::{LoginRequest, LoginResponse, PASSWORD_LOGIN};

/// An authenticated user on the homeserver.
///
/// Only [`HomeserverClient::login`] builds one, so holding a `Session` means
/// the token is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    user_id: String,
    access_token: String,
}

impl Session {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// HTTP client bound to one homeserver.
#[derive(Debug)]
pub struct HomeserverClient {
    http: Client,
    base_url: String,
    api_prefix: String,
    server_name: String,
    pub(crate) txn_ids: TxnIdGenerator,
}

impl HomeserverClient {
    pub fn new(config: &HomeserverConfig) -> FixtureResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.trim_end_matches('/').to_string(),
            server_name: config.server_name.clone(),
            txn_ids: TxnIdGenerator::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fully qualified ID of a local user, e.g. `@alice:localhost`.
    ///
    /// Anything already starting with `@` is returned untouched.
    pub fn user_id(&self, username: &str) -> String {
        let username = username.trim();
        if username.starts_with('@') {
            username.to_string()
        } else {
            format!("@{}:{}", username, self.server_name)
        }
    }

    /// Log in with the password grant.
    ///
    /// Any failure, including a reply without a usable token, is reported
    /// as [`FixtureError::Authentication`] with the raw body attached.
    pub async fn login(&self, username: &str, password: &str) -> FixtureResult<Session> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FixtureError::invalid_argument("username must not be empty"));
        }
        if password.is_empty() {
            return Err(FixtureError::invalid_argument("password must not be empty"));
        }

        let request = LoginRequest {
            kind: PASSWORD_LOGIN,
            user: username,
            password,
        };

        debug!(user = %username, "logging in");
        let response = self
            .http
            .post(self.endpoint("/login"))
            .json(&request)
            .send()
            .await
            .map_err(|error| FixtureError::Authentication {
                username: username.to_string(),
                body: error.to_string(),
            })?;

        let status = response.status();
        let body = read_body(response).await;

        let token = if status.is_success() {
            serde_json::from_str::<LoginResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.access_token)
                .filter(|token| !token.is_empty())
        } else {
            None
        };

        let Some(access_token) = token else {
            return Err(FixtureError::Authentication {
                username: username.to_string(),
                body,
            });
        };

        info!(user = %username, "logged in");
        Ok(Session {
            base_url: self.base_url.clone(),
            user_id: self.user_id(username),
            access_token,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    /// Endpoint under `/rooms/{room_id}`, with the room ID percent-encoded.
    pub(crate) fn room_endpoint(&self, room_id: &str, suffix: &str) -> String {
        self.endpoint(&format!("/rooms/{}{}", urlencoding::encode(room_id), suffix))
    }

    pub(crate) fn get(&self, session: &Session, url: String) -> RequestBuilder {
        self.http.get(url).bearer_auth(session.access_token())
    }

    pub(crate) fn post(&self, session: &Session, url: String) -> RequestBuilder {
        self.http.post(url).bearer_auth(session.access_token())
    }

    pub(crate) fn put(&self, session: &Session, url: String) -> RequestBuilder {
        self.http.put(url).bearer_auth(session.access_token())
    }
}

/// Body of a rejected response, or `None` when the status was a success.
pub(crate) async fn rejection_body(response: Response) -> Option<String> {
    if response.status().is_success() {
        return None;
    }
    let status = response.status();
    let body = read_body(response).await;
    if body.is_empty() {
        Some(status.to_string())
    } else {
        Some(body)
    }
}

/// Response body as text. A body that cannot be read is replaced by the
/// read error, so callers still have something to report.
pub(crate) async fn read_body(response: Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(error) => {
            debug!(%error, "failed to read response body");
            error.to_string()
        }
    }
}
