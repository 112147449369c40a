#![doc = "Publisher integration: bridges the core `Publisher` trait to a Twitter-style status API."]
//
//! # Destination client
//!
//! [`TwitterClient`] signs every request with OAuth 1.0a, verifies the
//! credentials once at startup and posts status updates. Messages arrive
//! already composed and truncated by the relay; this module only handles
//! transport, signing and response decoding.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use timeline_relay_core::config::SinkSettings;
use timeline_relay_core::contract::{Account, PostId, Publisher};
use timeline_relay_core::error::{RelayError, RelayResult};

use crate::load_config::Credentials;
use crate::oauth::{percent_encode, OAuthSigner};

#[derive(Debug, Deserialize)]
struct VerifiedUser {
    id_str: String,
    name: String,
    screen_name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedStatus {
    id_str: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrors {
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// Human-readable summary of an error response body.
pub fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrors>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => {
            let messages = parsed
                .errors
                .iter()
                .map(|e| match e.code {
                    Some(code) => format!("{} (code {code})", e.message),
                    None => e.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            format!("HTTP {status}: {messages}")
        }
        _ => format!("HTTP {status}: {body}"),
    }
}

pub struct TwitterClient {
    client: Client,
    base_url: String,
    signer: OAuthSigner,
}

impl TwitterClient {
    pub fn new(credentials: &Credentials, settings: &SinkSettings) -> RelayResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("timeline-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(api_url = %settings.api_url, "Initialised status API client");
        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(credentials),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Publisher for TwitterClient {
    async fn verify_credentials(&self) -> RelayResult<Account> {
        let url = self.endpoint("account/verify_credentials.json");
        let auth = self
            .signer
            .authorization("GET", &url, &[])
            .map_err(|e| RelayError::CredentialVerification(e.to_string()))?;

        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Credential verification request failed");
                RelayError::CredentialVerification(e.to_string())
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RelayError::CredentialVerification(e.to_string()))?;
        if !status.is_success() {
            tracing::error!(status = %status, "Credential verification rejected");
            return Err(RelayError::CredentialVerification(describe_error(
                status.as_u16(),
                &body,
            )));
        }

        let user: VerifiedUser = serde_json::from_str(&body).map_err(|e| {
            RelayError::CredentialVerification(format!("unexpected verify_credentials body: {e}"))
        })?;
        Ok(Account {
            id: user.id_str,
            name: user.name,
            screen_name: user.screen_name,
        })
    }

    async fn publish(&self, text: &str) -> RelayResult<PostId> {
        let url = self.endpoint("statuses/update.json");
        let auth = self
            .signer
            .authorization("POST", &url, &[("status", text)])
            .map_err(|e| RelayError::Publish(e.to_string()))?;

        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("status={}", percent_encode(text)))
            .send()
            .await
            .map_err(|e| RelayError::Publish(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RelayError::Publish(e.to_string()))?;
        if !status.is_success() {
            return Err(RelayError::Publish(describe_error(status.as_u16(), &body)));
        }

        let created: CreatedStatus = serde_json::from_str(&body)
            .map_err(|e| RelayError::Publish(format!("unexpected statuses/update body: {e}")))?;
        tracing::debug!(post_id = %created.id_str, "Status created");
        Ok(PostId(created.id_str))
    }
}
