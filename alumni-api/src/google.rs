//! Google ID-token verification
//!
//! Server-side half of Google sign-in: the browser obtains an ID token
//! and posts it here; we confirm it with Google's tokeninfo endpoint
//! and check the audience against our configured client id. The
//! redirect/consent flow itself is presentation-layer.

use alumni_common::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verified identity extracted from a Google ID token
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Google's stable subject id for the account
    pub subject: String,
    pub email: String,
    pub name: String,
}

/// Relevant fields of the tokeninfo response
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Verifies ID tokens against the configured OAuth client id
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    endpoint: String,
}

impl GoogleVerifier {
    pub fn new(client_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            client_id,
            endpoint: TOKENINFO_ENDPOINT.to_string(),
        }
    }

    /// Endpoint override for tests
    #[allow(dead_code)]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Validate an ID token and extract the identity it asserts
    pub async fn verify(&self, id_token: &str) -> Result<GoogleIdentity> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("tokeninfo request failed: {}", e);
                Error::Auth("Google sign-in failed".to_string())
            })?;

        if !response.status().is_success() {
            return Err(Error::Auth("Google sign-in failed".to_string()));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|_| Error::Auth("Google sign-in failed".to_string()))?;

        identity_from_tokeninfo(info, &self.client_id)
    }
}

fn identity_from_tokeninfo(info: TokenInfo, client_id: &str) -> Result<GoogleIdentity> {
    if info.aud != client_id {
        warn!("tokeninfo audience mismatch: {}", info.aud);
        return Err(Error::Auth("Google sign-in failed".to_string()));
    }

    let email = info
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::Auth("Google sign-in failed".to_string()))?;

    Ok(GoogleIdentity {
        name: info.name.unwrap_or_else(|| email.clone()),
        subject: info.sub,
        email,
    })
}
