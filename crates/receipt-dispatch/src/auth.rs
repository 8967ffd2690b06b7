//! Login against the document service.

use std::fmt;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use crate::config::ApiConfig;

/// Opaque bearer credential passed to every later call.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Pull the token out of a login response.
///
/// The service nests the JWT under `accessToken.token`; older responses
/// carry a top-level `token`.
pub fn extract_token(body: &serde_json::Value) -> Option<BearerToken> {
    let nested = body
        .get("accessToken")
        .and_then(|a| a.get("token"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty());
    let top = body
        .get("token")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty());
    nested.or(top).map(BearerToken::new)
}

/// `POST {base}/login`. Any failure here is fatal for the run.
pub async fn login(client: &reqwest::Client, api: &ApiConfig) -> Result<BearerToken> {
    let url = format!("{}/login", api.base_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .json(&json!({
            "email": api.email,
            "password": api.password,
            "issuer": api.issuer,
        }))
        .send()
        .await
        .with_context(|| format!("Login request to {url} failed"))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        anyhow::bail!("Login rejected with HTTP {status}");
    }

    let body: serde_json::Value = response
        .json()
        .await
        .context("Login response was not JSON")?;
    let token = extract_token(&body).context("Login response carried no token")?;

    info!(user = %api.email, "Authenticated with document service");
    Ok(token)
}
