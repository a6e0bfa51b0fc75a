//! SIDSP authentication
//!
//! Either a pre-supplied token is used as-is, or the checker logs in with
//! email/password against `POST /api/v1/Auth` and extracts the bearer token
//! from the JSON response.

use crate::error::{CheckerError, CheckerResult};
use crate::transport::HttpTransport;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sidsp_common::Settings;
use tracing::info;

pub const AUTH_PATH: &str = "/api/v1/Auth";

/// Attach a bearer token to `transport`, logging in when no token is configured
pub async fn authenticate(transport: HttpTransport, settings: &Settings) -> CheckerResult<HttpTransport> {
    if let Some(token) = &settings.token {
        info!("Using static token from configuration");
        return Ok(transport.with_token(token.clone()));
    }

    info!("No static token found, attempting login...");
    let (email, password) = match (&settings.auth_email, &settings.auth_password) {
        (Some(email), Some(password)) => (email.as_str(), password.as_str()),
        _ => {
            return Err(CheckerError::Auth(
                "Missing SIDSP_AUTH_EMAIL or SIDSP_AUTH_PASSWORD. \
                 Configure them or provide SIDSP_TOKEN instead."
                    .to_string(),
            ))
        }
    };

    let token = login(&transport, email, password).await?;
    info!("Login successful");
    Ok(transport.with_token(token))
}

/// Log in and return the bearer token
///
/// Credentials go both in the JSON body and as HTTP Basic auth. Success is
/// `201 Created` with a JSON body.
pub async fn login(transport: &HttpTransport, email: &str, password: &str) -> CheckerResult<String> {
    let url = format!("{}{}", transport.base_url(), AUTH_PATH);

    let response = transport
        .client()
        .post(&url)
        .basic_auth(email, Some(password))
        .header(ACCEPT, "application/json")
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    let body = response.text().await?;

    if status != StatusCode::CREATED {
        return Err(CheckerError::Auth(format!(
            "Authentication failed with status {}. Response: {}",
            status.as_u16(),
            body.chars().take(300).collect::<String>()
        )));
    }

    if !content_type.contains("application/json") {
        return Err(CheckerError::Auth(format!(
            "Expected JSON response but got '{}'. Body: {}",
            content_type,
            body.chars().take(200).collect::<String>()
        )));
    }

    let data: Value = serde_json::from_str(&body)
        .map_err(|e| CheckerError::Auth(format!("Failed to parse login response: {}", e)))?;

    extract_token(&data).ok_or_else(|| {
        let keys = data
            .as_object()
            .map(|o| o.keys().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        CheckerError::Auth(format!(
            "Authentication succeeded (201) but no token found in response. Response keys: [{}]",
            keys
        ))
    })
}

/// Find the token in a login response
///
/// Checked in order: `user.token`, `token`, `accessToken`, `access_token`.
pub fn extract_token(data: &Value) -> Option<String> {
    let candidates = [
        data.get("user").and_then(|u| u.get("token")),
        data.get("token"),
        data.get("accessToken"),
        data.get("access_token"),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
