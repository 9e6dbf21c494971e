//! Portal HTTP client.
//!
//! The portal authenticates with a session cookie obtained from a JSON
//! login endpoint. All calls are blocking and strictly sequential; the
//! tool has no concurrent portal access.

use crate::records::types::{Activity, RecordError, Ride};
use chrono::{DateTime, Utc};
use reqwest::header;
use thiserror::Error;

const BASE_URL: &str = "https://www.ebike-connect.com/ebikeconnect/api";

/// The portal rejects requests that look like cross-site scripts; it
/// expects a browser user agent and its own CSRF marker header.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:102.0) Gecko/20100101 Firefox/102.0";
const CSRF_HEADER: &str = "Protect-from";
const SESSION_COOKIE: &str = "REMEMBER";

/// Upper `max` bound the headers endpoint is queried with.
const TRIP_HEADER_LIMIT: u32 = 2;

/// Portal client errors.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error("login response carried no REMEMBER session cookie")]
    MissingSessionCookie,

    #[error("portal API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed portal response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Cookie-authenticated portal session.
pub struct PortalClient {
    http: reqwest::blocking::Client,
    base_url: String,
    cookie: String,
}

impl PortalClient {
    /// Log into the portal and capture the session cookie.
    pub fn login(username: &str, password: &str) -> Result<Self, PortalError> {
        let http = reqwest::blocking::Client::new();

        let response = http
            .post(format!("{BASE_URL}/portal/login/public"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
                "rememberme": true,
            }))
            .send()?;

        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PortalError::LoginRejected(body));
        }

        let cookie = session_cookie(&response);

        // A 200 with an `errors` array is still a rejected login.
        let body: serde_json::Value = response.json()?;
        if let Some(error) = body.get("errors").and_then(|e| e.as_array()).and_then(|e| e.first()) {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return Err(PortalError::LoginRejected(message));
        }

        let cookie = cookie.ok_or(PortalError::MissingSessionCookie)?;
        tracing::info!("Logged into the portal as {}", username);

        Ok(Self::from_cookie(cookie))
    }

    /// Build a client from a previously captured session cookie.
    pub fn from_cookie(cookie: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: BASE_URL.to_string(),
            cookie: cookie.into(),
        }
    }

    /// List activity groupings ending before `before`.
    ///
    /// The parsed activities are returned to the caller, which owns them;
    /// nothing is retained inside the client between calls.
    pub fn list_activities(&self, before: DateTime<Utc>) -> Result<Vec<Activity>, PortalError> {
        tracing::info!("Downloading ride list up to {}", before);

        let value = self.get(
            "/portal/activities/trip/headers",
            &[
                ("max", TRIP_HEADER_LIMIT.to_string()),
                ("offset", before.timestamp_millis().to_string()),
            ],
        )?;

        Ok(serde_json::from_value(value)?)
    }

    /// Download the full detail record for one ride.
    pub fn fetch_ride(&self, id: &str) -> Result<Ride, PortalError> {
        tracing::info!("Downloading ride {}", id);

        let value = self.get(&format!("/activities/ride/details/{id}"), &[])?;
        Ok(Ride::from_value(value)?)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<serde_json::Value, PortalError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(header::USER_AGENT, USER_AGENT)
            .header(CSRF_HEADER, "CSRF")
            .header(
                header::COOKIE,
                format!("{SESSION_COOKIE}={}", self.cookie),
            )
            .query(query)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(response.json()?)
    }
}

/// Pull the session cookie out of the login response headers.
fn session_cookie(response: &reqwest::blocking::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            let pair = value.split(';').next()?.trim();
            let (name, cookie) = pair.split_once('=')?;
            (name == SESSION_COOKIE).then(|| cookie.to_string())
        })
}
