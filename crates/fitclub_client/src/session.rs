//! Session lifecycle against the club's authentication endpoints.
//!
//! Authentication is purely reactive: there is no expiry tracking and no
//! background refresh. A session lives until a request using it is rejected,
//! at which point the caller invalidates it and the next [`SessionManager::session`]
//! call logs in again.

use crate::utils::value_as_id_string;
use crate::{ClubApiError, Credential, Session};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::Mutex;

// Body-level authentication results the upstream reports with a 2xx status.
const AUTH_STATUS_INVALID: &str = "-201";
const AUTH_STATUS_TOO_MANY_ATTEMPTS: &str = "-207";
const AUTH_STATUS_ACTIVATION_REQUIRED: &str = "-208";
const AUTH_STATUS_DUPLICATE_EMAIL: &str = "-209";
const AUTH_MESSAGE_INVALID: &str = "Invalid username or password";
const AUTH_MESSAGE_PASSWORD_CHANGE: &str = "Password needs to be changed.";

pub struct SessionManager {
    base_url: String,
    credential: Credential,
    http: reqwest::Client,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(base_url: &str, credential: Credential, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
            http,
            session: Mutex::new(None),
        }
    }

    /// The cached session, or a fresh one if none is cached.
    pub async fn session(&self) -> Result<Session, ClubApiError> {
        if let Some(session) = self.session.lock().await.clone() {
            return Ok(session);
        }
        self.authenticate().await
    }

    /// Log in, resolve the member identifier, and cache the session.
    pub async fn authenticate(&self) -> Result<Session, ClubApiError> {
        let mut body = serde_json::json!({
            "username": self.credential.username,
            "password": self.credential.password.expose_secret(),
        });
        if let Some(member_number) = &self.credential.member_number {
            body["memberNumber"] = Value::String(member_number.clone());
        }

        let resp = self
            .http
            .post(format!("{}/auth/v2/login", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(ClubApiError::transport)?;

        let status = resp.status();
        match status.as_u16() {
            401 | 403 => return Err(ClubApiError::InvalidCredentials),
            429 => return Err(ClubApiError::RateLimited),
            _ if !status.is_success() => {
                return Err(ClubApiError::UpstreamUnavailable(format!(
                    "login returned status {status}"
                )));
            }
            _ => {}
        }

        #[derive(serde::Deserialize)]
        struct LoginPayload {
            token: Option<String>,
            #[serde(rename = "ssoId")]
            sso_id: Option<String>,
            status: Option<String>,
            message: Option<String>,
        }

        let payload: LoginPayload = resp
            .json()
            .await
            .map_err(|e| ClubApiError::MalformedResponse(format!("decoding login response: {e}")))?;

        // Some failure modes come back with a 2xx status and a body-level code.
        if payload.message.as_deref() == Some(AUTH_MESSAGE_PASSWORD_CHANGE) {
            // Accounts with an SSO identity keep working with a stale
            // password; everyone else has to change it before logging in.
            if payload.sso_id.is_none() {
                return Err(ClubApiError::InvalidCredentials);
            }
            tracing::warn!("club password needs to be changed, continuing with issued token");
        }
        if payload.message.as_deref() == Some(AUTH_MESSAGE_INVALID) {
            return Err(ClubApiError::InvalidCredentials);
        }
        match payload.status.as_deref() {
            Some(AUTH_STATUS_INVALID | AUTH_STATUS_ACTIVATION_REQUIRED | AUTH_STATUS_DUPLICATE_EMAIL) => {
                return Err(ClubApiError::InvalidCredentials);
            }
            Some(AUTH_STATUS_TOO_MANY_ATTEMPTS) => return Err(ClubApiError::RateLimited),
            _ => {}
        }

        let token = payload
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClubApiError::MalformedResponse("login response missing token".into()))?;
        let bearer = SecretString::new(token.into());

        let member_id = self.fetch_member_id(&bearer).await?;
        let session = Session { bearer, member_id };
        tracing::debug!(member_id = %session.member_id, "authenticated against club api");
        *self.session.lock().await = Some(session.clone());
        Ok(session)
    }

    /// Resolve the member identifier for the freshly issued bearer token.
    async fn fetch_member_id(&self, bearer: &SecretString) -> Result<String, ClubApiError> {
        let resp = self
            .http
            .get(format!("{}/user-profile/profile", self.base_url))
            .bearer_auth(bearer.expose_secret())
            .send()
            .await
            .map_err(ClubApiError::transport)?;

        let status = resp.status();
        match status.as_u16() {
            // A just-issued token being rejected means the credential itself is bad.
            401 | 403 => return Err(ClubApiError::InvalidCredentials),
            _ if !status.is_success() => {
                return Err(ClubApiError::UpstreamUnavailable(format!(
                    "profile returned status {status}"
                )));
            }
            _ => {}
        }

        #[derive(serde::Deserialize)]
        struct ProfilePayload {
            #[serde(rename = "memberDetails")]
            member_details: Option<MemberDetails>,
        }
        #[derive(serde::Deserialize)]
        struct MemberDetails {
            // Arrives as a number or a string depending on the endpoint version.
            #[serde(rename = "memberId")]
            member_id: Option<Value>,
        }

        let payload: ProfilePayload = resp.json().await.map_err(|e| {
            ClubApiError::MalformedResponse(format!("decoding profile response: {e}"))
        })?;
        payload
            .member_details
            .and_then(|details| details.member_id)
            .as_ref()
            .and_then(value_as_id_string)
            .ok_or_else(|| {
                ClubApiError::MalformedResponse(
                    "profile response missing memberDetails.memberId".into(),
                )
            })
    }

    /// Clear the cached session, forcing the next request to re-authenticate.
    pub async fn invalidate(&self) {
        *self.session.lock().await = None;
    }
}
