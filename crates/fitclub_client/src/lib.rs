//! Minimal `ClubClient` trait and reqwest-based client for a fitness-club
//! member web API.
//!
//! The crate owns the session lifecycle (login, bearer token, reactive
//! invalidation) and normalizes transport/HTTP failures into the small
//! [`ClubApiError`] set consumed by the polling engine.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use secrecy::SecretString;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod retry;
pub mod session;
pub mod utils;

#[derive(Debug, Error)]
pub enum ClubApiError {
    /// Credential rejected by the upstream; user action required.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Upstream throttled the request (HTTP 429 or its body-level twin).
    #[error("rate limited by upstream")]
    RateLimited,
    /// A previously issued session was rejected on a data call.
    #[error("session rejected by upstream")]
    Unauthorized,
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClubApiError {
    /// Classify a transport-level failure. Anything reqwest reports before
    /// we have a status line (connect, timeout, body read) counts as the
    /// upstream being unavailable.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::UpstreamUnavailable(err.to_string())
    }
}

/// Login credential as entered at setup time. The password never appears in
/// `Debug` output or logs.
#[derive(Clone, Debug)]
pub struct Credential {
    pub username: String,
    pub password: SecretString,
    /// Disambiguates accounts that share an email address.
    pub member_number: Option<String>,
}

/// A live authenticated session. Validity is discovered reactively: the
/// session carries no expiry and is cleared when any request using it is
/// rejected with an authorization error.
#[derive(Clone, Debug)]
pub struct Session {
    pub bearer: SecretString,
    pub member_id: String,
}

/// A single club check-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawVisit {
    pub timestamp: DateTime<Utc>,
}

/// An upcoming class/session reservation as returned by the schedules
/// endpoint, before projection into a calendar event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReservation {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub location_name: Option<String>,
    pub instructors: Vec<String>,
    pub reservation_type: Option<String>,
}

/// Seam between the polling engine and the upstream API.
///
/// `Unauthorized` is surfaced to the caller and never retried at this
/// layer; the poll coordinator owns the invalidate-and-retry-once policy.
#[async_trait]
pub trait ClubClient: Send + Sync + 'static {
    /// Check-ins within the inclusive date range, ordered by timestamp.
    async fn fetch_visits(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawVisit>, ClubApiError>;

    /// Reservations within the inclusive date range, ordered by start time.
    async fn fetch_reservations(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawReservation>, ClubApiError>;

    /// Drop the cached session so the next request re-authenticates.
    async fn invalidate_session(&self);
}
