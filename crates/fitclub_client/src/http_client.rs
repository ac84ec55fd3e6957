//! HTTP client implementation for the club member API.
//!
//! This module provides a reqwest-based implementation of the
//! [`ClubClient`](crate::ClubClient) trait on top of [`SessionManager`].

use crate::retry::RetryPolicy;
use crate::session::SessionManager;
use crate::utils::{parse_instant, value_as_id_string};
use crate::{ClubApiError, ClubClient, Credential, RawReservation, RawVisit, Session};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

const VISITS_DATE_FORMAT: &str = "%Y-%m-%d";
const RESERVATIONS_DATE_FORMAT: &str = "%Y-%m-%d";

/// Request-level timeout; exceeding it classifies as `UpstreamUnavailable`.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for the club member API using reqwest.
pub struct ReqwestClubClient {
    base_url: String,
    http: reqwest::Client,
    sessions: SessionManager,
    retry: RetryPolicy,
}

impl ReqwestClubClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the member API
    /// * `credential` - The login credential entered at setup time
    pub fn new(base_url: &str, credential: Credential) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client build should not fail");
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            sessions: SessionManager::new(&base_url, credential, http.clone()),
            base_url,
            http,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(&config.base_url, config.credential())
    }

    /// Execute an authenticated GET, retrying transport-transient failures,
    /// and classify the response status. A 401/403 clears the cached
    /// session before surfacing `Unauthorized`.
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        session: &Session,
    ) -> Result<Value, ClubApiError> {
        let resp = self
            .retry
            .retry_async(
                || async {
                    self.http
                        .get(url)
                        .query(query)
                        .bearer_auth(session.bearer.expose_secret())
                        .send()
                        .await
                },
                |e: &reqwest::Error| e.is_timeout() || e.is_connect(),
            )
            .await
            .map_err(ClubApiError::transport)?;

        let status = resp.status();
        match status.as_u16() {
            401 | 403 => {
                self.sessions.invalidate().await;
                Err(ClubApiError::Unauthorized)
            }
            429 => Err(ClubApiError::RateLimited),
            _ if !status.is_success() => Err(ClubApiError::UpstreamUnavailable(format!(
                "status {status} from {url}"
            ))),
            _ => resp
                .json()
                .await
                .map_err(|e| ClubApiError::MalformedResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl ClubClient for ReqwestClubClient {
    async fn fetch_visits(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawVisit>, ClubApiError> {
        let session = self.sessions.session().await?;
        let url = format!(
            "{}/myaccount/members/{}/club-visits",
            self.base_url, session.member_id
        );
        let query = [
            ("startDate", start.format(VISITS_DATE_FORMAT).to_string()),
            ("endDate", end.format(VISITS_DATE_FORMAT).to_string()),
        ];
        let payload = self.get_json(&url, &query, &session).await?;
        parse_visits(&payload)
    }

    async fn fetch_reservations(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawReservation>, ClubApiError> {
        let session = self.sessions.session().await?;
        let url = format!("{}/ux/web-schedules/v3/reservations", self.base_url);
        let query = [
            ("memberIds", session.member_id.clone()),
            ("start", start.format(RESERVATIONS_DATE_FORMAT).to_string()),
            ("end", end.format(RESERVATIONS_DATE_FORMAT).to_string()),
            ("groupCamps", "true".to_string()),
            ("pageSize", "0".to_string()),
        ];
        let payload = self.get_json(&url, &query, &session).await?;
        parse_reservations(&payload)
    }

    async fn invalidate_session(&self) {
        self.sessions.invalidate().await;
    }
}

/// Decode the visits payload defensively. The payload shape is not
/// contractually guaranteed: a missing or non-array `data` field is a
/// `MalformedResponse`; individual entries with missing or out-of-range
/// timestamps are skipped with a warning.
fn parse_visits(payload: &Value) -> Result<Vec<RawVisit>, ClubApiError> {
    let entries = payload.get("data").and_then(Value::as_array).ok_or_else(|| {
        ClubApiError::MalformedResponse("visits payload missing `data` array".into())
    })?;

    let mut visits = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(millis) = entry.get("usageDateTime").and_then(Value::as_i64) else {
            tracing::warn!("visit entry missing usageDateTime, skipping");
            continue;
        };
        match Utc.timestamp_millis_opt(millis) {
            chrono::LocalResult::Single(timestamp) => visits.push(RawVisit { timestamp }),
            _ => tracing::warn!(millis, "visit entry has out-of-range timestamp, skipping"),
        }
    }
    visits.sort_by_key(|v| v.timestamp);
    Ok(visits)
}

/// Decode the reservations payload defensively, same contract as
/// [`parse_visits`]: `results` must be an array, entries without parseable
/// start/end instants are skipped.
fn parse_reservations(payload: &Value) -> Result<Vec<RawReservation>, ClubApiError> {
    let entries = payload
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ClubApiError::MalformedResponse("reservations payload missing `results` array".into())
        })?;

    let mut reservations = Vec::with_capacity(entries.len());
    for entry in entries {
        let start = entry
            .get("start")
            .and_then(Value::as_str)
            .and_then(parse_instant);
        let end = entry
            .get("end")
            .and_then(Value::as_str)
            .and_then(parse_instant);
        let (Some(start), Some(end)) = (start, end) else {
            tracing::warn!("reservation entry missing start/end, skipping");
            continue;
        };

        let instructors = entry
            .get("instructors")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|i| i.get("name").and_then(Value::as_str))
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        reservations.push(RawReservation {
            id: entry
                .get("id")
                .and_then(value_as_id_string)
                .unwrap_or_default(),
            name: entry
                .get("eventName")
                .and_then(Value::as_str)
                .unwrap_or("Reservation")
                .to_string(),
            start,
            end,
            location: entry
                .get("location")
                .and_then(Value::as_str)
                .map(str::to_string),
            location_name: entry
                .get("locationName")
                .and_then(Value::as_str)
                .map(str::to_string),
            instructors,
            reservation_type: entry
                .get("reservationType")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }
    reservations.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    Ok(reservations)
}
