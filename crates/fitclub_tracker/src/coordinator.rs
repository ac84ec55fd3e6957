//! The per-account orchestration state machine.
//!
//! One coordinator owns one account's poll cycle: fetch raw data through
//! the [`ClubClient`] seam, run the aggregator and projector, and maintain
//! the single in-place-updated [`PollResult`]. Concurrent refresh triggers
//! are coalesced into a single in-flight poll whose result all callers
//! share; transient failures never clear previously derived data.

use crate::aggregate::aggregate;
use crate::project::{RESERVATION_HORIZON_DAYS, project};
use crate::types::{PollFailure, PollResult};
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc, Weekday};
use fitclub_client::{ClubApiError, ClubClient, RawReservation, RawVisit};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

pub struct PollCoordinator {
    client: Arc<dyn ClubClient>,
    week_start: Weekday,
    state: Mutex<PollResult>,
    // Single-flight slot: receivers of the currently running poll, if any.
    inflight: Mutex<Option<watch::Receiver<Option<PollResult>>>>,
}

impl PollCoordinator {
    pub fn new(client: Arc<dyn ClubClient>, week_start: Weekday) -> Self {
        Self {
            client,
            week_start,
            state: Mutex::new(PollResult::not_ready()),
            inflight: Mutex::new(None),
        }
    }

    /// The latest known state. Returns immediately; never touches the
    /// network.
    pub async fn get_current_snapshot(&self) -> PollResult {
        self.state.lock().await.clone()
    }

    /// Run a poll cycle now, or join the one already in flight. Every
    /// concurrent caller resolves to the same result without a second
    /// upstream round trip.
    pub async fn request_refresh(self: &Arc<Self>) -> PollResult {
        let mut rx = {
            let mut inflight = self.inflight.lock().await;
            if let Some(rx) = inflight.as_ref() {
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                *inflight = Some(rx.clone());
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    let result = this.poll_once().await;
                    *this.inflight.lock().await = None;
                    let _ = tx.send(Some(result));
                });
                rx
            }
        };
        loop {
            if let Some(result) = rx.borrow_and_update().clone() {
                return result;
            }
            if rx.changed().await.is_err() {
                // Poll task went away without reporting; serve what we have.
                return self.get_current_snapshot().await;
            }
        }
    }

    /// Fixed-interval polling task for this account. The first poll runs
    /// immediately. Flipping `shutdown` to true stops further ticks; an
    /// in-flight poll finishes but its result is no longer observed.
    pub fn spawn_scheduler(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let _ = this.request_refresh().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            tracing::debug!("poll scheduler stopping");
                            break;
                        }
                    }
                }
            }
        })
    }

    async fn poll_once(&self) -> PollResult {
        let outcome = self.fetch_with_reauth().await;
        let now = Utc::now();
        let mut state = self.state.lock().await;
        match outcome {
            Ok((visits, reservations)) => {
                state.visits = Some(aggregate(&visits, now, self.week_start));
                state.reservations = Some(project(&reservations, now, RESERVATION_HORIZON_DAYS));
                state.success = true;
                state.last_error = None;
                state.last_updated = Some(now);
                tracing::debug!(visit_count = visits.len(), "poll cycle succeeded");
            }
            Err(err) => {
                let failure = classify(&err, state.last_updated.is_some());
                tracing::warn!(error = %err, ?failure, "poll cycle failed");
                state.success = false;
                state.last_error = Some(failure);
            }
        }
        state.clone()
    }

    /// Fetch visits and reservations. On a session rejection, invalidate
    /// the cached session and retry the whole fetch exactly once; the
    /// retried fetch re-authenticates on its way in.
    async fn fetch_with_reauth(
        &self,
    ) -> Result<(Vec<RawVisit>, Vec<RawReservation>), ClubApiError> {
        match self.fetch_both().await {
            Err(ClubApiError::Unauthorized) => {
                tracing::debug!("session rejected, re-authenticating and retrying once");
                self.client.invalidate_session().await;
                self.fetch_both().await
            }
            other => other,
        }
    }

    async fn fetch_both(&self) -> Result<(Vec<RawVisit>, Vec<RawReservation>), ClubApiError> {
        let today = Utc::now().date_naive();
        let year_start =
            NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("jan 1 is always a valid date");
        let visits = self.client.fetch_visits(year_start, today).await?;
        let reservations = self
            .client
            .fetch_reservations(today, today + ChronoDuration::days(RESERVATION_HORIZON_DAYS))
            .await?;
        Ok((visits, reservations))
    }
}

/// Map a fetch error to the outcome consumers see. A rejection that
/// survived the single re-auth retry is fatal; everything else is
/// transient, downgraded to `NotReady` only when there is no
/// last-known-good snapshot to keep serving.
fn classify(err: &ClubApiError, has_snapshot: bool) -> PollFailure {
    match err {
        ClubApiError::Unauthorized | ClubApiError::InvalidCredentials => PollFailure::AuthFailed,
        _ if !has_snapshot => PollFailure::NotReady,
        ClubApiError::RateLimited => PollFailure::RateLimited,
        other => PollFailure::UpdateFailed(other.to_string()),
    }
}
