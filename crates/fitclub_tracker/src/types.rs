use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Rolling visit counters derived from one fetch of raw check-ins.
///
/// Each counter is computed independently against its own cutoff; no
/// cross-counter relation is guaranteed (a week can straddle a month
/// boundary).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VisitSnapshot {
    pub total_visits_ytd: u32,
    /// Same value and cutoff as `total_visits_ytd`; kept as a distinct
    /// counter for presentation.
    pub visits_this_year: u32,
    pub visits_this_month: u32,
    pub visits_this_week: u32,
    pub last_visit: Option<DateTime<Utc>>,
}

/// A normalized upcoming reservation, ready for a calendar surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub description: Option<String>,
}

/// Poll-cycle outcomes that consumers need to distinguish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
pub enum PollFailure {
    /// Re-authentication was rejected; the user must re-enter credentials.
    #[error("authentication failed, credentials must be re-entered")]
    AuthFailed,
    /// Upstream throttled us; retry on a later cycle.
    #[error("rate limited by upstream")]
    RateLimited,
    /// No poll has ever succeeded for this account.
    #[error("no successful poll has completed yet")]
    NotReady,
    /// Transient upstream or parse failure; last-known-good data stands.
    #[error("update failed: {0}")]
    UpdateFailed(String),
}

/// The latest derived state for one tracked account.
///
/// Updated in place by the coordinator: snapshot fields are only ever
/// overwritten on a successful cycle, so readers always see last-known-good
/// data alongside the current `success`/`last_error` flags and a
/// `last_updated` stamp to judge freshness.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PollResult {
    pub visits: Option<VisitSnapshot>,
    pub reservations: Option<Vec<CalendarEvent>>,
    pub success: bool,
    pub last_error: Option<PollFailure>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PollResult {
    /// State before any poll has completed. Consumers should show
    /// "unavailable" rather than fabricated zeros.
    pub fn not_ready() -> Self {
        Self {
            visits: None,
            reservations: None,
            success: false,
            last_error: Some(PollFailure::NotReady),
            last_updated: None,
        }
    }
}
