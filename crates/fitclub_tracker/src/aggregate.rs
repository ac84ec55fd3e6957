//! Pure aggregation of raw check-ins into rolling counters.
//!
//! All calendar boundaries are computed in UTC: given the same raw visits
//! and the same reference `now`, the output is identical on every call.

use crate::types::VisitSnapshot;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use fitclub_client::RawVisit;

/// Derive the five counters from `visits` relative to `now`.
///
/// Each counter counts visits at or after its own cutoff: Jan 1 for the
/// year counters, the 1st of the month, and the most recent occurrence of
/// `week_start` (midnight) for the weekly counter. An empty input yields
/// all-zero counters and no last visit; that is not an error.
pub fn aggregate(visits: &[RawVisit], now: DateTime<Utc>, week_start: Weekday) -> VisitSnapshot {
    if visits.is_empty() {
        return VisitSnapshot::default();
    }

    let year_cutoff = day_start(
        NaiveDate::from_ymd_opt(now.year(), 1, 1).expect("jan 1 is always a valid date"),
    );
    let month_cutoff = day_start(
        now.date_naive()
            .with_day(1)
            .expect("the 1st is always a valid day"),
    );
    let week_cutoff = day_start(start_of_week(now.date_naive(), week_start));

    let mut snapshot = VisitSnapshot::default();
    for visit in visits {
        let ts = visit.timestamp;
        if ts >= year_cutoff {
            snapshot.visits_this_year += 1;
        }
        if ts >= month_cutoff {
            snapshot.visits_this_month += 1;
        }
        if ts >= week_cutoff {
            snapshot.visits_this_week += 1;
        }
        if snapshot.last_visit.is_none_or(|prev| ts > prev) {
            snapshot.last_visit = Some(ts);
        }
    }
    snapshot.total_visits_ytd = snapshot.visits_this_year;
    snapshot
}

/// Most recent occurrence of `week_start` on or before `date`. If `date`
/// itself falls on `week_start`, the window starts at `date`.
fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset =
        (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
