//! Pure projection of raw reservations into normalized calendar events.

use crate::types::CalendarEvent;
use chrono::{DateTime, Duration, Utc};
use fitclub_client::RawReservation;

/// Forward-looking window for upcoming reservations.
pub const RESERVATION_HORIZON_DAYS: i64 = 30;

/// Project reservations into calendar events within the horizon.
///
/// Keeps events that have not yet ended and start no later than
/// `now + horizon_days`; output is ordered by start time, ties broken by
/// reservation id for determinism.
pub fn project(
    reservations: &[RawReservation],
    now: DateTime<Utc>,
    horizon_days: i64,
) -> Vec<CalendarEvent> {
    let horizon = now + Duration::days(horizon_days);
    let mut events: Vec<CalendarEvent> = reservations
        .iter()
        .filter(|r| r.end >= now && r.start <= horizon)
        .map(to_event)
        .collect();
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.uid.cmp(&b.uid)));
    events
}

fn to_event(reservation: &RawReservation) -> CalendarEvent {
    let mut lines: Vec<String> = Vec::new();
    if let Some(kind) = reservation.reservation_type.as_deref() {
        if !kind.is_empty() {
            lines.push(format!("Type: {kind}"));
        }
    }
    if !reservation.instructors.is_empty() {
        lines.push(format!("Instructor: {}", reservation.instructors.join(", ")));
    }
    if let Some(club) = reservation.location_name.as_deref() {
        if !club.is_empty() {
            lines.push(format!("Club: {club}"));
        }
    }

    CalendarEvent {
        uid: reservation.id.clone(),
        summary: reservation.name.clone(),
        start: reservation.start,
        end: reservation.end,
        location: reservation
            .location
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        description: if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        },
    }
}
