//! Polling-and-aggregation engine for a fitness-club member account.
//!
//! The engine owns the poll cycle for one account: it fetches raw visit and
//! reservation data through [`fitclub_client::ClubClient`], derives rolling
//! visit counters and upcoming calendar events, and exposes an
//! always-available [`PollResult`] snapshot that survives transient
//! upstream failures (last-known-good retention).

pub mod aggregate;
pub mod coordinator;
pub mod project;
pub mod types;

pub use aggregate::aggregate;
pub use coordinator::PollCoordinator;
pub use project::{RESERVATION_HORIZON_DAYS, project};
pub use types::{CalendarEvent, PollFailure, PollResult, VisitSnapshot};
