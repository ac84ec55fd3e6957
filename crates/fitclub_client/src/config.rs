use crate::{ClubApiError, Credential};
use chrono::Weekday;
use secrecy::SecretString;
use std::time::Duration;

/// Default polling cadence, matching the club portal's own refresh rate.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Clone, Debug)]
pub struct Config {
    pub username: String,
    pub password: SecretString,
    pub member_number: Option<String>,
    pub base_url: String,
    /// First day of the rolling weekly counting window.
    pub week_start: Weekday,
    pub poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ClubApiError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ClubApiError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let username = get("FITCLUB_USERNAME")
            .ok_or_else(|| ClubApiError::Config("FITCLUB_USERNAME missing".into()))?;
        let password = get("FITCLUB_PASSWORD")
            .ok_or_else(|| ClubApiError::Config("FITCLUB_PASSWORD missing".into()))?;
        let base_url = get("FITCLUB_BASE_URL")
            .ok_or_else(|| ClubApiError::Config("FITCLUB_BASE_URL missing".into()))?;
        let member_number = get("FITCLUB_MEMBER_NUMBER");
        let week_start = match get("FITCLUB_WEEK_START") {
            Some(raw) => raw.parse::<Weekday>().map_err(|_| {
                ClubApiError::Config(format!("invalid FITCLUB_WEEK_START: {raw}"))
            })?,
            None => Weekday::Mon,
        };
        let poll_interval = match get("FITCLUB_POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    ClubApiError::Config(format!("invalid FITCLUB_POLL_INTERVAL_SECS: {raw}"))
                })?;
                // A zero period would abort the polling loop at startup.
                if secs == 0 {
                    return Err(ClubApiError::Config(
                        "FITCLUB_POLL_INTERVAL_SECS must be greater than zero".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_POLL_INTERVAL,
        };
        Ok(Self {
            username,
            password: SecretString::new(password.into()),
            member_number,
            base_url,
            week_start,
            poll_interval,
        })
    }

    pub fn credential(&self) -> Credential {
        Credential {
            username: self.username.clone(),
            password: self.password.clone(),
            member_number: self.member_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env(k: &str) -> Option<String> {
        match k {
            "FITCLUB_USERNAME" => Some("alice@example.com".into()),
            "FITCLUB_PASSWORD" => Some("sekrit".into()),
            "FITCLUB_BASE_URL" => Some("http://localhost".into()),
            _ => None,
        }
    }

    #[test]
    fn from_env_missing_password() {
        let get = |k: &str| match k {
            "FITCLUB_PASSWORD" => None,
            other => base_env(other),
        };
        assert!(Config::from_env_with(get).is_err());
    }

    #[test]
    fn from_env_defaults() {
        let cfg = Config::from_env_with(base_env).expect("cfg");
        assert_eq!(cfg.username, "alice@example.com");
        assert_eq!(cfg.base_url, "http://localhost");
        assert_eq!(cfg.week_start, Weekday::Mon);
        assert_eq!(cfg.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(cfg.member_number.is_none());
    }

    #[test]
    fn from_env_parses_week_start_and_interval() {
        let get = |k: &str| match k {
            "FITCLUB_WEEK_START" => Some("sunday".into()),
            "FITCLUB_POLL_INTERVAL_SECS" => Some("60".into()),
            other => base_env(other),
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.week_start, Weekday::Sun);
        assert_eq!(cfg.poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn from_env_rejects_zero_poll_interval() {
        let get = |k: &str| match k {
            "FITCLUB_POLL_INTERVAL_SECS" => Some("0".into()),
            other => base_env(other),
        };
        assert!(Config::from_env_with(get).is_err());
    }

    #[test]
    fn from_env_rejects_bad_week_start() {
        let get = |k: &str| match k {
            "FITCLUB_WEEK_START" => Some("someday".into()),
            other => base_env(other),
        };
        assert!(Config::from_env_with(get).is_err());
    }
}
