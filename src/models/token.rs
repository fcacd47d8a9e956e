//! Access token model.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// How long before expiry a proactive refresh is scheduled, in seconds.
pub const REFRESH_LEAD_SECS: i64 = 60;

/// Upper bound on a schedulable refresh delay, in days.
///
/// Tokens whose expiry lies further out than this (effectively-infinite
/// expiries, or clock skew producing a huge delay) are never proactively
/// refreshed; the skip is logged by the session and is a documented edge
/// case rather than something to paper over.
pub const MAX_REFRESH_DELAY_DAYS: i64 = 365;

/// A bearer token for the Metasys API with its absolute expiry.
///
/// Tokens are opaque; the only meaningful operations are sending the value
/// in an `Authorization` header and comparing the expiry against the clock.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// The opaque bearer string.
    pub access_token: String,
    /// Absolute expiry timestamp (UTC).
    pub expires: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the bearer string itself.
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("expires", &self.expires)
            .finish()
    }
}

impl AccessToken {
    /// True if the token has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// True if the token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Delay until the proactive refresh should fire, as of `now`.
    ///
    /// The delay is the time to expiry minus [`REFRESH_LEAD_SECS`], clamped
    /// to zero when the token is already within the lead window. Returns
    /// `None` when the delay exceeds [`MAX_REFRESH_DELAY_DAYS`], meaning no
    /// refresh should be scheduled at all.
    pub fn refresh_delay(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        let delay = self.expires - now - ChronoDuration::seconds(REFRESH_LEAD_SECS);
        if delay > ChronoDuration::days(MAX_REFRESH_DELAY_DAYS) {
            return None;
        }
        // to_std fails only on negative durations, which clamp to zero.
        Some(delay.to_std().unwrap_or(std::time::Duration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_expiring_in(seconds: i64) -> AccessToken {
        AccessToken {
            access_token: "tok".to_string(),
            expires: Utc::now() + ChronoDuration::seconds(seconds),
        }
    }

    #[test]
    fn test_refresh_delay_subtracts_lead_time() {
        let token = token_expiring_in(600);
        let delay = token.refresh_delay(Utc::now()).unwrap();
        assert!(delay <= std::time::Duration::from_secs(540));
        assert!(delay > std::time::Duration::from_secs(530));
    }

    #[test]
    fn test_refresh_delay_clamps_negative_to_zero() {
        // Inside the lead window: refresh immediately.
        let token = token_expiring_in(10);
        assert_eq!(
            token.refresh_delay(Utc::now()),
            Some(std::time::Duration::ZERO)
        );

        // Already expired.
        let token = token_expiring_in(-30);
        assert_eq!(
            token.refresh_delay(Utc::now()),
            Some(std::time::Duration::ZERO)
        );
    }

    #[test]
    fn test_refresh_delay_skips_far_future_expiry() {
        let token = AccessToken {
            access_token: "tok".to_string(),
            expires: Utc::now() + ChronoDuration::days(400),
        };
        assert_eq!(token.refresh_delay(Utc::now()), None);
    }

    #[test]
    fn test_expiry_check() {
        assert!(token_expiring_in(-1).is_expired());
        assert!(!token_expiring_in(60).is_expired());
    }

    #[test]
    fn test_debug_redacts_token_value() {
        let token = token_expiring_in(60);
        let debug = format!("{token:?}");
        assert!(!debug.contains("tok\""));
        assert!(debug.contains("<redacted>"));
    }
}
