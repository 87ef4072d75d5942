//! Verification code issuer

use chrono::{DateTime, Duration, Utc};
use common::models::PendingVerification;
use rand::Rng;

/// Issues four-digit numeric codes with a fixed lifetime
#[derive(Debug, Clone)]
pub struct CodeIssuer {
    ttl: Duration,
}

impl CodeIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn issue(&self) -> PendingVerification {
        self.issue_at(Utc::now())
    }

    /// Code in 1000..=9999, expiring `ttl` after `now`
    pub fn issue_at(&self, now: DateTime<Utc>) -> PendingVerification {
        let code: u16 = rand::thread_rng().gen_range(1000..=9999);

        PendingVerification {
            code: code.to_string(),
            expires_at: now + self.ttl,
        }
    }
}
