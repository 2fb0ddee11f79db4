use crate::enums::Severity;
use serde::{Deserialize, Serialize};

/// Time-bounded window during which price perturbation is amplified.
///
/// Zones are immutable once created and expire on their own; holders are
/// expected to evict them once [`VolatilityZone::is_active`] turns false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilityZone {
    /// Creation time, UNIX seconds.
    pub start_time: i64,
    pub duration_minutes: u32,
    pub severity: Severity,
}

impl VolatilityZone {
    pub fn new(start_time: i64, duration_minutes: u32, severity: Severity) -> Self {
        Self {
            start_time,
            duration_minutes,
            severity,
        }
    }

    /// First second at which the zone is no longer active.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.start_time + i64::from(self.duration_minutes) * 60
    }

    /// Active while `now - start_time < duration_minutes * 60`.
    #[must_use]
    pub fn is_active(&self, now: i64) -> bool {
        now - self.start_time < i64::from(self.duration_minutes) * 60
    }

    /// Seconds left before expiry, zero once expired.
    #[must_use]
    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.expires_at() - now).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_minute_zone_boundaries() {
        let t0 = 1_700_000_000;
        let zone = VolatilityZone::new(t0, 10, Severity::High);

        assert!(zone.is_active(t0));
        assert!(zone.is_active(t0 + 599));
        assert!(!zone.is_active(t0 + 600));
        assert!(!zone.is_active(t0 + 601));
        assert_eq!(zone.expires_at(), t0 + 600);
    }

    #[test]
    fn test_remaining_secs() {
        let zone = VolatilityZone::new(0, 10, Severity::Extreme);
        assert_eq!(zone.remaining_secs(0), 600);
        assert_eq!(zone.remaining_secs(450), 150);
        assert_eq!(zone.remaining_secs(900), 0);
    }
}
