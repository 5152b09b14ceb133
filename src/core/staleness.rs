use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_REFRESH_INTERVAL_MINUTES: u32 = 240;

/// Remembers when the cloud texture was last refreshed successfully.
#[derive(Debug, Clone)]
pub struct StalenessTracker {
    last_refresh: Option<DateTime<Utc>>,
    interval: Duration,
}

impl StalenessTracker {
    /// `refresh_interval_minutes` is taken as-is; zero is rejected by config validation.
    pub fn new(refresh_interval_minutes: u32) -> Self {
        Self {
            last_refresh: None,
            interval: Duration::minutes(i64::from(refresh_interval_minutes)),
        }
    }

    pub fn is_refresh_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => {
                // 時鐘倒退時視為剛更新過
                let elapsed = now.signed_duration_since(last).max(Duration::zero());
                elapsed >= self.interval
            }
        }
    }

    /// Only call after the refresh step exited successfully.
    pub fn record_refresh(&mut self, now: DateTime<Utc>) {
        self.last_refresh = Some(match self.last_refresh {
            Some(last) if last > now => last,
            _ => now,
        });
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for StalenessTracker {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_due_when_never_refreshed() {
        let tracker = StalenessTracker::default();
        assert!(tracker.is_refresh_due(at(0, 0)));
        assert!(tracker.is_refresh_due(DateTime::<Utc>::MIN_UTC));
        assert!(tracker.last_refresh().is_none());
    }

    #[test]
    fn test_not_due_within_interval() {
        let mut tracker = StalenessTracker::new(240);
        tracker.record_refresh(at(8, 0));

        assert!(!tracker.is_refresh_due(at(8, 0)));
        assert!(!tracker.is_refresh_due(at(8, 10)));
        assert!(!tracker.is_refresh_due(at(11, 59)));
    }

    #[test]
    fn test_due_at_and_after_interval() {
        let mut tracker = StalenessTracker::new(240);
        tracker.record_refresh(at(8, 0));

        assert!(tracker.is_refresh_due(at(12, 0)));
        assert!(tracker.is_refresh_due(at(23, 30)));
    }

    #[test]
    fn test_elapsed_is_measured_forward() {
        let mut tracker = StalenessTracker::new(60);
        tracker.record_refresh(at(10, 0));

        // 往回撥的時間不應觸發更新
        assert!(!tracker.is_refresh_due(at(6, 0)));
    }

    #[test]
    fn test_record_is_monotonic() {
        let mut tracker = StalenessTracker::new(60);
        tracker.record_refresh(at(10, 0));
        tracker.record_refresh(at(9, 0));
        assert_eq!(tracker.last_refresh(), Some(at(10, 0)));

        tracker.record_refresh(at(11, 0));
        assert_eq!(tracker.last_refresh(), Some(at(11, 0)));
    }

    #[test]
    fn test_interval_is_taken_as_configured() {
        assert_eq!(StalenessTracker::new(30).interval(), Duration::minutes(30));
        assert_eq!(StalenessTracker::new(0).interval(), Duration::zero());
    }

    #[test]
    fn test_interval_properties_over_range() {
        let interval = 240;
        let base = at(0, 0);
        for offset in [0i64, 1, 10, 120, 239, 240, 241, 600] {
            let mut tracker = StalenessTracker::new(interval);
            tracker.record_refresh(base);
            let later = base + Duration::minutes(offset);
            assert_eq!(
                tracker.is_refresh_due(later),
                offset >= i64::from(interval),
                "offset {} minutes",
                offset
            );
        }
    }
}
