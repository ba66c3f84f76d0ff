use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use parking_lot::RwLock;

/// Time source for the lifecycle engine. Injected so business rules around
/// the due time and the night-time window stay testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and embedding.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

/// The configured time-of-day range during which broadcast pushes are held
/// back until business hours.
#[derive(Debug, Clone, Copy)]
pub struct NightWindow {
    start_hour: u32,
    end_hour: u32,
    business_start_hour: u32,
}

impl NightWindow {
    pub fn new(start_hour: u32, end_hour: u32, business_start_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
            business_start_hour,
        }
    }

    /// True when `now` falls inside the night-time window. The window wraps
    /// midnight when `start_hour > end_hour`.
    pub fn is_night_time(&self, now: DateTime<Utc>) -> bool {
        let hour = now.hour();
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// The next business-hours boundary at or after `now`: today's business
    /// start if still ahead, otherwise tomorrow's.
    pub fn next_business_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today_start = Utc
            .with_ymd_and_hms(
                now.date_naive().year(),
                now.date_naive().month(),
                now.date_naive().day(),
                self.business_start_hour,
                0,
                0,
            )
            .single()
            .unwrap_or(now);
        if now < today_start {
            today_start
        } else {
            today_start + Duration::days(1)
        }
    }
}
