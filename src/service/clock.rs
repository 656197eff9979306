use chrono::{DateTime, Utc};

/// Time source for expiry and lockout decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock with controllable time progression
#[cfg(test)]
pub struct ManualClock {
    current_millis: std::sync::atomic::AtomicI64,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current_millis: std::sync::atomic::AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn starting_now() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::new(Utc::now()))
    }

    /// Manually advance time by the specified amount
    pub fn advance(&self, by: chrono::Duration) {
        self.current_millis
            .fetch_add(by.num_milliseconds(), std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.current_millis.load(std::sync::atomic::Ordering::SeqCst);
        DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn manual_clock_advances_only_when_told() {
        let start = Utc::now();
        let clock = ManualClock::new(start);

        assert_eq!(clock.now().timestamp_millis(), start.timestamp_millis());

        clock.advance(Duration::minutes(15));
        assert_eq!(
            clock.now().timestamp_millis(),
            (start + Duration::minutes(15)).timestamp_millis()
        );
    }
}
