//! Injectable time source for token and session expiry checks.

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Time source used wherever expiry is evaluated.
///
/// Production code uses [`SystemClock`]; tests pin or advance time manually so
/// expiry properties can be asserted without sleeping.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::Clock;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Mutex;

    /// A clock that only moves when told to.
    #[derive(Debug)]
    pub(crate) struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub(crate) fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub(crate) fn advance_seconds(&self, seconds: i64) {
            let mut now = self.now.lock().expect("clock lock poisoned");
            *now += Duration::seconds(seconds);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock lock poisoned")
        }
    }

    pub(crate) fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_tracks_real_time() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn manual_clock_advances_on_demand() {
        let clock = test::ManualClock::new(test::epoch());
        let before = clock.now();
        clock.advance_seconds(90);
        assert_eq!((clock.now() - before).num_seconds(), 90);
    }
}
