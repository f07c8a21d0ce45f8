use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Clock;
    use chrono::{DateTime, Utc};
    use tokio::time::Instant;

    /// Wall clock driven by tokio's timer, so `start_paused` tests can move
    /// "now" forward by sleeping.
    #[derive(Debug, Clone, Copy)]
    pub(crate) struct TokioClock {
        origin_wall: DateTime<Utc>,
        origin: Instant,
    }

    impl TokioClock {
        pub(crate) fn starting_at(origin_wall: DateTime<Utc>) -> Self {
            Self {
                origin_wall,
                origin: Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = Instant::now().duration_since(self.origin);
            self.origin_wall
                + chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero())
        }
    }
}
