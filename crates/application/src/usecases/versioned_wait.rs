use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

use crate::{
    clock::Clock,
    usecases::queue_version::{QueueGeneration, QueueVersionRegister},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Due,
    Superseded,
}

/// Sleeps until `target` while `generation` stays current.
///
/// Each nap lasts at most `waiting_time_cap`, and a `publish` on the register
/// cuts the nap short, so a superseded run notices within one cap interval at
/// worst.
pub async fn wait_until(
    register: &QueueVersionRegister,
    clock: &dyn Clock,
    target: DateTime<Utc>,
    generation: QueueGeneration,
    waiting_time_cap: Duration,
) -> WaitOutcome {
    loop {
        let next_publish = register.next_publish();

        if !register.is_current(&generation) {
            return WaitOutcome::Superseded;
        }

        let remaining = match (target - clock.now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => remaining,
            _ => return WaitOutcome::Due,
        };

        let nap = remaining.min(waiting_time_cap);
        debug!(
            generation = generation.seq(),
            target = %target,
            nap_ms = nap.as_millis() as u64,
            "versioned_wait: sleeping"
        );

        tokio::select! {
            _ = tokio::time::sleep(nap) => {}
            _ = next_publish => {}
        }
    }
}
