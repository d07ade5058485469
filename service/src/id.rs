use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use minesweeper_core::GameId;

/// Hands out game ids derived from wall-clock microseconds.
///
/// Two ids issued within the same microsecond would collide, so each id is
/// at least one greater than the previous one.
#[derive(Debug, Default)]
pub struct GameIdGenerator {
    last: AtomicI64,
}

impl GameIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator whose next id is `next`, as long as the clock is behind it.
    #[cfg(test)]
    pub(crate) fn starting_at(next: GameId) -> Self {
        Self {
            last: AtomicI64::new(next - 1),
        }
    }

    pub fn next_id(&self) -> GameId {
        let now = Utc::now().timestamp_micros();
        let previous = self
            .last
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }
}
