//! Timestamp source for rows written by the store.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, DurationRound as _, TimeDelta, Utc};

/// Issues strictly increasing UTC timestamps at microsecond resolution, the
/// precision at which they are stored.
///
/// Listing cursors and latest-status selection both compare `created_at`
/// values, so two rows written by one store never share a timestamp.
#[derive(Debug, Default)]
pub struct Clock {
  last: Mutex<Option<DateTime<Utc>>>,
}

impl Clock {
  pub fn now(&self) -> DateTime<Utc> {
    let tick = TimeDelta::microseconds(1);
    let wall = Utc::now();
    let wall = wall.duration_trunc(tick).unwrap_or(wall);

    let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
    let next = match *last {
      Some(prev) if wall <= prev => prev + tick,
      _ => wall,
    };
    *last = Some(next);
    next
  }
}
