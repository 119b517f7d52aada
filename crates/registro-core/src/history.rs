//! Append-only status histories.
//!
//! Controllers and recharges never update their status in place; every change
//! appends a row. The current status is the row with the greatest
//! `recorded_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a status history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry<S> {
  pub status:      S,
  pub recorded_at: DateTime<Utc>,
}

impl<S> StatusEntry<S> {
  pub fn new(status: S, recorded_at: DateTime<Utc>) -> Self {
    Self { status, recorded_at }
  }
}

/// The current entry of `history`, or `None` if it is empty.
///
/// On equal timestamps the entry appearing last wins.
pub fn latest<S>(history: &[StatusEntry<S>]) -> Option<&StatusEntry<S>> {
  history.iter().max_by_key(|entry| entry.recorded_at)
}

#[cfg(test)]
mod tests {
  use chrono::TimeDelta;

  use super::*;

  #[test]
  fn empty_history_has_no_status() {
    let history: Vec<StatusEntry<u8>> = vec![];
    assert!(latest(&history).is_none());
  }

  #[test]
  fn latest_ignores_insertion_order() {
    let t0 = Utc::now();
    let history = vec![
      StatusEntry::new("b", t0 + TimeDelta::seconds(2)),
      StatusEntry::new("a", t0),
      StatusEntry::new("c", t0 + TimeDelta::seconds(1)),
    ];
    assert_eq!(latest(&history).unwrap().status, "b");
  }

  #[test]
  fn last_writer_wins_on_ties() {
    let t0 = Utc::now();
    let history = vec![StatusEntry::new(1, t0), StatusEntry::new(2, t0)];
    assert_eq!(latest(&history).unwrap().status, 2);
  }
}
