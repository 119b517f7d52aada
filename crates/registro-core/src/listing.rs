//! Listing primitives shared by every paginated query: page size, sort order,
//! the `created_at` time window and the cursor that continues a listing.
//!
//! A listing is sorted on `created_at`. The cursor for the next page is the
//! original query with its window moved past the last result: the lower bound
//! for ascending listings, the upper bound for descending ones.

use std::{collections::BTreeSet, fmt::Display};

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Limit ───────────────────────────────────────────────────────────────────

/// Page size, always within `1..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListLimit(u32);

impl ListLimit {
  pub const DEFAULT: u32 = 10;
  pub const MAX: u32 = 1000;

  pub fn new(limit: u32) -> Result<Self> {
    if !(1..=Self::MAX).contains(&limit) {
      return Err(Error::validation(format!(
        "limit must be between 1 and {}, got {limit}",
        Self::MAX
      )));
    }
    Ok(Self(limit))
  }

  pub fn get(self) -> u32 { self.0 }
}

impl Default for ListLimit {
  fn default() -> Self { Self(Self::DEFAULT) }
}

impl TryFrom<u32> for ListLimit {
  type Error = Error;

  fn try_from(limit: u32) -> Result<Self> { Self::new(limit) }
}

// ─── Sort order ──────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  /// The SQL keyword for this order.
  pub fn keyword(self) -> &'static str {
    match self {
      Self::Asc => "ASC",
      Self::Desc => "DESC",
    }
  }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Parse a timestamp filter.
///
/// Accepts Unix seconds (interpreted as UTC) or an RFC 3339 timestamp with an
/// explicit offset. A date-time without an offset is rejected because it does
/// not name a single instant.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
  let input = input.trim();
  let digits = input.strip_prefix('-').unwrap_or(input);

  if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
    let secs: i64 = input
      .parse()
      .map_err(|_| Error::validation(format!("timestamp out of range: {input}")))?;
    let ts = Utc
      .timestamp_opt(secs, 0)
      .single()
      .ok_or_else(|| Error::validation(format!("timestamp out of range: {input}")))?;
    return in_range(input, ts);
  }

  if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
    return in_range(input, ts.with_timezone(&Utc));
  }

  let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
    .iter()
    .any(|fmt| NaiveDateTime::parse_from_str(input, fmt).is_ok());
  if naive {
    return Err(Error::validation(format!(
      "timestamp {input:?} is missing timezone information"
    )));
  }

  Err(Error::validation(format!("invalid timestamp: {input:?}")))
}

/// Stored timestamps are four-digit-year text; bounds outside that range
/// would not compare correctly against them.
fn in_range(input: &str, ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
  if !(0..=9999).contains(&ts.year()) {
    return Err(Error::validation(format!(
      "timestamp out of range: {input} (years 0000 to 9999 only)"
    )));
  }
  Ok(ts)
}

/// Exclusive bounds on `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
  #[serde(rename = "timestamp_gt", skip_serializing_if = "Option::is_none")]
  pub gt: Option<DateTime<Utc>>,
  #[serde(rename = "timestamp_lt", skip_serializing_if = "Option::is_none")]
  pub lt: Option<DateTime<Utc>>,
}

impl TimeWindow {
  /// Build a window from raw filter strings.
  pub fn parse(gt: Option<&str>, lt: Option<&str>) -> Result<Self> {
    Ok(Self {
      gt: gt.map(parse_timestamp).transpose()?,
      lt: lt.map(parse_timestamp).transpose()?,
    })
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.gt.is_none_or(|gt| at > gt) && self.lt.is_none_or(|lt| at < lt)
  }

  /// The window of the page following one whose last row was created at
  /// `last`.
  pub fn after(self, sort: SortOrder, last: DateTime<Utc>) -> Self {
    match sort {
      SortOrder::Asc => Self { gt: Some(last), ..self },
      SortOrder::Desc => Self { lt: Some(last), ..self },
    }
  }
}

// ─── Pages ───────────────────────────────────────────────────────────────────

/// Implemented by every listing query so a [`Page`] can derive its cursor.
pub trait Listing: Clone {
  fn limit(&self) -> ListLimit;

  fn sort(&self) -> SortOrder;

  fn window(&self) -> TimeWindow;

  fn with_window(self, window: TimeWindow) -> Self;
}

/// One page of a listing, plus the query for the next page.
///
/// `next` is present whenever `results` is non-empty, even when fewer than
/// `limit` rows came back; following it then yields an empty page without a
/// cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T, Q> {
  pub results: Vec<T>,
  pub next:    Option<Q>,
}

impl<T, Q: Listing> Page<T, Q> {
  pub fn new(
    results: Vec<T>,
    query: &Q,
    created_at: impl Fn(&T) -> DateTime<Utc>,
  ) -> Self {
    let next = results.last().map(|last| {
      let window = query.window().after(query.sort(), created_at(last));
      query.clone().with_window(window)
    });
    Self { results, next }
  }
}

/// Serialise a set filter as the comma-separated form list endpoints accept.
pub fn comma_separated<S, T>(
  values: &BTreeSet<T>,
  serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
  S: Serializer,
  T: Display,
{
  let joined = values
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(",");
  serializer.serialize_str(&joined)
}
