//! Query-string parameters shared by the list endpoints.
//!
//! Every list endpoint accepts `limit`, `sort` (`asc`/`desc`),
//! `timestamp_gt` and `timestamp_lt`. Set filters are comma-separated.

use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use registro_core::listing::{ListLimit, SortOrder, TimeWindow};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub limit:        Option<u32>,
  /// `asc` or `desc`; defaults to `desc`.
  pub sort:         Option<String>,
  /// RFC 3339 with an offset, or Unix seconds.
  pub timestamp_gt: Option<String>,
  pub timestamp_lt: Option<String>,
}

/// The paging half of every listing query.
pub struct Paging {
  pub limit:  ListLimit,
  pub sort:   SortOrder,
  pub window: TimeWindow,
}

impl PageParams {
  pub fn paging(&self) -> Result<Paging, ApiError> {
    paging(
      self.limit,
      self.sort.as_deref(),
      self.timestamp_gt.as_deref(),
      self.timestamp_lt.as_deref(),
    )
  }
}

pub fn paging(
  limit: Option<u32>,
  sort: Option<&str>,
  gt: Option<&str>,
  lt: Option<&str>,
) -> Result<Paging, ApiError> {
  let limit = limit.map(ListLimit::new).transpose()?.unwrap_or_default();
  let sort = sort
    .map(|s| {
      s.parse::<SortOrder>()
        .map_err(|_| ApiError::BadRequest(format!("sort must be asc or desc, got {s:?}")))
    })
    .transpose()?
    .unwrap_or_default();
  let window = TimeWindow::parse(gt, lt)?;
  Ok(Paging { limit, sort, window })
}

/// Parse a comma-separated set filter. Blank items are ignored.
pub fn comma_set<T>(field: &str, raw: Option<&str>) -> Result<BTreeSet<T>, ApiError>
where
  T: FromStr + Ord,
  T::Err: Display,
{
  let Some(raw) = raw else {
    return Ok(BTreeSet::new());
  };
  raw
    .split(',')
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(|item| {
      item
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {field} value {item:?}: {e}")))
    })
    .collect()
}
