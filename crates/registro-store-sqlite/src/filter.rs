//! Helpers for assembling listing queries.

use registro_core::listing::{ListLimit, SortOrder, TimeWindow};
use rusqlite::types::Value;

use crate::encode::encode_dt;

/// Accumulates `WHERE` conditions and their positional parameters.
///
/// Conditions use anonymous `?` placeholders; parameters are bound in the
/// order the conditions were pushed.
#[derive(Debug, Default)]
pub struct Filter {
  conds:  Vec<String>,
  params: Vec<Value>,
}

impl Filter {
  pub fn push(&mut self, cond: impl Into<String>, params: impl IntoIterator<Item = Value>) {
    self.conds.push(cond.into());
    self.params.extend(params);
  }

  /// Restrict `column` to the exclusive bounds of `window`.
  pub fn window(&mut self, column: &str, window: TimeWindow) {
    if let Some(gt) = window.gt {
      self.push(format!("{column} > ?"), [Value::Text(encode_dt(gt))]);
    }
    if let Some(lt) = window.lt {
      self.push(format!("{column} < ?"), [Value::Text(encode_dt(lt))]);
    }
  }

  /// `column IN (?, ?, ..)`. An empty set adds no condition.
  pub fn any_of(&mut self, column: &str, values: impl IntoIterator<Item = String>) {
    let values: Vec<Value> = values.into_iter().map(Value::Text).collect();
    if values.is_empty() {
      return;
    }
    let cond = format!("{column} IN ({})", placeholders(values.len()));
    self.push(cond, values);
  }

  /// The `WHERE ..` clause, or an empty string.
  pub fn where_clause(&self) -> String {
    if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    }
  }

  /// Append `ORDER BY column <sort> LIMIT ?` and return the final SQL with
  /// all parameters.
  pub fn finish(
    mut self,
    select: &str,
    column: &str,
    sort: SortOrder,
    limit: ListLimit,
  ) -> (String, Vec<Value>) {
    let sql = format!(
      "{select} {} ORDER BY {column} {} LIMIT ?",
      self.where_clause(),
      sort.keyword()
    );
    self.params.push(Value::Integer(i64::from(limit.get())));
    (sql, self.params)
  }
}

/// `n` comma-separated `?` placeholders.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

/// Joins `table` (aliased `alias`) so that only the row holding the newest
/// status of each `parent` survives, matched on `table.fk = parent.id`.
pub fn latest_status_join(table: &str, alias: &str, fk: &str, parent: &str) -> String {
  format!(
    "JOIN (SELECT {fk}, MAX(created_at) AS last_status_at FROM {table} GROUP BY {fk}) \
     {alias}_latest ON {alias}_latest.{fk} = {parent}.id
     JOIN {table} {alias} ON {alias}.{fk} = {parent}.id \
     AND {alias}.created_at = {alias}_latest.last_status_at"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_filter_has_no_where_clause() {
    let (sql, params) = Filter::default().finish(
      "SELECT id FROM customers",
      "created_at",
      SortOrder::Desc,
      ListLimit::default(),
    );
    assert_eq!(sql, "SELECT id FROM customers  ORDER BY created_at DESC LIMIT ?");
    assert_eq!(params, vec![Value::Integer(10)]);
  }

  #[test]
  fn conditions_and_parameters_stay_aligned() {
    let mut filter = Filter::default();
    filter.push("p.is_verified = ?", [Value::Integer(1)]);
    filter.any_of("s.status", ["WAITING".to_owned(), "REJECTED".to_owned()]);
    filter.any_of("r.id", Vec::new());
    assert_eq!(
      filter.where_clause(),
      "WHERE p.is_verified = ? AND s.status IN (?, ?)"
    );
    let (_, params) = filter.finish("SELECT 1", "x", SortOrder::Asc, ListLimit::default());
    assert_eq!(params.len(), 4);
  }
}
