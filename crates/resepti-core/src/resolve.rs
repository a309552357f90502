//! Natural-key to surrogate-key resolution.
//!
//! Two forms with identical answers:
//!
//! - the `resolve_*_key` functions scan a dimension snapshot row by row and
//!   return the first match;
//! - [`KeyIndex`] hashes the snapshot once and answers each lookup in O(1).
//!   Fact loaders use the index.
//!
//! Date matching compares year, month, ISO week, hour, minute and second.
//! The day of month is NOT compared, so two timestamps on different days of
//! the same ISO week with the same wall-clock time resolve to the same
//! `date_key`. Downstream reports rely on those keys; keep the collision.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::{
  source::{CookingEvent, RecipeCandidate},
  warehouse::{DateDim, DateParts, DimensionKeys, RecipeDim, UserDim},
};

// ─── Date lookup key ─────────────────────────────────────────────────────────

/// The date-dimension columns that take part in matching: every column of
/// [`DateParts`] except `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateLookup {
  year:     i32,
  month:    u32,
  iso_week: u32,
  hour:     u32,
  minute:   u32,
  second:   u32,
}

impl From<DateParts> for DateLookup {
  fn from(p: DateParts) -> Self {
    Self {
      year:     p.year,
      month:    p.month,
      iso_week: p.iso_week,
      hour:     p.hour,
      minute:   p.minute,
      second:   p.second,
    }
  }
}

impl From<NaiveDateTime> for DateLookup {
  fn from(ts: NaiveDateTime) -> Self { DateParts::of(ts).into() }
}

// ─── Fact candidates ─────────────────────────────────────────────────────────

/// A source row that becomes a fact once its three dimension keys resolve.
pub trait FactCandidate {
  /// The timestamp resolved against the date dimension.
  fn occurred_at(&self) -> NaiveDateTime;
  fn user_id(&self) -> i64;
  fn recipe_id(&self) -> i64;
}

impl FactCandidate for CookingEvent {
  fn occurred_at(&self) -> NaiveDateTime { self.cooked_date }
  fn user_id(&self) -> i64 { self.user_id }
  fn recipe_id(&self) -> i64 { self.recipe_id }
}

impl FactCandidate for RecipeCandidate {
  fn occurred_at(&self) -> NaiveDateTime { self.created_at }
  fn user_id(&self) -> i64 { self.user_id }
  fn recipe_id(&self) -> i64 { self.recipe_id }
}

// ─── Per-row scan ────────────────────────────────────────────────────────────
//
// Reference answers for [`KeyIndex`]: the index must agree with these on
// every snapshot. Handy for one-off lookups; loaders go through the index.

/// First `date_key` whose row matches `ts`, ignoring the day of month.
pub fn resolve_date_key(ts: NaiveDateTime, dims: &[DateDim]) -> Option<i64> {
  let wanted = DateLookup::from(ts);
  dims
    .iter()
    .find(|d| DateLookup::from(d.parts) == wanted)
    .map(|d| d.date_key)
}

/// First `user_key` whose row carries `user_id`.
pub fn resolve_user_key(user_id: i64, dims: &[UserDim]) -> Option<i64> {
  dims.iter().find(|d| d.user_id == user_id).map(|d| d.user_key)
}

/// First `recipe_key` whose row carries `recipe_id`.
pub fn resolve_recipe_key(recipe_id: i64, dims: &[RecipeDim]) -> Option<i64> {
  dims
    .iter()
    .find(|d| d.recipe_id == recipe_id)
    .map(|d| d.recipe_key)
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Hash indexes over one snapshot of the three dimension tables.
///
/// Built once per fact loader invocation. When a snapshot holds several rows
/// for the same lookup key, the first one in snapshot order wins, exactly as
/// with the scan functions.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
  dates:   HashMap<DateLookup, i64>,
  users:   HashMap<i64, i64>,
  recipes: HashMap<i64, i64>,
}

impl KeyIndex {
  pub fn build(dates: &[DateDim], users: &[UserDim], recipes: &[RecipeDim]) -> Self {
    let mut index = Self {
      dates:   HashMap::with_capacity(dates.len()),
      users:   HashMap::with_capacity(users.len()),
      recipes: HashMap::with_capacity(recipes.len()),
    };
    for d in dates {
      index.dates.entry(d.parts.into()).or_insert(d.date_key);
    }
    for u in users {
      index.users.entry(u.user_id).or_insert(u.user_key);
    }
    for r in recipes {
      index.recipes.entry(r.recipe_id).or_insert(r.recipe_key);
    }
    index
  }

  pub fn date_key(&self, ts: NaiveDateTime) -> Option<i64> {
    self.dates.get(&DateLookup::from(ts)).copied()
  }

  pub fn user_key(&self, user_id: i64) -> Option<i64> {
    self.users.get(&user_id).copied()
  }

  pub fn recipe_key(&self, recipe_id: i64) -> Option<i64> {
    self.recipes.get(&recipe_id).copied()
  }

  /// Resolve all three keys of `candidate`; `None` if any of them misses.
  pub fn resolve(&self, candidate: &impl FactCandidate) -> Option<DimensionKeys> {
    Some(DimensionKeys {
      date_key:   self.date_key(candidate.occurred_at())?,
      user_key:   self.user_key(candidate.user_id())?,
      recipe_key: self.recipe_key(candidate.recipe_id())?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
      .unwrap()
      .and_hms_opt(h, min, s)
      .unwrap()
  }

  fn date_dims(stamps: &[NaiveDateTime]) -> Vec<DateDim> {
    stamps
      .iter()
      .enumerate()
      .map(|(i, t)| DateDim { date_key: i as i64 + 1, parts: DateParts::of(*t) })
      .collect()
  }

  fn user_dim(user_key: i64, user_id: i64) -> UserDim {
    UserDim {
      user_key,
      user_id,
      username: format!("user{user_id}"),
      role_id: 1,
      role: "user".into(),
      current: true,
    }
  }

  fn recipe_dim(recipe_key: i64, recipe_id: i64) -> RecipeDim {
    RecipeDim {
      recipe_key,
      recipe_id,
      name: format!("recipe{recipe_id}"),
      user: "user1".into(),
      user_id: 1,
      category_id: 1,
      category: "soup".into(),
      current: true,
    }
  }

  // ─── Date matching ─────────────────────────────────────────────────────────

  #[test]
  fn same_iso_week_different_day_collides() {
    let monday = ts(2024, 3, 4, 10, 0, 0);
    let tuesday = ts(2024, 3, 5, 10, 0, 0);
    let dims = date_dims(&[monday, tuesday]);

    let a = resolve_date_key(monday, &dims).unwrap();
    let b = resolve_date_key(tuesday, &dims).unwrap();
    assert_eq!(a, b);

    let index = KeyIndex::build(&dims, &[], &[]);
    assert_eq!(index.date_key(monday), index.date_key(tuesday));
    assert_eq!(index.date_key(tuesday), Some(a));
  }

  #[test]
  fn different_iso_week_resolves_to_different_keys() {
    let first = ts(2024, 1, 1, 10, 0, 0);
    let second = ts(2024, 1, 8, 10, 0, 0);
    let dims = date_dims(&[first, second]);

    let index = KeyIndex::build(&dims, &[], &[]);
    assert_eq!(index.date_key(first), Some(1));
    assert_eq!(index.date_key(second), Some(2));
  }

  #[test]
  fn date_match_requires_time_of_day() {
    let dims = date_dims(&[ts(2024, 3, 4, 10, 0, 0)]);
    assert_eq!(resolve_date_key(ts(2024, 3, 4, 10, 0, 1), &dims), None);
    assert_eq!(resolve_date_key(ts(2024, 3, 4, 11, 0, 0), &dims), None);
  }

  #[test]
  fn iso_week_of_new_year_keeps_calendar_year() {
    // 2024-12-30 falls in ISO week 1 of 2025.
    let parts = DateParts::of(ts(2024, 12, 30, 8, 0, 0));
    assert_eq!(parts.year, 2024);
    assert_eq!(parts.iso_week, 1);
    assert_eq!(parts.month, 12);
    assert_eq!(parts.day, 30);
  }

  // ─── Natural keys ──────────────────────────────────────────────────────────

  #[test]
  fn natural_keys_resolve_first_match() {
    let users = vec![user_dim(10, 1), user_dim(11, 2), user_dim(12, 1)];
    let recipes = vec![recipe_dim(20, 7), recipe_dim(21, 7)];

    assert_eq!(resolve_user_key(1, &users), Some(10));
    assert_eq!(resolve_user_key(2, &users), Some(11));
    assert_eq!(resolve_user_key(3, &users), None);
    assert_eq!(resolve_recipe_key(7, &recipes), Some(20));

    let index = KeyIndex::build(&[], &users, &recipes);
    assert_eq!(index.user_key(1), Some(10));
    assert_eq!(index.recipe_key(7), Some(20));
    assert_eq!(index.recipe_key(8), None);
  }

  #[test]
  fn index_agrees_with_scan() {
    let stamps = [
      ts(2024, 3, 4, 10, 0, 0),
      ts(2024, 3, 6, 10, 0, 0),
      ts(2024, 3, 11, 10, 0, 0),
      ts(2024, 12, 30, 23, 59, 59),
      ts(2025, 1, 1, 0, 0, 0),
    ];
    let dims = date_dims(&stamps[..3]);
    let users = vec![user_dim(1, 5), user_dim(2, 6)];
    let recipes = vec![recipe_dim(1, 9)];
    let index = KeyIndex::build(&dims, &users, &recipes);

    for t in stamps {
      assert_eq!(index.date_key(t), resolve_date_key(t, &dims), "{t}");
    }
    for id in 0..10 {
      assert_eq!(index.user_key(id), resolve_user_key(id, &users));
      assert_eq!(index.recipe_key(id), resolve_recipe_key(id, &recipes));
    }
  }

  // ─── Whole candidates ──────────────────────────────────────────────────────

  #[test]
  fn candidate_resolves_only_when_all_keys_hit() {
    let at = ts(2024, 5, 1, 12, 30, 0);
    let index = KeyIndex::build(
      &date_dims(&[at]),
      &[user_dim(3, 1)],
      &[recipe_dim(4, 1)],
    );

    let hit = CookingEvent { id: 1, recipe_id: 1, user_id: 1, cooked_date: at, rating: 5 };
    assert_eq!(
      index.resolve(&hit),
      Some(DimensionKeys { date_key: 1, user_key: 3, recipe_key: 4 })
    );

    let unknown_user = CookingEvent { user_id: 2, ..hit };
    assert_eq!(index.resolve(&unknown_user), None);

    let unknown_recipe = RecipeCandidate { recipe_id: 2, created_at: at, user_id: 1 };
    assert_eq!(index.resolve(&unknown_recipe), None);

    let unknown_date = RecipeCandidate {
      recipe_id:  1,
      created_at: ts(2023, 5, 1, 12, 30, 0),
      user_id:    1,
    };
    assert_eq!(index.resolve(&unknown_date), None);
  }
}
