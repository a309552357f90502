//! Decoding helpers between SQLite column values and domain types.
//!
//! Source timestamps are naive `YYYY-MM-DD HH:MM:SS` strings. The `T`
//! separator and a fractional-seconds suffix are accepted too, since
//! different writers of the source database disagree on the format.

use chrono::NaiveDateTime;
use resepti_core::source::{CookingEvent, RecipeCandidate};

use crate::{Error, Result};

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

const TS_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub fn decode_ts(s: &str) -> Result<NaiveDateTime> {
  TS_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .ok_or_else(|| Error::DateParse(format!("unrecognised timestamp: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of a `recipe` row, fact-candidate shape.
pub struct RawRecipeCandidate {
  pub recipe_id:  i64,
  pub created_at: String,
  pub user_id:    i64,
}

impl RawRecipeCandidate {
  pub fn into_candidate(self) -> Result<RecipeCandidate> {
    Ok(RecipeCandidate {
      recipe_id:  self.recipe_id,
      created_at: decode_ts(&self.created_at)?,
      user_id:    self.user_id,
    })
  }
}

/// Raw columns of a `cooking` row.
pub struct RawCookingEvent {
  pub id:          i64,
  pub recipe_id:   i64,
  pub user_id:     i64,
  pub cooked_date: String,
  pub rating:      i64,
}

impl RawCookingEvent {
  pub fn into_event(self) -> Result<CookingEvent> {
    Ok(CookingEvent {
      id:          self.id,
      recipe_id:   self.recipe_id,
      user_id:     self.user_id,
      cooked_date: decode_ts(&self.cooked_date)?,
      rating:      self.rating,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn decode_ts_accepts_both_separators() {
    let want = NaiveDate::from_ymd_opt(2024, 3, 4)
      .unwrap()
      .and_hms_opt(10, 0, 0)
      .unwrap();
    assert_eq!(decode_ts("2024-03-04 10:00:00").unwrap(), want);
    assert_eq!(decode_ts("2024-03-04T10:00:00").unwrap(), want);
    assert_eq!(decode_ts("2024-03-04 10:00:00.000").unwrap(), want);
  }

  #[test]
  fn decode_ts_rejects_garbage() {
    assert!(matches!(decode_ts("yesterday"), Err(Error::DateParse(_))));
  }
}
