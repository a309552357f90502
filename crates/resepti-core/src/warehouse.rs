//! Dimension and fact rows of the star-schema warehouse.
//!
//! Dimension rows are keyed by warehouse-assigned surrogate keys. The
//! `New*` types are what loaders insert; the store assigns the key. Fact rows
//! reference dimensions by surrogate key only.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::source::{SourceRecipe, SourceUser};

// ─── Date dimension ──────────────────────────────────────────────────────────

/// A timestamp decomposed into the columns of the date dimension.
///
/// `iso_week` is the ISO-8601 week number, which may belong to a different
/// week-year than `year` around new year (2024-12-30 is stored as year 2024,
/// week 1).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DateParts {
  pub year:     i32,
  pub month:    u32,
  pub iso_week: u32,
  pub day:      u32,
  pub hour:     u32,
  pub minute:   u32,
  pub second:   u32,
}

impl DateParts {
  /// Decompose a timestamp. Sub-second precision is discarded.
  pub fn of(ts: NaiveDateTime) -> Self {
    Self {
      year:     ts.year(),
      month:    ts.month(),
      iso_week: ts.iso_week().week(),
      day:      ts.day(),
      hour:     ts.hour(),
      minute:   ts.minute(),
      second:   ts.second(),
    }
  }
}

/// A persisted `date_dim` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDim {
  pub date_key: i64,
  #[serde(flatten)]
  pub parts:    DateParts,
}

// ─── User dimension ──────────────────────────────────────────────────────────

/// Input to [`crate::store::WarehouseStore::insert_user_dims`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserDim {
  pub user_id:  i64,
  pub username: String,
  pub role_id:  i64,
  pub role:     String,
  /// Always `true`; kept for consumers that expect a versioning column.
  pub current:  bool,
}

impl From<SourceUser> for NewUserDim {
  fn from(u: SourceUser) -> Self {
    Self {
      user_id:  u.user_id,
      username: u.username,
      role_id:  u.role_id,
      role:     u.role,
      current:  true,
    }
  }
}

/// A persisted `user_dim` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDim {
  pub user_key: i64,
  pub user_id:  i64,
  pub username: String,
  pub role_id:  i64,
  pub role:     String,
  pub current:  bool,
}

// ─── Recipe dimension ────────────────────────────────────────────────────────

/// Input to [`crate::store::WarehouseStore::insert_recipe_dims`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipeDim {
  pub recipe_id:   i64,
  pub name:        String,
  pub user:        String,
  pub user_id:     i64,
  pub category_id: i64,
  pub category:    String,
  /// Always `true`; see [`NewUserDim::current`].
  pub current:     bool,
}

impl From<SourceRecipe> for NewRecipeDim {
  fn from(r: SourceRecipe) -> Self {
    Self {
      recipe_id:   r.recipe_id,
      name:        r.name,
      user:        r.user,
      user_id:     r.user_id,
      category_id: r.category_id,
      category:    r.category,
      current:     true,
    }
  }
}

/// A persisted `recipe_dim` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDim {
  pub recipe_key:  i64,
  pub recipe_id:   i64,
  pub name:        String,
  pub user:        String,
  pub user_id:     i64,
  pub category_id: i64,
  pub category:    String,
  pub current:     bool,
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// The three surrogate keys every fact row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionKeys {
  pub date_key:   i64,
  pub user_key:   i64,
  pub recipe_key: i64,
}

/// A `cooking_fact` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookingFact {
  #[serde(flatten)]
  pub keys:   DimensionKeys,
  pub rating: i64,
}

/// A `recipe_fact` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFact {
  #[serde(flatten)]
  pub keys:        DimensionKeys,
  pub fact_column: i64,
}

impl RecipeFact {
  /// Opaque measure written on every recipe fact row.
  pub const FACT_COLUMN: i64 = 1;

  pub fn new(keys: DimensionKeys) -> Self {
    Self { keys, fact_column: Self::FACT_COLUMN }
  }
}
