//! Rows read from the transactional source store.
//!
//! The source store is never written to. Every type here carries the source
//! system's natural keys; surrogate keys only exist on the warehouse side.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A user joined to its auth role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUser {
  pub user_id:  i64,
  pub username: String,
  pub role_id:  i64,
  pub role:     String,
}

/// A recipe joined to its author and category, in the shape the recipe
/// dimension needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecipe {
  pub recipe_id:   i64,
  pub name:        String,
  /// The author's username.
  pub user:        String,
  pub user_id:     i64,
  pub category_id: i64,
  pub category:    String,
}

/// A recipe in the shape the recipe fact needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCandidate {
  pub recipe_id:  i64,
  pub created_at: NaiveDateTime,
  pub user_id:    i64,
}

/// A single "user cooked recipe" event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookingEvent {
  pub id:          i64,
  pub recipe_id:   i64,
  pub user_id:     i64,
  pub cooked_date: NaiveDateTime,
  pub rating:      i64,
}
