//! The `SourceStore` and `WarehouseStore` traits.
//!
//! Implemented by storage backends (e.g. `resepti-store-sqlite`). The ETL
//! crate depends on these abstractions, not on any concrete backend.
//!
//! Handles are `Clone` so the orchestrator can hand every loader task its own
//! handle at spawn time. All methods return `Send` futures so loaders can run
//! on a multi-threaded tokio runtime.

use std::future::Future;

use chrono::NaiveDateTime;

use crate::{
  source::{CookingEvent, RecipeCandidate, SourceRecipe, SourceUser},
  warehouse::{
    CookingFact, DateDim, DateParts, NewRecipeDim, NewUserDim, RecipeDim, RecipeFact,
    UserDim,
  },
};

// ─── Source ──────────────────────────────────────────────────────────────────

/// Read-only access to the transactional source store.
pub trait SourceStore: Clone + Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Distinct recipe creation timestamps.
  fn recipe_timestamps(
    &self,
  ) -> impl Future<Output = Result<Vec<NaiveDateTime>, Self::Error>> + Send + '_;

  /// Distinct cooking event timestamps.
  fn cooking_timestamps(
    &self,
  ) -> impl Future<Output = Result<Vec<NaiveDateTime>, Self::Error>> + Send + '_;

  /// Every user joined to its auth role.
  fn users(&self) -> impl Future<Output = Result<Vec<SourceUser>, Self::Error>> + Send + '_;

  /// Every recipe joined to its author and category.
  fn recipes(
    &self,
  ) -> impl Future<Output = Result<Vec<SourceRecipe>, Self::Error>> + Send + '_;

  /// Every recipe, in fact-candidate shape.
  fn recipe_candidates(
    &self,
  ) -> impl Future<Output = Result<Vec<RecipeCandidate>, Self::Error>> + Send + '_;

  /// Every cooking event.
  fn cooking_events(
    &self,
  ) -> impl Future<Output = Result<Vec<CookingEvent>, Self::Error>> + Send + '_;
}

// ─── Warehouse ───────────────────────────────────────────────────────────────

/// Read/write access to the star-schema warehouse.
///
/// Every write method is one unit of work: it commits as a whole or, on any
/// error, rolls back as a whole. Insert methods return the number of rows
/// written.
pub trait WarehouseStore: Clone + Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Delete every row from every fact table, then every dimension table.
  fn purge(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn insert_date_dims(
    &self,
    rows: Vec<DateParts>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_user_dims(
    &self,
    rows: Vec<NewUserDim>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_recipe_dims(
    &self,
    rows: Vec<NewRecipeDim>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_cooking_facts(
    &self,
    rows: Vec<CookingFact>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_recipe_facts(
    &self,
    rows: Vec<RecipeFact>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Snapshots ─────────────────────────────────────────────────────────

  fn date_dims(&self) -> impl Future<Output = Result<Vec<DateDim>, Self::Error>> + Send + '_;

  fn user_dims(&self) -> impl Future<Output = Result<Vec<UserDim>, Self::Error>> + Send + '_;

  fn recipe_dims(
    &self,
  ) -> impl Future<Output = Result<Vec<RecipeDim>, Self::Error>> + Send + '_;
}
