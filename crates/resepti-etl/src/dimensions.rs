//! Dimension loaders: date, user and recipe.
//!
//! Each loader extracts a full snapshot from the source, transforms it and
//! bulk-inserts it in a single warehouse transaction. Loaders never merge
//! with existing rows; the pipeline purges the warehouse before they run.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use resepti_core::{
  status::LoadSummary,
  store::{SourceStore, WarehouseStore},
  warehouse::{DateParts, NewRecipeDim, NewUserDim},
};
use tracing::debug;

use crate::{Error, Result};

pub const DATES: &str = "dates";
pub const USERS: &str = "users";
pub const RECIPES: &str = "recipes";

/// Merge timestamp streams into one row per distinct decomposed date.
///
/// Output is sorted, so surrogate keys follow chronological order.
pub fn unique_dates(stamps: impl IntoIterator<Item = NaiveDateTime>) -> Vec<DateParts> {
  stamps
    .into_iter()
    .map(DateParts::of)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Load `date_dim` from recipe creation times and cooking times.
pub async fn load_dates<S, W>(source: &S, warehouse: &W) -> Result<LoadSummary>
where
  S: SourceStore,
  W: WarehouseStore,
{
  let (recipe_ts, cooking_ts) =
    tokio::try_join!(source.recipe_timestamps(), source.cooking_timestamps())
      .map_err(Error::extract)?;

  let extracted = recipe_ts.len() + cooking_ts.len();
  let rows = unique_dates(recipe_ts.into_iter().chain(cooking_ts));
  debug!(extracted, unique = rows.len(), "date rows deduplicated");

  let inserted = warehouse.insert_date_dims(rows).await.map_err(Error::load)?;
  Ok(LoadSummary::inserted(inserted))
}

/// Load `user_dim`, one row per source user.
pub async fn load_users<S, W>(source: &S, warehouse: &W) -> Result<LoadSummary>
where
  S: SourceStore,
  W: WarehouseStore,
{
  let users = source.users().await.map_err(Error::extract)?;
  let rows = users.into_iter().map(NewUserDim::from).collect();

  let inserted = warehouse.insert_user_dims(rows).await.map_err(Error::load)?;
  Ok(LoadSummary::inserted(inserted))
}

/// Load `recipe_dim`, one row per source recipe.
pub async fn load_recipes<S, W>(source: &S, warehouse: &W) -> Result<LoadSummary>
where
  S: SourceStore,
  W: WarehouseStore,
{
  let recipes = source.recipes().await.map_err(Error::extract)?;
  let rows = recipes.into_iter().map(NewRecipeDim::from).collect();

  let inserted = warehouse.insert_recipe_dims(rows).await.map_err(Error::load)?;
  Ok(LoadSummary::inserted(inserted))
}
