//! Fact loaders: cooking facts and recipe facts.
//!
//! Each loader extracts its fact candidates, snapshots the three dimension
//! tables once, and resolves every candidate through a [`KeyIndex`]. A
//! candidate with any unresolved key is dropped; the drop is counted in the
//! returned [`LoadSummary`] and logged, never treated as an error. All
//! resolved rows go to the warehouse in one transaction.

use resepti_core::{
  resolve::{FactCandidate, KeyIndex},
  status::LoadSummary,
  store::{SourceStore, WarehouseStore},
  warehouse::{CookingFact, DimensionKeys, RecipeFact},
};
use tracing::{debug, warn};

use crate::{Error, Result};

pub const COOKING_FACTS: &str = "cooking facts";
pub const RECIPE_FACTS: &str = "recipe facts";

/// Snapshot the dimension tables and index them.
async fn key_index<W: WarehouseStore>(warehouse: &W) -> Result<KeyIndex> {
  let (dates, users, recipes) = tokio::try_join!(
    warehouse.date_dims(),
    warehouse.user_dims(),
    warehouse.recipe_dims(),
  )
  .map_err(Error::load)?;

  debug!(
    dates = dates.len(),
    users = users.len(),
    recipes = recipes.len(),
    "dimension snapshot loaded"
  );
  Ok(KeyIndex::build(&dates, &users, &recipes))
}

/// Resolve `candidates` into fact rows; returns the rows and the number of
/// candidates dropped.
pub fn resolve_facts<C, T>(
  candidates: &[C],
  index: &KeyIndex,
  build: impl Fn(&C, DimensionKeys) -> T,
) -> (Vec<T>, usize)
where
  C: FactCandidate,
{
  let rows: Vec<T> = candidates
    .iter()
    .filter_map(|c| index.resolve(c).map(|keys| build(c, keys)))
    .collect();
  let dropped = candidates.len() - rows.len();
  (rows, dropped)
}

fn report_drops(loader: &'static str, dropped: usize, total: usize) {
  if dropped > 0 {
    warn!(loader, dropped, total, "fact candidates without matching dimension rows skipped");
  }
}

/// Load `cooking_fact`, one row per cooking event whose keys resolve.
pub async fn load_cooking_facts<S, W>(source: &S, warehouse: &W) -> Result<LoadSummary>
where
  S: SourceStore,
  W: WarehouseStore,
{
  let events = source.cooking_events().await.map_err(Error::extract)?;
  let index = key_index(warehouse).await?;

  let (rows, dropped) = resolve_facts(&events, &index, |event, keys| CookingFact {
    keys,
    rating: event.rating,
  });
  report_drops(COOKING_FACTS, dropped, events.len());

  let inserted = warehouse.insert_cooking_facts(rows).await.map_err(Error::load)?;
  Ok(LoadSummary { inserted, dropped })
}

/// Load `recipe_fact`, one row per recipe whose keys resolve.
pub async fn load_recipe_facts<S, W>(source: &S, warehouse: &W) -> Result<LoadSummary>
where
  S: SourceStore,
  W: WarehouseStore,
{
  let recipes = source.recipe_candidates().await.map_err(Error::extract)?;
  let index = key_index(warehouse).await?;

  let (rows, dropped) = resolve_facts(&recipes, &index, |_, keys| RecipeFact::new(keys));
  report_drops(RECIPE_FACTS, dropped, recipes.len());

  let inserted = warehouse.insert_recipe_facts(rows).await.map_err(Error::load)?;
  Ok(LoadSummary { inserted, dropped })
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveDateTime};
  use resepti_core::{
    source::CookingEvent,
    warehouse::{DateDim, DateParts, RecipeDim, UserDim},
  };

  use super::*;

  fn at(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, d)
      .unwrap()
      .and_hms_opt(10, 0, 0)
      .unwrap()
  }

  fn index() -> KeyIndex {
    let dates = [DateDim { date_key: 1, parts: DateParts::of(at(4)) }];
    let users = [UserDim {
      user_key: 2,
      user_id:  1,
      username: "alice".into(),
      role_id:  1,
      role:     "admin".into(),
      current:  true,
    }];
    let recipes = [RecipeDim {
      recipe_key:  3,
      recipe_id:   1,
      name:        "borscht".into(),
      user:        "alice".into(),
      user_id:     1,
      category_id: 1,
      category:    "soup".into(),
      current:     true,
    }];
    KeyIndex::build(&dates, &users, &recipes)
  }

  fn event(id: i64, user_id: i64, recipe_id: i64, cooked_date: NaiveDateTime) -> CookingEvent {
    CookingEvent { id, recipe_id, user_id, cooked_date, rating: id }
  }

  #[test]
  fn unresolved_candidates_are_dropped_and_counted() {
    let events = [
      event(1, 1, 1, at(4)),
      // Tuesday of the same ISO week: resolves to Monday's key.
      event(2, 1, 1, at(5)),
      event(3, 9, 1, at(4)),
      event(4, 1, 9, at(4)),
      event(5, 1, 1, at(11)),
    ];

    let (rows, dropped) = resolve_facts(&events, &index(), |e, keys| CookingFact {
      keys,
      rating: e.rating,
    });

    assert_eq!(dropped, 3);
    let keys = DimensionKeys { date_key: 1, user_key: 2, recipe_key: 3 };
    assert_eq!(rows, vec![
      CookingFact { keys, rating: 1 },
      CookingFact { keys, rating: 2 },
    ]);
  }
}
