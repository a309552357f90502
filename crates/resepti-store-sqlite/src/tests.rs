//! Integration tests for the SQLite source and warehouse against in-memory
//! databases.

use resepti_core::{
  store::{SourceStore, WarehouseStore},
  warehouse::{CookingFact, DateParts, DimensionKeys, NewRecipeDim, NewUserDim, RecipeFact},
};

use crate::{SOURCE_SCHEMA, SqliteSource, SqliteWarehouse};

const SEED: &str = "
INSERT INTO auth_roles (id, role) VALUES (1, 'admin'), (2, 'user');
INSERT INTO users (id, username, auth_role_id) VALUES (1, 'alice', 1), (2, 'bob', 2);
INSERT INTO categories (id, name) VALUES (1, 'soup'), (2, 'dessert');
INSERT INTO recipe (id, name, created_at, user_id, category_id) VALUES
  (1, 'borscht',  '2024-03-04 10:00:00', 1, 1),
  (2, 'pavlova',  '2024-03-04 10:00:00', 2, 2),
  (3, 'minestra', '2024-03-05T11:30:00', 2, 1);
INSERT INTO cooking (id, recipe_id, user_id, cooked_date, rating) VALUES
  (1, 1, 2, '2024-03-04 10:00:00', 4),
  (2, 3, 1, '2024-03-10 18:15:00', 5);
";

async fn source(seed: &'static str) -> SqliteSource {
  let conn = tokio_rusqlite::Connection::open_in_memory()
    .await
    .expect("in-memory connection");
  conn
    .call(move |c| {
      // Source rows may point at parents that do not exist.
      c.pragma_update(None, "foreign_keys", false)?;
      c.execute_batch(SOURCE_SCHEMA)?;
      c.execute_batch(seed)?;
      Ok(())
    })
    .await
    .expect("seed");
  SqliteSource::from_connection(conn)
    .await
    .expect("source connection")
}

async fn warehouse() -> SqliteWarehouse {
  SqliteWarehouse::open_in_memory()
    .await
    .expect("in-memory warehouse")
}

fn parts(day: u32, hour: u32) -> DateParts {
  DateParts { year: 2024, month: 3, iso_week: 10, day, hour, minute: 0, second: 0 }
}

fn user(user_id: i64) -> NewUserDim {
  NewUserDim {
    user_id,
    username: format!("user{user_id}"),
    role_id: 2,
    role: "user".into(),
    current: true,
  }
}

fn recipe(recipe_id: i64) -> NewRecipeDim {
  NewRecipeDim {
    recipe_id,
    name: format!("recipe{recipe_id}"),
    user: "user1".into(),
    user_id: 1,
    category_id: 1,
    category: "soup".into(),
    current: true,
  }
}

// ─── Source ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn source_timestamps_are_distinct_per_stream() {
  let s = source(SEED).await;

  let mut recipe_ts = s.recipe_timestamps().await.unwrap();
  recipe_ts.sort();
  assert_eq!(recipe_ts.len(), 2);
  assert_eq!(recipe_ts[0].to_string(), "2024-03-04 10:00:00");
  assert_eq!(recipe_ts[1].to_string(), "2024-03-05 11:30:00");

  let cooking_ts = s.cooking_timestamps().await.unwrap();
  assert_eq!(cooking_ts.len(), 2);
}

#[tokio::test]
async fn users_are_joined_to_roles() {
  let s = source(SEED).await;
  let users = s.users().await.unwrap();

  assert_eq!(users.len(), 2);
  assert_eq!(users[0].username, "alice");
  assert_eq!(users[0].role_id, 1);
  assert_eq!(users[0].role, "admin");
  assert_eq!(users[1].role, "user");
}

#[tokio::test]
async fn recipes_are_joined_to_author_and_category() {
  let s = source(SEED).await;
  let recipes = s.recipes().await.unwrap();

  assert_eq!(recipes.len(), 3);
  let pavlova = &recipes[1];
  assert_eq!(pavlova.name, "pavlova");
  assert_eq!(pavlova.user, "bob");
  assert_eq!(pavlova.user_id, 2);
  assert_eq!(pavlova.category, "dessert");
}

#[tokio::test]
async fn fact_candidates_decode_timestamps() {
  let s = source(SEED).await;

  let candidates = s.recipe_candidates().await.unwrap();
  assert_eq!(candidates.len(), 3);
  assert_eq!(candidates[2].created_at.to_string(), "2024-03-05 11:30:00");

  let events = s.cooking_events().await.unwrap();
  assert_eq!(events.len(), 2);
  assert_eq!(events[1].recipe_id, 3);
  assert_eq!(events[1].rating, 5);
}

#[tokio::test]
async fn malformed_timestamp_is_an_error() {
  let s = source(
    "INSERT INTO recipe (id, name, created_at, user_id, category_id)
     VALUES (1, 'x', 'not a date', 1, 1);",
  )
  .await;
  let err = s.recipe_candidates().await.unwrap_err();
  assert!(matches!(err, crate::Error::DateParse(_)));
}

#[tokio::test]
async fn orphaned_rows_are_extracted_unchanged() {
  let s = source(
    "INSERT INTO recipe (id, name, created_at, user_id, category_id)
     VALUES (1, 'x', '2024-03-04 10:00:00', 1, 1);
     INSERT INTO cooking (id, recipe_id, user_id, cooked_date, rating)
     VALUES (1, 1, 99, '2024-03-04 10:00:00', 3);",
  )
  .await;

  // The inner joins leave no user or recipe rows to load...
  assert!(s.users().await.unwrap().is_empty());
  assert!(s.recipes().await.unwrap().is_empty());
  // ...but the fact candidates still come through, to be dropped later.
  assert_eq!(s.recipe_candidates().await.unwrap().len(), 1);
  let events = s.cooking_events().await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].user_id, 99);
}

// ─── Warehouse writes ────────────────────────────────────────────────────────

#[tokio::test]
async fn dimension_inserts_assign_surrogate_keys() {
  let w = warehouse().await;

  assert_eq!(w.insert_date_dims(vec![parts(4, 10), parts(5, 10)]).await.unwrap(), 2);
  assert_eq!(w.insert_user_dims(vec![user(1), user(2)]).await.unwrap(), 2);
  assert_eq!(w.insert_recipe_dims(vec![recipe(7)]).await.unwrap(), 1);

  let dates = w.date_dims().await.unwrap();
  assert_eq!(dates.len(), 2);
  assert_ne!(dates[0].date_key, dates[1].date_key);
  assert_eq!(dates[1].parts, parts(5, 10));

  let users = w.user_dims().await.unwrap();
  assert_eq!(users[1].user_id, 2);
  assert!(users.iter().all(|u| u.current));

  let recipes = w.recipe_dims().await.unwrap();
  assert_eq!(recipes[0].recipe_id, 7);
  assert!(recipes[0].current);
}

#[tokio::test]
async fn failing_batch_rolls_back_entirely() {
  let w = warehouse().await;

  // The second row duplicates the first and violates the UNIQUE tuple.
  let err = w
    .insert_date_dims(vec![parts(4, 10), parts(4, 10)])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
  assert!(w.date_dims().await.unwrap().is_empty());
}

#[tokio::test]
async fn facts_must_reference_existing_dimensions() {
  let w = warehouse().await;
  w.insert_date_dims(vec![parts(4, 10)]).await.unwrap();
  w.insert_user_dims(vec![user(1)]).await.unwrap();
  w.insert_recipe_dims(vec![recipe(1)]).await.unwrap();

  let date_key = w.date_dims().await.unwrap()[0].date_key;
  let user_key = w.user_dims().await.unwrap()[0].user_key;
  let recipe_key = w.recipe_dims().await.unwrap()[0].recipe_key;
  let good = DimensionKeys { date_key, user_key, recipe_key };
  let dangling = DimensionKeys { recipe_key: recipe_key + 100, ..good };

  let err = w
    .insert_cooking_facts(vec![
      CookingFact { keys: good, rating: 3 },
      CookingFact { keys: dangling, rating: 4 },
    ])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
  assert!(w.cooking_facts().await.unwrap().is_empty());

  w.insert_recipe_facts(vec![RecipeFact::new(good)]).await.unwrap();
  let facts = w.recipe_facts().await.unwrap();
  assert_eq!(facts, vec![RecipeFact { keys: good, fact_column: 1 }]);
}

#[tokio::test]
async fn purge_empties_every_table() {
  let w = warehouse().await;
  w.insert_date_dims(vec![parts(4, 10)]).await.unwrap();
  w.insert_user_dims(vec![user(1)]).await.unwrap();
  w.insert_recipe_dims(vec![recipe(1)]).await.unwrap();
  let keys = DimensionKeys {
    date_key:   w.date_dims().await.unwrap()[0].date_key,
    user_key:   w.user_dims().await.unwrap()[0].user_key,
    recipe_key: w.recipe_dims().await.unwrap()[0].recipe_key,
  };
  w.insert_cooking_facts(vec![CookingFact { keys, rating: 5 }]).await.unwrap();
  w.insert_recipe_facts(vec![RecipeFact::new(keys)]).await.unwrap();

  w.purge().await.unwrap();

  assert!(w.date_dims().await.unwrap().is_empty());
  assert!(w.user_dims().await.unwrap().is_empty());
  assert!(w.recipe_dims().await.unwrap().is_empty());
  assert!(w.cooking_facts().await.unwrap().is_empty());
  assert!(w.recipe_facts().await.unwrap().is_empty());
}
