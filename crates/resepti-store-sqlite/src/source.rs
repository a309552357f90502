//! [`SqliteSource`] — the SQLite implementation of [`SourceStore`].

use std::{path::Path, time::Duration};

use chrono::NaiveDateTime;
use resepti_core::{
  source::{CookingEvent, RecipeCandidate, SourceRecipe, SourceUser},
  store::SourceStore,
};
use rusqlite::OpenFlags;

use crate::{
  encode::{decode_ts, RawCookingEvent, RawRecipeCandidate},
  Error, Result,
};

/// Read-only handle on the transactional source database.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteSource {
  conn: tokio_rusqlite::Connection,
}

impl SqliteSource {
  /// Open the existing source database at `path`, read-only.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    Self::from_connection(conn).await
  }

  /// Wrap an already-open connection, e.g. an in-memory database seeded
  /// with [`crate::SOURCE_SCHEMA`] by a test. No statement other than
  /// `SELECT` is ever issued through it.
  pub async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }

  /// Run a single-column `SELECT` of timestamp strings and decode them.
  async fn timestamps(&self, sql: &'static str) -> Result<Vec<NaiveDateTime>> {
    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.iter().map(|s| decode_ts(s)).collect()
  }
}

impl SourceStore for SqliteSource {
  type Error = Error;

  async fn recipe_timestamps(&self) -> Result<Vec<NaiveDateTime>> {
    self.timestamps("SELECT DISTINCT created_at FROM recipe").await
  }

  async fn cooking_timestamps(&self) -> Result<Vec<NaiveDateTime>> {
    self.timestamps("SELECT DISTINCT cooked_date FROM cooking").await
  }

  async fn users(&self) -> Result<Vec<SourceUser>> {
    let users = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT users.id, users.username, auth_roles.id, auth_roles.role
           FROM users
           INNER JOIN auth_roles ON auth_roles.id = users.auth_role_id
           ORDER BY users.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SourceUser {
              user_id:  row.get(0)?,
              username: row.get(1)?,
              role_id:  row.get(2)?,
              role:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(users)
  }

  async fn recipes(&self) -> Result<Vec<SourceRecipe>> {
    let recipes = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT recipe.id, recipe.name, users.username, users.id,
                  categories.id, categories.name
           FROM recipe
           INNER JOIN users      ON recipe.user_id     = users.id
           INNER JOIN categories ON recipe.category_id = categories.id
           ORDER BY recipe.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SourceRecipe {
              recipe_id:   row.get(0)?,
              name:        row.get(1)?,
              user:        row.get(2)?,
              user_id:     row.get(3)?,
              category_id: row.get(4)?,
              category:    row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(recipes)
  }

  async fn recipe_candidates(&self) -> Result<Vec<RecipeCandidate>> {
    let raws: Vec<RawRecipeCandidate> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, created_at, user_id FROM recipe ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRecipeCandidate {
              recipe_id:  row.get(0)?,
              created_at: row.get(1)?,
              user_id:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecipeCandidate::into_candidate).collect()
  }

  async fn cooking_events(&self) -> Result<Vec<CookingEvent>> {
    let raws: Vec<RawCookingEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, recipe_id, user_id, cooked_date, rating FROM cooking ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCookingEvent {
              id:          row.get(0)?,
              recipe_id:   row.get(1)?,
              user_id:     row.get(2)?,
              cooked_date: row.get(3)?,
              rating:      row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCookingEvent::into_event).collect()
  }
}
