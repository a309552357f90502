//! [`SqliteWarehouse`] — the SQLite implementation of [`WarehouseStore`].

use std::{path::Path, time::Duration};

use resepti_core::{
  store::WarehouseStore,
  warehouse::{
    CookingFact, DateDim, DateParts, DimensionKeys, NewRecipeDim, NewUserDim, RecipeDim,
    RecipeFact, UserDim,
  },
};

use crate::{schema::WAREHOUSE_SCHEMA, Error, Result};

/// Fact tables first: they reference the dimension tables.
const PURGE_ORDER: &[&str] = &[
  "DELETE FROM cooking_fact",
  "DELETE FROM recipe_fact",
  "DELETE FROM date_dim",
  "DELETE FROM recipe_dim",
  "DELETE FROM user_dim",
];

// ─── Store ───────────────────────────────────────────────────────────────────

/// A star-schema warehouse backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Clones share
/// one connection thread, and every write method runs start to finish inside
/// one transaction on that thread, so concurrent callers never interleave
/// within a unit of work.
#[derive(Clone)]
pub struct SqliteWarehouse {
  conn: tokio_rusqlite::Connection,
}

impl SqliteWarehouse {
  /// Open (or create) a warehouse at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory warehouse — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  /// Wrap an already-open connection and run schema initialisation.
  pub async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(WAREHOUSE_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }

  /// Every `cooking_fact` row, in insertion order.
  pub async fn cooking_facts(&self) -> Result<Vec<CookingFact>> {
    let facts = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT date_key, user_key, recipe_key, rating FROM cooking_fact ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(CookingFact {
              keys:   DimensionKeys {
                date_key:   row.get(0)?,
                user_key:   row.get(1)?,
                recipe_key: row.get(2)?,
              },
              rating: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(facts)
  }

  /// Every `recipe_fact` row, in insertion order.
  pub async fn recipe_facts(&self) -> Result<Vec<RecipeFact>> {
    let facts = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT date_key, user_key, recipe_key, fact_column FROM recipe_fact ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RecipeFact {
              keys:        DimensionKeys {
                date_key:   row.get(0)?,
                user_key:   row.get(1)?,
                recipe_key: row.get(2)?,
              },
              fact_column: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(facts)
  }
}

// ─── WarehouseStore impl ─────────────────────────────────────────────────────

impl WarehouseStore for SqliteWarehouse {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn purge(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        for sql in PURGE_ORDER {
          tx.execute(sql, [])?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_date_dims(&self, rows: Vec<DateParts>) -> Result<usize> {
    let n = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO date_dim (year, month, week, day, hour, minute, second)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for p in &rows {
            stmt.execute(rusqlite::params![
              p.year, p.month, p.iso_week, p.day, p.hour, p.minute, p.second,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(n)
  }

  async fn insert_user_dims(&self, rows: Vec<NewUserDim>) -> Result<usize> {
    let n = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO user_dim (user_id, username, role_id, role, current)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for u in &rows {
            stmt.execute(rusqlite::params![
              u.user_id, u.username, u.role_id, u.role, u.current,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(n)
  }

  async fn insert_recipe_dims(&self, rows: Vec<NewRecipeDim>) -> Result<usize> {
    let n = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO recipe_dim (
               recipe_id, name, user, user_id, category_id, category, current
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for r in &rows {
            stmt.execute(rusqlite::params![
              r.recipe_id,
              r.name,
              r.user,
              r.user_id,
              r.category_id,
              r.category,
              r.current,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(n)
  }

  async fn insert_cooking_facts(&self, rows: Vec<CookingFact>) -> Result<usize> {
    let n = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO cooking_fact (date_key, user_key, recipe_key, rating)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for f in &rows {
            stmt.execute(rusqlite::params![
              f.keys.date_key, f.keys.user_key, f.keys.recipe_key, f.rating,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(n)
  }

  async fn insert_recipe_facts(&self, rows: Vec<RecipeFact>) -> Result<usize> {
    let n = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO recipe_fact (date_key, user_key, recipe_key, fact_column)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for f in &rows {
            stmt.execute(rusqlite::params![
              f.keys.date_key, f.keys.user_key, f.keys.recipe_key, f.fact_column,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(n)
  }

  // ── Snapshots ─────────────────────────────────────────────────────────────

  async fn date_dims(&self) -> Result<Vec<DateDim>> {
    let dims = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT date_key, year, month, week, day, hour, minute, second
           FROM date_dim ORDER BY date_key",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(DateDim {
              date_key: row.get(0)?,
              parts:    DateParts {
                year:     row.get(1)?,
                month:    row.get(2)?,
                iso_week: row.get(3)?,
                day:      row.get(4)?,
                hour:     row.get(5)?,
                minute:   row.get(6)?,
                second:   row.get(7)?,
              },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(dims)
  }

  async fn user_dims(&self) -> Result<Vec<UserDim>> {
    let dims = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_key, user_id, username, role_id, role, current
           FROM user_dim ORDER BY user_key",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(UserDim {
              user_key: row.get(0)?,
              user_id:  row.get(1)?,
              username: row.get(2)?,
              role_id:  row.get(3)?,
              role:     row.get(4)?,
              current:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(dims)
  }

  async fn recipe_dims(&self) -> Result<Vec<RecipeDim>> {
    let dims = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT recipe_key, recipe_id, name, user, user_id, category_id, category, current
           FROM recipe_dim ORDER BY recipe_key",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RecipeDim {
              recipe_key:  row.get(0)?,
              recipe_id:   row.get(1)?,
              name:        row.get(2)?,
              user:        row.get(3)?,
              user_id:     row.get(4)?,
              category_id: row.get(5)?,
              category:    row.get(6)?,
              current:     row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(dims)
  }
}
