//! SQL schemas for the source store and the warehouse.
//!
//! Timestamps are `YYYY-MM-DD HH:MM:SS` text.

/// The source tables the ETL reads. Never executed by [`crate::SqliteSource`],
/// which opens the source read-only; provided for building fixtures.
pub const SOURCE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS auth_roles (
    id    INTEGER PRIMARY KEY,
    role  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id           INTEGER PRIMARY KEY,
    username     TEXT NOT NULL,
    auth_role_id INTEGER NOT NULL REFERENCES auth_roles(id)
);

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recipe (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    category_id INTEGER NOT NULL REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS cooking (
    id          INTEGER PRIMARY KEY,
    recipe_id   INTEGER NOT NULL REFERENCES recipe(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    cooked_date TEXT NOT NULL,
    rating      INTEGER NOT NULL
);
";

/// The star-schema warehouse, executed once at connection startup and
/// idempotent thanks to `CREATE TABLE IF NOT EXISTS`. Fact tables reference
/// dimensions, so purges must delete facts first.
pub const WAREHOUSE_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per distinct decomposed timestamp.
CREATE TABLE IF NOT EXISTS date_dim (
    date_key INTEGER PRIMARY KEY AUTOINCREMENT,
    year     INTEGER NOT NULL,
    month    INTEGER NOT NULL,
    week     INTEGER NOT NULL,   -- ISO-8601 week number
    day      INTEGER NOT NULL,
    hour     INTEGER NOT NULL,
    minute   INTEGER NOT NULL,
    second   INTEGER NOT NULL,
    UNIQUE (year, month, week, day, hour, minute, second)
);

CREATE TABLE IF NOT EXISTS user_dim (
    user_key INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id  INTEGER NOT NULL,
    username TEXT NOT NULL,
    role_id  INTEGER NOT NULL,
    role     TEXT NOT NULL,
    current  INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS recipe_dim (
    recipe_key  INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id   INTEGER NOT NULL,
    name        TEXT NOT NULL,
    user        TEXT NOT NULL,
    user_id     INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    category    TEXT NOT NULL,
    current     INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS cooking_fact (
    date_key   INTEGER NOT NULL REFERENCES date_dim(date_key),
    user_key   INTEGER NOT NULL REFERENCES user_dim(user_key),
    recipe_key INTEGER NOT NULL REFERENCES recipe_dim(recipe_key),
    rating     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS recipe_fact (
    date_key    INTEGER NOT NULL REFERENCES date_dim(date_key),
    user_key    INTEGER NOT NULL REFERENCES user_dim(user_key),
    recipe_key  INTEGER NOT NULL REFERENCES recipe_dim(recipe_key),
    fact_column INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS user_dim_user_idx     ON user_dim(user_id);
CREATE INDEX IF NOT EXISTS recipe_dim_recipe_idx ON recipe_dim(recipe_id);
";
