use crate::db::models::{Note, NoteOrder, Pad, User};
use crate::db::schema::SQLITE_INIT;
use crate::error::NotejamError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const USER_COLUMNS: &str = "id, email, password_hash, created_at";
const PAD_COLUMNS: &str = "id, name, user_id, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, name, text, pad_id, user_id, created_at, updated_at";

/// Open (creating if missing) the SQLite database and apply the schema.
pub async fn connect(database_url: &str) -> Result<Storage, NotejamError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    let storage = Storage::new(pool);
    storage.init_schema().await?;
    debug!(database_url, "database ready");
    Ok(storage)
}

/// Persistent store for users, pads and notes.
///
/// Pad and note lookups always take the acting user's id; a row owned by
/// someone else is reported exactly like a missing row.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), NotejamError> {
        // execute multiple statements one by one (sqlx::query runs a single statement)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- users ----

    /// Insert a user. Returns `None` when the email is already registered.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, NotejamError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)
             ON CONFLICT(email) DO NOTHING
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn user_by_id(&self, id: i64) -> Result<Option<User>, NotejamError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, NotejamError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn set_password_hash(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), NotejamError> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_users(&self) -> Result<i64, NotejamError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    // ---- pads ----

    pub async fn create_pad(&self, owner: i64, name: &str) -> Result<Pad, NotejamError> {
        let now = Utc::now();
        let pad = sqlx::query_as::<_, Pad>(&format!(
            "INSERT INTO pads (name, user_id, created_at, updated_at) VALUES (?, ?, ?, ?)
             RETURNING {PAD_COLUMNS}"
        ))
        .bind(name)
        .bind(owner)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(pad)
    }

    pub async fn pads_for_user(&self, owner: i64) -> Result<Vec<Pad>, NotejamError> {
        let pads = sqlx::query_as::<_, Pad>(&format!(
            "SELECT {PAD_COLUMNS} FROM pads WHERE user_id = ? ORDER BY name COLLATE NOCASE, id"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(pads)
    }

    pub async fn pad_for_user(&self, owner: i64, pad_id: i64) -> Result<Option<Pad>, NotejamError> {
        let pad = sqlx::query_as::<_, Pad>(&format!(
            "SELECT {PAD_COLUMNS} FROM pads WHERE id = ? AND user_id = ?"
        ))
        .bind(pad_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pad)
    }

    /// Returns `false` when no pad with this id belongs to `owner`.
    pub async fn rename_pad(&self, owner: i64, pad_id: i64, name: &str) -> Result<bool, NotejamError> {
        let res = sqlx::query("UPDATE pads SET name = ?, updated_at = ? WHERE id = ? AND user_id = ?")
            .bind(name)
            .bind(Utc::now())
            .bind(pad_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Delete a pad together with its notes in one transaction.
    /// Returns `false` when no pad with this id belongs to `owner`.
    pub async fn delete_pad(&self, owner: i64, pad_id: i64) -> Result<bool, NotejamError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(i64,)> = sqlx::query_as("SELECT id FROM pads WHERE id = ? AND user_id = ?")
            .bind(pad_id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        if owned.is_none() {
            return Ok(false);
        }

        let notes = sqlx::query("DELETE FROM notes WHERE pad_id = ?")
            .bind(pad_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM pads WHERE id = ?")
            .bind(pad_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(pad_id, notes = notes.rows_affected(), "pad deleted with its notes");
        Ok(true)
    }

    pub async fn count_pads(&self) -> Result<i64, NotejamError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pads")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    // ---- notes ----

    /// Callers must have checked that `pad_id` belongs to `owner`.
    pub async fn create_note(
        &self,
        owner: i64,
        pad_id: i64,
        name: &str,
        text: &str,
    ) -> Result<Note, NotejamError> {
        let now = Utc::now();
        let note = sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (name, text, pad_id, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(name)
        .bind(text)
        .bind(pad_id)
        .bind(owner)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    /// All notes of `owner`, optionally restricted to one pad.
    pub async fn notes_for_user(
        &self,
        owner: i64,
        pad_id: Option<i64>,
        order: NoteOrder,
    ) -> Result<Vec<Note>, NotejamError> {
        let pad_filter = if pad_id.is_some() { "AND pad_id = ?" } else { "" };
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? {pad_filter} ORDER BY {}",
            order.sql()
        );
        let mut query = sqlx::query_as::<_, Note>(&sql).bind(owner);
        if let Some(pad_id) = pad_id {
            query = query.bind(pad_id);
        }
        let notes = query.fetch_all(&self.pool).await?;
        Ok(notes)
    }

    pub async fn note_for_user(&self, owner: i64, note_id: i64) -> Result<Option<Note>, NotejamError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND user_id = ?"
        ))
        .bind(note_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    /// Callers must have checked that `pad_id` belongs to `owner`.
    /// Returns `false` when no note with this id belongs to `owner`.
    pub async fn update_note(
        &self,
        owner: i64,
        note_id: i64,
        pad_id: i64,
        name: &str,
        text: &str,
    ) -> Result<bool, NotejamError> {
        let res = sqlx::query(
            r#"UPDATE notes SET
                name = ?,
                text = ?,
                pad_id = ?,
                updated_at = ?
              WHERE id = ? AND user_id = ?"#,
        )
        .bind(name)
        .bind(text)
        .bind(pad_id)
        .bind(Utc::now())
        .bind(note_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Returns `false` when no note with this id belongs to `owner`.
    pub async fn delete_note(&self, owner: i64, note_id: i64) -> Result<bool, NotejamError> {
        let res = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(note_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn count_notes(&self) -> Result<i64, NotejamError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}
