use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct Pad {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct Note {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub pad_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sort order for note listings, parsed from the `order` query value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteOrder {
    Name,
    NameDesc,
    UpdatedAt,
    #[default]
    UpdatedAtDesc,
}

impl NoteOrder {
    /// Unknown or missing values fall back to most recently updated first.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => Self::Name,
            Some("-name") => Self::NameDesc,
            Some("updated_at") => Self::UpdatedAt,
            Some("-updated_at") => Self::UpdatedAtDesc,
            _ => Self::default(),
        }
    }

    pub(crate) fn sql(self) -> &'static str {
        match self {
            Self::Name => "name COLLATE NOCASE ASC, id ASC",
            Self::NameDesc => "name COLLATE NOCASE DESC, id DESC",
            Self::UpdatedAt => "updated_at ASC, id ASC",
            Self::UpdatedAtDesc => "updated_at DESC, id DESC",
        }
    }
}
