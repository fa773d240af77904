use serde::Deserialize;

pub mod auth;
pub mod notes;
pub mod pads;

/// `?order=` on note listings: `name`, `-name`, `updated_at` or `-updated_at`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub order: Option<String>,
}
