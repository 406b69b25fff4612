//! Data-loading errors.
//!
//! Only loading paths (card database, save files, deck building) return
//! errors. Runtime game operations never do: invalid input is logged and
//! skipped, illegal actions are rejected with `false`.

use thiserror::Error;

/// Errors raised while loading card data or saved games.
#[derive(Debug, Error)]
pub enum DataError {
    /// Malformed JSON in a card database or save file.
    #[error("malformed game data: {0}")]
    Json(#[from] serde_json::Error),

    /// A deck list referenced a card the registry does not know.
    #[error("unknown card: {0}")]
    UnknownCard(String),
}
