use scoutbook_core::errors::ApplicationError;
use sqlx::{sqlite::SqliteRow, Row};
use thiserror::Error;

pub mod memory;
pub mod player;
pub mod recommendation;
pub mod season_stat;

pub use memory::InMemoryScoutStore;
pub use player::SqlPlayerRepository;
pub use recommendation::SqlRecommendationRepository;
pub use season_stat::SqlSeasonStatRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

/// Reads a non-negative integer column into `u32`.
pub(crate) fn count_column(row: &SqliteRow, column: &str) -> Result<u32, RepositoryError> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw)
        .map_err(|_| RepositoryError::Decode(format!("column `{column}` out of range: {raw}")))
}

pub(crate) fn optional_count_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<u32>, RepositoryError> {
    let raw: Option<i64> = row.try_get(column)?;
    raw.map(|value| {
        u32::try_from(value)
            .map_err(|_| RepositoryError::Decode(format!("column `{column}` out of range: {value}")))
    })
    .transpose()
}
