pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoLeague, SeedResult};
pub use repositories::{
    InMemoryScoutStore, RepositoryError, SqlPlayerRepository, SqlRecommendationRepository,
    SqlSeasonStatRepository,
};
