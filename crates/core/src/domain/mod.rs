pub mod player;
pub mod recommendation;
pub mod season_stat;
