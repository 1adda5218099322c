use std::sync::Arc;

use scoutbook_core::domain::player::{Player, PlayerId, Season, Team, TeamId};
use scoutbook_core::domain::season_stat::{CategoryStats, MatchRecord, SeasonStat};
use scoutbook_core::errors::ApplicationError;
use scoutbook_core::scouting::SeasonStatAggregator;
use tracing::info;

use crate::connection::DbPool;
use crate::repositories::{RepositoryError, SqlPlayerRepository, SqlSeasonStatRepository};

/// Squad composition per demo team: (id, name, base age, [GK, DF, MF, FW]).
const DEMO_TEAMS: &[(i64, &str, u32, [u32; 4])] = &[
    (1, "Harbour City", 28, [1, 6, 7, 2]),
    (2, "Rivermouth Athletic", 22, [2, 7, 6, 4]),
    (3, "Northgate Rovers", 25, [2, 4, 6, 5]),
    (4, "Ashford Town", 26, [3, 6, 5, 4]),
];

const RAW_POSITIONS: [&str; 4] = ["Goalkeeper", "Defender", "Midfielder", "Attacker"];

const FIRST_NAMES: &[&str] = &[
    "Aaron", "Bruno", "Callum", "Dario", "Emil", "Felix", "Goran", "Hugo", "Isak", "Jonas",
    "Kai", "Luca", "Mateo", "Nils", "Oscar", "Pavel", "Rafael", "Sami", "Theo", "Viktor",
];

const LAST_NAMES: &[&str] = &[
    "Albrecht", "Brenner", "Castell", "Dunmore", "Eriksen", "Fairley", "Garrido", "Holm",
    "Ilves", "Jansen", "Kovac", "Lindqvist", "Moreau", "Nakamura", "Okafor", "Petrov",
];

const FIXTURES_PER_SEASON: i64 = 6;

/// Deterministic four-team league used by `seed` and the end-to-end tests.
pub struct DemoLeague;

impl DemoLeague {
    pub const SEASON: Season = Season(2024);

    /// Loads teams, players, per-fixture lines and season counters, then
    /// aggregates the fixture lines. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, ApplicationError> {
        let players_repo = SqlPlayerRepository::new(pool.clone());
        let stats_repo = SqlSeasonStatRepository::new(pool.clone());
        let mut result = SeedResult::default();

        for &(team_id, name, base_age, shape) in DEMO_TEAMS {
            players_repo
                .save_team(&Team { id: TeamId(team_id), name: name.to_string(), season: Self::SEASON })
                .await?;
            result.teams += 1;

            let mut squad_number = 0u32;
            for (slot, count) in shape.iter().enumerate() {
                for _ in 0..*count {
                    squad_number += 1;
                    let player = demo_player(team_id, squad_number, base_age, RAW_POSITIONS[slot]);
                    players_repo.save_player(&player).await?;
                    stats_repo.save_season_stat(&demo_season_stat(&player, slot)).await?;
                    result.players += 1;

                    for fixture in 1..=FIXTURES_PER_SEASON {
                        let record = demo_match(&player, fixture);
                        stats_repo.record_match(team_id * 1_000 + fixture, &record).await?;
                        result.match_records += 1;
                    }
                }
            }
        }

        let aggregator = SeasonStatAggregator::new(
            Arc::new(SqlSeasonStatRepository::new(pool.clone())),
            Arc::new(SqlSeasonStatRepository::new(pool.clone())),
        );
        result.season_stats = aggregator.recompute_season(Self::SEASON).await?;

        info!(
            event_name = "db.fixtures.demo_league_loaded",
            season = %Self::SEASON,
            teams = result.teams,
            players = result.players,
            match_records = result.match_records,
            "demo league loaded"
        );
        Ok(result)
    }

    pub async fn verify(pool: &DbPool) -> Result<bool, RepositoryError> {
        let expected_players: u32 = DEMO_TEAMS.iter().map(|(_, _, _, shape)| shape.iter().sum::<u32>()).sum();

        let teams: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM team WHERE season = ?")
            .bind(Self::SEASON.0)
            .fetch_one(pool)
            .await?;
        let season_rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM player_season_stat WHERE season = ? AND appearances > 0",
        )
        .bind(Self::SEASON.0)
        .fetch_one(pool)
        .await?;

        Ok(teams == DEMO_TEAMS.len() as i64 && season_rows == i64::from(expected_players))
    }
}

fn demo_player(team_id: i64, squad_number: u32, base_age: u32, position: &str) -> Player {
    let id = team_id * 100 + i64::from(squad_number);
    let seed = usize::try_from(id).unwrap_or_default();
    Player {
        id: PlayerId(id),
        team_id: TeamId(team_id),
        name: format!(
            "{} {}",
            FIRST_NAMES[seed % FIRST_NAMES.len()],
            LAST_NAMES[(seed / 3) % LAST_NAMES.len()]
        ),
        age: base_age + (squad_number * 7) % 9 - 3,
        position: position.to_string(),
    }
}

fn demo_season_stat(player: &Player, slot: usize) -> SeasonStat {
    let n = u32::try_from(player.id.0 % 100).unwrap_or_default();
    let categories = match slot {
        0 => CategoryStats { saves: 40 + n * 9 % 50, goals_conceded: 25 + n * 5 % 30, ..Default::default() },
        1 => CategoryStats {
            tackles: 20 + n * 7 % 40,
            interceptions: 10 + n * 3 % 25,
            clearances: 30 + n * 11 % 80,
            ..Default::default()
        },
        2 => CategoryStats {
            assists: n % 9,
            key_passes: 15 + n * 5 % 40,
            pass_accuracy: 74.0 + f64::from(n * 3 % 18),
            shots: 8 + n * 4 % 30,
            ..Default::default()
        },
        _ => CategoryStats {
            goals: 2 + n * 3 % 15,
            assists: n * 2 % 9,
            shots: 20 + n * 6 % 40,
            ..Default::default()
        },
    };

    SeasonStat {
        player_id: player.id,
        team_id: player.team_id,
        season: DemoLeague::SEASON,
        position: Some(player.position.clone()),
        appearances: 0,
        minutes_played: 0,
        avg_rating: None,
        categories,
    }
}

/// Every seventh line is an unused-substitute listing with no rating.
fn demo_match(player: &Player, fixture: i64) -> MatchRecord {
    let spread = (player.id.0 * 7 + fixture * 3) % 20;
    let benched = (player.id.0 + fixture) % 7 == 0;
    MatchRecord {
        player_id: player.id,
        season: DemoLeague::SEASON,
        minutes_played: if benched { 0 } else { 60 + u32::try_from(spread).unwrap_or_default() * 2 },
        rating: (!benched).then(|| 6.0 + spread as f64 / 10.0),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedResult {
    pub teams: usize,
    pub players: usize,
    pub match_records: usize,
    pub season_stats: usize,
}
