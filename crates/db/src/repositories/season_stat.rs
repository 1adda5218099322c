use async_trait::async_trait;
use scoutbook_core::domain::player::{PlayerId, Season, TeamId};
use scoutbook_core::domain::season_stat::{
    CategoryStats, MatchRecord, SeasonAggregate, SeasonStat,
};
use scoutbook_core::ports::{PortResult, SeasonStatStore, StatSource};
use sqlx::{sqlite::SqliteRow, Row};

use super::{count_column, RepositoryError};
use crate::DbPool;

const SEASON_STAT_COLUMNS: &str = r#"
    s.player_id, s.team_id, s.season,
    COALESCE(s.position, p.position) AS position,
    s.appearances, s.minutes_played, s.avg_rating,
    s.goals, s.assists, s.shots, s.key_passes, s.pass_accuracy,
    s.tackles, s.interceptions, s.clearances, s.saves, s.goals_conceded
"#;

pub struct SqlSeasonStatRepository {
    pool: DbPool,
}

impl SqlSeasonStatRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Records one player's line for one fixture. Re-recording the same
    /// fixture overwrites the earlier line.
    pub async fn record_match(
        &self,
        fixture_id: i64,
        record: &MatchRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO player_match_stat (player_id, season, fixture_id, minutes_played, rating)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(player_id, fixture_id) DO UPDATE SET
                season = excluded.season,
                minutes_played = excluded.minutes_played,
                rating = excluded.rating
            "#,
        )
        .bind(record.player_id.0)
        .bind(record.season.0)
        .bind(fixture_id)
        .bind(i64::from(record.minutes_played))
        .bind(record.rating)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full upsert of a season row, category counters included.
    pub async fn save_season_stat(&self, stat: &SeasonStat) -> Result<(), RepositoryError> {
        let c = &stat.categories;
        sqlx::query(
            r#"
            INSERT INTO player_season_stat (
                player_id, team_id, season, position,
                appearances, minutes_played, avg_rating,
                goals, assists, shots, key_passes, pass_accuracy,
                tackles, interceptions, clearances, saves, goals_conceded
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(player_id, season) DO UPDATE SET
                team_id = excluded.team_id,
                position = excluded.position,
                appearances = excluded.appearances,
                minutes_played = excluded.minutes_played,
                avg_rating = excluded.avg_rating,
                goals = excluded.goals,
                assists = excluded.assists,
                shots = excluded.shots,
                key_passes = excluded.key_passes,
                pass_accuracy = excluded.pass_accuracy,
                tackles = excluded.tackles,
                interceptions = excluded.interceptions,
                clearances = excluded.clearances,
                saves = excluded.saves,
                goals_conceded = excluded.goals_conceded
            "#,
        )
        .bind(stat.player_id.0)
        .bind(stat.team_id.0)
        .bind(stat.season.0)
        .bind(stat.position.as_deref())
        .bind(i64::from(stat.appearances))
        .bind(i64::from(stat.minutes_played))
        .bind(stat.avg_rating)
        .bind(i64::from(c.goals))
        .bind(i64::from(c.assists))
        .bind(i64::from(c.shots))
        .bind(i64::from(c.key_passes))
        .bind(c.pass_accuracy)
        .bind(i64::from(c.tackles))
        .bind(i64::from(c.interceptions))
        .bind(i64::from(c.clearances))
        .bind(i64::from(c.saves))
        .bind(i64::from(c.goals_conceded))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Every season row, all teams, ordered by team then player.
    pub async fn list_season_stats(&self, season: Season) -> Result<Vec<SeasonStat>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SEASON_STAT_COLUMNS}
             FROM player_season_stat s
             LEFT JOIN player p ON p.id = s.player_id
             WHERE s.season = ?
             ORDER BY s.team_id, s.player_id"
        ))
        .bind(season.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(season_stat_from_row).collect()
    }

    async fn fetch_match_records(&self, season: Season) -> Result<Vec<MatchRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT player_id, season, minutes_played, rating
            FROM player_match_stat
            WHERE season = ?
            ORDER BY player_id, fixture_id
            "#,
        )
        .bind(season.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<MatchRecord, RepositoryError> {
                Ok(MatchRecord {
                    player_id: PlayerId(row.try_get("player_id")?),
                    season: Season(row.try_get("season")?),
                    minutes_played: count_column(row, "minutes_played")?,
                    rating: row.try_get("rating")?,
                })
            })
            .collect()
    }

    async fn fetch_stats(
        &self,
        season: Season,
        team_id: TeamId,
        same_team: bool,
    ) -> Result<Vec<SeasonStat>, RepositoryError> {
        let team_filter = if same_team { "s.team_id = ?" } else { "s.team_id <> ?" };
        let rows = sqlx::query(&format!(
            "SELECT {SEASON_STAT_COLUMNS}
             FROM player_season_stat s
             LEFT JOIN player p ON p.id = s.player_id
             WHERE s.season = ? AND {team_filter}
             ORDER BY s.player_id"
        ))
        .bind(season.0)
        .bind(team_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(season_stat_from_row).collect()
    }

    /// Overwrites the aggregate columns of an existing row. A player without a
    /// season row gets one keyed to their current team and listed position.
    async fn write_aggregate(&self, aggregate: &SeasonAggregate) -> Result<(), RepositoryError> {
        let updated = sqlx::query(
            r#"
            UPDATE player_season_stat
            SET appearances = ?, minutes_played = ?, avg_rating = ?
            WHERE player_id = ? AND season = ?
            "#,
        )
        .bind(i64::from(aggregate.appearances))
        .bind(i64::from(aggregate.total_minutes))
        .bind(aggregate.avg_rating)
        .bind(aggregate.player_id.0)
        .bind(aggregate.season.0)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO player_season_stat (
                    player_id, team_id, season, position,
                    appearances, minutes_played, avg_rating
                )
                SELECT id, team_id, ?, position, ?, ?, ?
                FROM player
                WHERE id = ?
                "#,
            )
            .bind(aggregate.season.0)
            .bind(i64::from(aggregate.appearances))
            .bind(i64::from(aggregate.total_minutes))
            .bind(aggregate.avg_rating)
            .bind(aggregate.player_id.0)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl StatSource for SqlSeasonStatRepository {
    async fn list_match_records(&self, season: Season) -> PortResult<Vec<MatchRecord>> {
        Ok(self.fetch_match_records(season).await?)
    }

    async fn list_candidate_stats(
        &self,
        season: Season,
        exclude_team: TeamId,
    ) -> PortResult<Vec<SeasonStat>> {
        Ok(self.fetch_stats(season, exclude_team, false).await?)
    }

    async fn list_team_stats(&self, team_id: TeamId, season: Season) -> PortResult<Vec<SeasonStat>> {
        Ok(self.fetch_stats(season, team_id, true).await?)
    }
}

#[async_trait]
impl SeasonStatStore for SqlSeasonStatRepository {
    async fn replace_aggregate(&self, aggregate: &SeasonAggregate) -> PortResult<()> {
        Ok(self.write_aggregate(aggregate).await?)
    }
}

fn season_stat_from_row(row: &SqliteRow) -> Result<SeasonStat, RepositoryError> {
    Ok(SeasonStat {
        player_id: PlayerId(row.try_get("player_id")?),
        team_id: TeamId(row.try_get("team_id")?),
        season: Season(row.try_get("season")?),
        position: row.try_get("position")?,
        appearances: count_column(row, "appearances")?,
        minutes_played: count_column(row, "minutes_played")?,
        avg_rating: row.try_get("avg_rating")?,
        categories: CategoryStats {
            goals: count_column(row, "goals")?,
            assists: count_column(row, "assists")?,
            shots: count_column(row, "shots")?,
            key_passes: count_column(row, "key_passes")?,
            pass_accuracy: row.try_get("pass_accuracy")?,
            tackles: count_column(row, "tackles")?,
            interceptions: count_column(row, "interceptions")?,
            clearances: count_column(row, "clearances")?,
            saves: count_column(row, "saves")?,
            goals_conceded: count_column(row, "goals_conceded")?,
        },
    })
}
