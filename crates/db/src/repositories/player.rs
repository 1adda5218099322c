use async_trait::async_trait;
use scoutbook_core::domain::player::{Player, PlayerId, Season, Team, TeamId};
use scoutbook_core::ports::{PlayerDirectory, PortResult, TeamDirectory};
use sqlx::Row;

use super::{optional_count_column, RepositoryError};
use crate::DbPool;

/// Players and teams share one repository; both are small lookup tables.
pub struct SqlPlayerRepository {
    pool: DbPool,
}

impl SqlPlayerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn save_team(&self, team: &Team) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO team (id, season, name) VALUES (?, ?, ?)
            ON CONFLICT(id, season) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(team.id.0)
        .bind(team.season.0)
        .bind(&team.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn save_player(&self, player: &Player) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO player (id, team_id, name, age, position) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                team_id = excluded.team_id,
                name = excluded.name,
                age = excluded.age,
                position = excluded.position
            "#,
        )
        .bind(player.id.0)
        .bind(player.team_id.0)
        .bind(&player.name)
        .bind(i64::from(player.age))
        .bind(&player.position)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_age(&self, player_id: PlayerId) -> Result<Option<u32>, RepositoryError> {
        let row = sqlx::query("SELECT age FROM player WHERE id = ?")
            .bind(player_id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => optional_count_column(&row, "age"),
            None => Ok(None),
        }
    }

    async fn find_name(&self, player_id: PlayerId) -> Result<Option<String>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT name FROM player WHERE id = ?")
            .bind(player_id.0)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_team_ids(&self, season: Season) -> Result<Vec<TeamId>, RepositoryError> {
        let rows = sqlx::query("SELECT id FROM team WHERE season = ? ORDER BY id")
            .bind(season.0)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok(TeamId(row.try_get::<i64, _>("id")?)))
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(RepositoryError::from)
    }

    /// Latest season's name wins when a team appears in several seasons.
    async fn find_team_name(&self, team_id: TeamId) -> Result<Option<String>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT name FROM team WHERE id = ? ORDER BY season DESC LIMIT 1")
            .bind(team_id.0)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl PlayerDirectory for SqlPlayerRepository {
    async fn get_age(&self, player_id: PlayerId) -> PortResult<Option<u32>> {
        Ok(self.find_age(player_id).await?)
    }

    async fn get_name(&self, player_id: PlayerId) -> PortResult<Option<String>> {
        Ok(self.find_name(player_id).await?)
    }
}

#[async_trait]
impl TeamDirectory for SqlPlayerRepository {
    async fn list_team_ids(&self, season: Season) -> PortResult<Vec<TeamId>> {
        Ok(self.find_team_ids(season).await?)
    }

    async fn get_team_name(&self, team_id: TeamId) -> PortResult<Option<String>> {
        Ok(self.find_team_name(team_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use scoutbook_core::domain::player::{Player, PlayerId, Season, Team, TeamId};
    use scoutbook_core::ports::{PlayerDirectory, TeamDirectory};

    use super::SqlPlayerRepository;
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlPlayerRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        SqlPlayerRepository::new(pool)
    }

    #[tokio::test]
    async fn player_lookups_return_none_for_unknown_ids() {
        let repo = repo().await;
        repo.save_player(&Player {
            id: PlayerId(9),
            team_id: TeamId(1),
            name: "Iker Sandoval".to_string(),
            age: 27,
            position: "Goalkeeper".to_string(),
        })
        .await
        .expect("save player");

        assert_eq!(repo.get_age(PlayerId(9)).await.expect("age"), Some(27));
        assert_eq!(repo.get_name(PlayerId(9)).await.expect("name").as_deref(), Some("Iker Sandoval"));
        assert_eq!(repo.get_age(PlayerId(404)).await.expect("age"), None);
        assert_eq!(repo.get_name(PlayerId(404)).await.expect("name"), None);
    }

    #[tokio::test]
    async fn null_age_reads_as_unknown() {
        let repo = repo().await;
        sqlx::query("INSERT INTO player (id, team_id, name, age, position) VALUES (3, 1, 'X', NULL, NULL)")
            .execute(&repo.pool)
            .await
            .expect("insert player");

        assert_eq!(repo.get_age(PlayerId(3)).await.expect("age"), None);
    }

    #[tokio::test]
    async fn team_ids_are_scoped_to_season_and_sorted() {
        let repo = repo().await;
        for (id, season, name) in [(20, 2024, "Rivermouth"), (10, 2024, "Harbour City"), (30, 2023, "Old Town")] {
            repo.save_team(&Team { id: TeamId(id), name: name.to_string(), season: Season(season) })
                .await
                .expect("save team");
        }
        repo.save_team(&Team { id: TeamId(10), name: "Harbour City FC".to_string(), season: Season(2024) })
            .await
            .expect("rename team");

        assert_eq!(repo.list_team_ids(Season(2024)).await.expect("ids"), vec![TeamId(10), TeamId(20)]);
        assert_eq!(
            repo.get_team_name(TeamId(10)).await.expect("name").as_deref(),
            Some("Harbour City FC")
        );
        assert_eq!(repo.get_team_name(TeamId(99)).await.expect("name"), None);
    }
}
